//! 플랫폼 협력자 조립 (DI).

use anyhow::Result;
use fieldreport_client::platform::{Platform, TracingAnalyticsSink};
use fieldreport_core::config::AppConfig;
use fieldreport_core::models::attachment::Attachment;
use fieldreport_core::models::named_value::NamedValue;
use fieldreport_core::models::report::Report;
use fieldreport_core::ports::analytics::ReportDecorator;
use fieldreport_monitor::{SysInfoMetadata, SystemMetricSource};
use fieldreport_network::HttpReportTransport;
use fieldreport_vision::ImageScreenshotProvider;
use std::sync::Arc;

/// 모든 리포트에 세션 식별자와 실행 설정을 붙인다
pub struct SessionDecorator {
    session_id: String,
    config_json: String,
}

impl SessionDecorator {
    pub fn new(session_id: impl Into<String>, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            session_id: session_id.into(),
            config_json: serde_json::to_string_pretty(config)?,
        })
    }
}

impl ReportDecorator for SessionDecorator {
    fn decorate(&self, report: &mut Report) {
        report
            .fields
            .push(NamedValue::new("Session", self.session_id.as_str()));
        report
            .attachments
            .push(Attachment::json("Config", "config.json", &self.config_json));
    }
}

/// 세션 ID 생성 -- 타임스탬프 기반
pub fn generate_session_id() -> String {
    use std::hash::{Hash, Hasher};

    let ts = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::SystemTime::now().hash(&mut hasher);
    let rand_part = hasher.finish() as u32;
    format!("sess_{ts}_{rand_part:08x}")
}

/// 설정으로부터 플랫폼 구성
pub fn build_platform(
    config: &AppConfig,
    screenshots: Arc<ImageScreenshotProvider>,
    session_id: &str,
) -> Result<Platform> {
    let transport = Arc::new(HttpReportTransport::from_config(&config.server)?);

    let mut platform = Platform::new(transport, screenshots)
        .with_device_metadata(Arc::new(SysInfoMetadata::new(env!("CARGO_PKG_VERSION"))))
        .with_metric_source(Arc::new(SystemMetricSource::new(
            config.monitor.metrics_refresh_interval(),
        )))
        .with_decorator(Arc::new(SessionDecorator::new(session_id, config)?));

    if config.reporting.send_events_to_analytics {
        platform = platform.with_analytics(Arc::new(TracingAnalyticsSink));
    }
    Ok(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_prefixed() {
        let id = generate_session_id();
        assert!(id.starts_with("sess_"));
        assert_eq!(id.len(), "sess_".len() + 14 + 1 + 8);
    }

    #[test]
    fn decorator_adds_session_field_and_config() {
        let config = AppConfig::default_config();
        let decorator = SessionDecorator::new("sess_1", &config).unwrap();
        let mut report = Report::new("proj");
        decorator.decorate(&mut report);

        assert_eq!(report.fields, vec![NamedValue::new("Session", "sess_1")]);
        assert_eq!(report.attachments.len(), 1);
        let parsed: AppConfig = serde_json::from_slice(&report.attachments[0].data).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn platform_wires_analytics_only_when_enabled() {
        let mut config = AppConfig::default_config();
        let screens = Arc::new(ImageScreenshotProvider::new());
        let platform = build_platform(&config, screens.clone(), "s").unwrap();
        assert!(platform.analytics.is_none());
        assert!(platform.decorator.is_some());
        assert_eq!(platform.metric_sources.len(), 1);

        config.reporting.send_events_to_analytics = true;
        let platform = build_platform(&config, screens, "s").unwrap();
        assert!(platform.analytics.is_some());
    }
}
