//! 프레임레이트 모니터.
//!
//! 프레임레이트가 기준 미만으로 일정 시간 이상 지속되면 스크린샷 두 장을 찍고
//! 리포트를 만들어 자동 전송한다.

use fieldreport_core::config::MonitorConfig;
use fieldreport_core::models::named_value::NamedValue;
use fieldreport_core::ports::vision::ScreenshotSource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::client::ReportingClient;

/// 트리거 시 캡처하는 스크린샷 크기
const LARGE_SCREENSHOT: u32 = 2048;
const SMALL_SCREENSHOT: u32 = 512;

/// 저 프레임레이트 감시자
pub struct FramerateMonitor {
    name: String,
    summary: String,
    minimum_framerate: f64,
    maximum_duration: f64,
    enabled: bool,
    enabled_after_trigger: bool,
    hidden_without_dimension: bool,
    duration: f64,
    sent: Arc<AtomicUsize>,
}

impl FramerateMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            name: "FramerateMonitor".to_string(),
            summary: "Framerate below minimum".to_string(),
            minimum_framerate: config.minimum_framerate,
            maximum_duration: config.maximum_duration_secs,
            enabled: config.enabled,
            enabled_after_trigger: config.enabled_after_trigger,
            hidden_without_dimension: true,
            duration: 0.0,
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 전송이 끝난 트리거 수 (성공/실패 무관)
    pub fn completed_triggers(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    /// 프레임 하나를 관찰. 트리거되면 `true`.
    pub fn observe(&mut self, client: &mut ReportingClient, delta: Duration) -> bool {
        if !self.enabled {
            return false;
        }

        let delta = delta.as_secs_f64();
        if delta <= 0.0 {
            return false;
        }

        if 1.0 / delta < self.minimum_framerate {
            self.duration += delta;
        } else {
            self.duration = 0.0;
        }

        if self.duration > self.maximum_duration {
            self.duration = 0.0;
            self.trigger(client);
            return true;
        }
        false
    }

    /// 즉시 트리거
    pub fn trigger(&mut self, client: &mut ReportingClient) {
        if !self.enabled_after_trigger {
            self.enabled = false;
        }
        info!("{} 트리거: 리포트 생성", self.name);

        client.take_screenshot(
            LARGE_SCREENSHOT,
            LARGE_SCREENSHOT,
            ScreenshotSource::Screen,
            |_, _| {},
        );
        client.take_screenshot(
            SMALL_SCREENSHOT,
            SMALL_SCREENSHOT,
            ScreenshotSource::Screen,
            |_, _| {},
        );

        let name = self.name.clone();
        let summary = self.summary.clone();
        let hidden = self.hidden_without_dimension;
        let sent = Arc::clone(&self.sent);

        client.create_report(move |client, mut report| {
            if report.overview.project_identifier.is_empty() {
                warn!("리포트의 프로젝트 식별자가 설정되지 않음");
            }

            report.overview.summary = summary;
            report
                .device_metadata
                .push(NamedValue::new("Monitor", name.as_str()));

            let lookup = |key: &str, fallback: &str| {
                report
                    .device_metadata
                    .iter()
                    .find(|m| m.name == key)
                    .map_or_else(|| fallback.to_string(), |m| m.value.clone())
            };
            let platform = lookup("Platform", "Unknown");
            let version = lookup("Version", "0.0");

            report.add_dimension(
                "Monitor.Platform.Version",
                format!("{}.{}.{}", name, platform, version),
            );
            report.add_dimension("Monitor", name.as_str());
            report.overview.is_hidden_without_dimension = hidden;

            client.send_report(report, move |_, result| {
                match result {
                    Ok(report) => info!(
                        "{} 리포트 전송 완료: {}",
                        name,
                        report.overview.identifier.unwrap_or_default()
                    ),
                    Err(e) => warn!("{} 리포트 전송 실패: {}", name, e),
                }
                sent.fetch_add(1, Ordering::Relaxed);
            });
        });
    }
}
