//! 플랫폼 협력자 묶음과 기본(null) 구현.
//!
//! `ReportingClient`는 포트 trait 객체만 알고 있으며,
//! 실제 구현은 `fieldreport-app`에서 주입한다.

use async_trait::async_trait;
use fieldreport_core::error::CoreError;
use fieldreport_core::models::named_value::NamedValue;
use fieldreport_core::ports::analytics::{AnalyticsSink, ReportDecorator};
use fieldreport_core::ports::monitor::{DeviceMetadataProvider, MetricSource};
use fieldreport_core::ports::transport::{ProgressFn, ReportTransport};
use fieldreport_core::ports::vision::{ScreenshotProvider, ScreenshotSource};
use std::sync::Arc;
use tracing::info;

/// 리포팅 클라이언트가 사용하는 플랫폼 협력자
#[derive(Clone)]
pub struct Platform {
    pub transport: Arc<dyn ReportTransport>,
    pub screenshots: Arc<dyn ScreenshotProvider>,
    pub device_metadata: Arc<dyn DeviceMetadataProvider>,
    /// `Automatic` 모드에서 매 틱 샘플링
    pub metric_sources: Vec<Arc<dyn MetricSource>>,
    pub decorator: Option<Arc<dyn ReportDecorator>>,
    pub analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl Platform {
    pub fn new(
        transport: Arc<dyn ReportTransport>,
        screenshots: Arc<dyn ScreenshotProvider>,
    ) -> Self {
        Self {
            transport,
            screenshots,
            ..Self::default()
        }
    }

    pub fn with_device_metadata(mut self, provider: Arc<dyn DeviceMetadataProvider>) -> Self {
        self.device_metadata = provider;
        self
    }

    pub fn with_metric_source(mut self, source: Arc<dyn MetricSource>) -> Self {
        self.metric_sources.push(source);
        self
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn ReportDecorator>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            transport: Arc::new(NullTransport),
            screenshots: Arc::new(NullScreenshotProvider),
            device_metadata: Arc::new(NullDeviceMetadata),
            metric_sources: Vec::new(),
            decorator: None,
            analytics: None,
        }
    }
}

/// 전송 계층이 없는 환경 (항상 네트워크 에러)
pub struct NullTransport;

#[async_trait]
impl ReportTransport for NullTransport {
    async fn post(
        &self,
        url: &str,
        _content_type: &str,
        _body: Vec<u8>,
        _progress: ProgressFn,
    ) -> Result<Vec<u8>, CoreError> {
        Err(CoreError::Network(format!(
            "전송 계층이 구성되지 않음: {}",
            url
        )))
    }
}

/// 캡처 수단이 없는 환경 (항상 캡처 에러)
pub struct NullScreenshotProvider;

#[async_trait]
impl ScreenshotProvider for NullScreenshotProvider {
    async fn take_screenshot(
        &self,
        _frame_number: u64,
        _maximum_width: u32,
        _maximum_height: u32,
        _source: ScreenshotSource,
    ) -> Result<Vec<u8>, CoreError> {
        Err(CoreError::Capture("스크린샷 제공자가 구성되지 않음".to_string()))
    }
}

/// 디바이스 메타데이터 없음
pub struct NullDeviceMetadata;

impl DeviceMetadataProvider for NullDeviceMetadata {
    fn device_metadata(&self) -> Vec<NamedValue> {
        Vec::new()
    }
}

/// 분석 이벤트를 로그로만 남기는 싱크
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn send_event(&self, name: &str, parameters: &[NamedValue]) {
        let parameters: Vec<String> = parameters
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        info!("분석 이벤트: {} [{}]", name, parameters.join(", "));
    }
}
