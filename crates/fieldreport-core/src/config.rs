//! 애플리케이션 설정 구조체.
//!
//! 서버 엔드포인트, 링 버퍼 용량, 측정 구간 길이, 스크린샷 크기, 프레임레이트 모니터 등
//! 런타임 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 리포팅 클라이언트 용량/측정 설정
    #[serde(default)]
    pub client: ClientConfig,
    /// 자가 리포팅/분석/로거 연결 설정
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// 스크린샷 설정
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
    /// 프레임레이트 모니터 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// 기본 설정값 생성
    pub fn default_config() -> Self {
        Self::default()
    }
}

// ============================================================
// 서버 설정
// ============================================================

/// 서버 연결 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 리포트 서버 베이스 URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 프로젝트 식별자 (리포트에 기록됨)
    #[serde(default)]
    pub project_identifier: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 전송 계층 재시도 횟수 (0이면 재시도 안 함)
    #[serde(default)]
    pub max_retries: u32,
}

impl ServerConfig {
    /// 리포트 업로드 URL (`{endpoint}/api/userreporting`)
    pub fn report_url(&self) -> String {
        format!(
            "{}/api/userreporting",
            self.endpoint.trim().trim_end_matches('/')
        )
    }

    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project_identifier: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_endpoint() -> String {
    "https://localhost".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// ============================================================
// 클라이언트 설정
// ============================================================

/// 지표 수집 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsGatheringMode {
    /// 매 틱마다 등록된 지표 소스를 자동 샘플링
    #[default]
    Automatic,
    /// 호출자가 직접 `sample_metric`으로 샘플링
    Manual,
    /// 측정 구간을 기록하지 않음 (매 틱이 구간 경계)
    Disabled,
}

/// 리포팅 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 이벤트 링 버퍼 용량
    #[serde(default = "default_maximum_event_count")]
    pub maximum_event_count: usize,
    /// 측정 구간 링 버퍼 용량
    #[serde(default = "default_maximum_measure_count")]
    pub maximum_measure_count: usize,
    /// 측정 구간당 프레임 수
    #[serde(default = "default_frames_per_measure")]
    pub frames_per_measure: u64,
    /// 스크린샷 링 버퍼 용량
    #[serde(default = "default_maximum_screenshot_count")]
    pub maximum_screenshot_count: usize,
    /// 지표 수집 모드
    #[serde(default)]
    pub metrics_gathering_mode: MetricsGatheringMode,
}

impl ClientConfig {
    /// 모든 용량/프레임 수를 최소 1로 보정
    pub fn normalized(mut self) -> Self {
        self.maximum_event_count = self.maximum_event_count.max(1);
        self.maximum_measure_count = self.maximum_measure_count.max(1);
        self.frames_per_measure = self.frames_per_measure.max(1);
        self.maximum_screenshot_count = self.maximum_screenshot_count.max(1);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            maximum_event_count: default_maximum_event_count(),
            maximum_measure_count: default_maximum_measure_count(),
            frames_per_measure: default_frames_per_measure(),
            maximum_screenshot_count: default_maximum_screenshot_count(),
            metrics_gathering_mode: MetricsGatheringMode::Automatic,
        }
    }
}

fn default_maximum_event_count() -> usize {
    100
}

fn default_maximum_measure_count() -> usize {
    300
}

fn default_frames_per_measure() -> u64 {
    60
}

fn default_maximum_screenshot_count() -> usize {
    10
}

// ============================================================
// 리포팅 동작 설정
// ============================================================

/// 리포팅 동작 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// 클라이언트 자체 지표를 현재 측정 구간에도 샘플링
    #[serde(default)]
    pub self_reporting: bool,
    /// 전송 성공 시 분석 싱크로 이벤트 전달
    #[serde(default)]
    pub send_events_to_analytics: bool,
    /// tracing 이벤트를 리포트 이벤트로 기록
    #[serde(default = "default_true")]
    pub connect_to_logger: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            self_reporting: false,
            send_events_to_analytics: false,
            connect_to_logger: true,
        }
    }
}

// ============================================================
// 스크린샷 설정
// ============================================================

/// 스크린샷 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// 최대 너비 (px)
    #[serde(default = "default_screenshot_dimension")]
    pub maximum_width: u32,
    /// 최대 높이 (px)
    #[serde(default = "default_screenshot_dimension")]
    pub maximum_height: u32,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            maximum_width: default_screenshot_dimension(),
            maximum_height: default_screenshot_dimension(),
        }
    }
}

fn default_screenshot_dimension() -> u32 {
    1280
}

// ============================================================
// 프레임레이트 모니터 설정
// ============================================================

/// 프레임레이트 모니터 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 모니터 활성화
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 트리거 후에도 계속 감시
    #[serde(default)]
    pub enabled_after_trigger: bool,
    /// 최소 허용 프레임레이트
    #[serde(default = "default_minimum_framerate")]
    pub minimum_framerate: f64,
    /// 최소 프레임레이트 미만 허용 시간 (초)
    #[serde(default = "default_maximum_duration_secs")]
    pub maximum_duration_secs: f64,
    /// 시스템 지표 샘플 갱신 주기 (ms)
    #[serde(default = "default_metrics_refresh_interval_ms")]
    pub metrics_refresh_interval_ms: u64,
}

impl MonitorConfig {
    /// 시스템 지표 갱신 주기
    pub fn metrics_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_refresh_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_after_trigger: false,
            minimum_framerate: default_minimum_framerate(),
            maximum_duration_secs: default_maximum_duration_secs(),
            metrics_refresh_interval_ms: default_metrics_refresh_interval_ms(),
        }
    }
}

fn default_minimum_framerate() -> f64 {
    15.0
}

fn default_maximum_duration_secs() -> f64 {
    10.0
}

fn default_metrics_refresh_interval_ms() -> u64 {
    1_000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.maximum_event_count, 100);
        assert_eq!(config.maximum_measure_count, 300);
        assert_eq!(config.frames_per_measure, 60);
        assert_eq!(config.maximum_screenshot_count, 10);
        assert_eq!(config.metrics_gathering_mode, MetricsGatheringMode::Automatic);
    }

    #[test]
    fn normalized_clamps_counts_to_one() {
        let config = ClientConfig {
            maximum_event_count: 0,
            maximum_measure_count: 0,
            frames_per_measure: 0,
            maximum_screenshot_count: 0,
            metrics_gathering_mode: MetricsGatheringMode::Manual,
        }
        .normalized();
        assert_eq!(config.maximum_event_count, 1);
        assert_eq!(config.maximum_measure_count, 1);
        assert_eq!(config.frames_per_measure, 1);
        assert_eq!(config.maximum_screenshot_count, 1);
        assert_eq!(config.metrics_gathering_mode, MetricsGatheringMode::Manual);
    }

    #[test]
    fn report_url_joins_endpoint() {
        let mut server = ServerConfig::default();
        assert_eq!(server.report_url(), "https://localhost/api/userreporting");
        server.endpoint = "http://127.0.0.1:8080/".to_string();
        assert_eq!(server.report_url(), "http://127.0.0.1:8080/api/userreporting");
        assert_eq!(server.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn report_url_ignores_surrounding_whitespace() {
        let server = ServerConfig {
            endpoint: "  https://reports.example.com/ \n".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            server.report_url(),
            "https://reports.example.com/api/userreporting"
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"client":{"frames_per_measure":2},"reporting":{}}"#).unwrap();
        assert_eq!(config.client.frames_per_measure, 2);
        assert_eq!(config.client.maximum_event_count, 100);
        assert!(config.reporting.connect_to_logger);
        assert_eq!(config.screenshot.maximum_width, 1280);
        assert_eq!(config.monitor.minimum_framerate, 15.0);
        assert_eq!(config.server.max_retries, 0);
    }
}
