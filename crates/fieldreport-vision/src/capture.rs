//! 화면 캡처.
//!
//! `screen` feature가 켜지면 xcap으로 주 모니터를 캡처한다.
//! 꺼져 있으면 항상 `CoreError::Capture`를 반환한다.

use fieldreport_core::error::CoreError;
use image::RgbaImage;

/// 화면 캡처: xcap 기반
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }

    /// 이 빌드에서 화면 캡처가 가능한지
    pub fn is_supported() -> bool {
        cfg!(feature = "screen")
    }

    /// 주 모니터 캡처 (없으면 첫 번째 모니터)
    #[cfg(feature = "screen")]
    pub fn capture_primary(&self) -> Result<RgbaImage, CoreError> {
        use tracing::debug;
        use xcap::Monitor;

        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let primary = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors
            .into_iter()
            .nth(primary)
            .ok_or_else(|| CoreError::Capture("모니터를 찾을 수 없음".to_string()))?;

        let image = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("화면 캡처 실패: {e}")))?;

        debug!("화면 캡처 완료: {}x{}", image.width(), image.height());
        Ok(image)
    }

    #[cfg(not(feature = "screen"))]
    pub fn capture_primary(&self) -> Result<RgbaImage, CoreError> {
        Err(CoreError::Capture(
            "화면 캡처 미지원 빌드 (`screen` feature 필요)".to_string(),
        ))
    }
}
