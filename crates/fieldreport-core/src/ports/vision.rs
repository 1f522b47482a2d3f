//! 스크린샷 포트.
//!
//! 구현: `fieldreport-vision` crate (image, xcap)

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreError;

/// 호스트가 넘겨주는 RGBA8 프레임 (렌더 타겟 등)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` 바이트
    pub pixels: Arc<Vec<u8>>,
}

impl RgbaFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }
}

/// 캡처 대상
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScreenshotSource {
    /// 기본 화면
    #[default]
    Screen,
    /// 이름으로 등록된 카메라/뷰
    Camera(String),
    /// 호스트가 제공한 텍스처
    Texture(RgbaFrame),
}

/// 스크린샷 캡처/인코딩
#[async_trait]
pub trait ScreenshotProvider: Send + Sync {
    /// `source`를 캡처해 최대 크기 안으로 축소한 PNG 바이트를 반환한다.
    async fn take_screenshot(
        &self,
        frame_number: u64,
        maximum_width: u32,
        maximum_height: u32,
        source: ScreenshotSource,
    ) -> Result<Vec<u8>, CoreError>;
}
