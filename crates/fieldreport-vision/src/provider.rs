//! `ScreenshotProvider` 포트 구현.
//!
//! 카메라는 호스트가 이름으로 등록한 마지막 프레임이다. 렌더 루프가 매 프레임
//! `register_camera`로 갱신하면 캡처 요청 시점의 최신 프레임이 사용된다.

use async_trait::async_trait;
use fieldreport_core::error::CoreError;
use fieldreport_core::ports::vision::{RgbaFrame, ScreenshotProvider, ScreenshotSource};
use image::RgbaImage;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::capture::ScreenCapture;
use crate::encoder;

/// image/xcap 기반 스크린샷 제공자
#[derive(Default)]
pub struct ImageScreenshotProvider {
    screen: ScreenCapture,
    cameras: RwLock<HashMap<String, RgbaFrame>>,
}

impl ImageScreenshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이름으로 카메라 프레임 등록 (같은 이름은 교체)
    pub fn register_camera(&self, name: impl Into<String>, frame: RgbaFrame) {
        self.cameras.write().insert(name.into(), frame);
    }

    pub fn unregister_camera(&self, name: &str) -> bool {
        self.cameras.write().remove(name).is_some()
    }

    pub fn camera_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cameras.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn resolve(&self, source: ScreenshotSource) -> Result<Source, CoreError> {
        match source {
            ScreenshotSource::Screen => Ok(Source::Screen),
            ScreenshotSource::Camera(name) => self
                .cameras
                .read()
                .get(&name)
                .cloned()
                .map(Source::Frame)
                .ok_or_else(|| CoreError::Capture(format!("등록되지 않은 카메라: {name}"))),
            ScreenshotSource::Texture(frame) => Ok(Source::Frame(frame)),
        }
    }
}

/// 블로킹 작업으로 넘길 해석된 소스
enum Source {
    Screen,
    Frame(RgbaFrame),
}

impl Source {
    fn into_image(self, screen: ScreenCapture) -> Result<RgbaImage, CoreError> {
        match self {
            Source::Screen => screen.capture_primary(),
            Source::Frame(frame) => {
                let pixels = std::sync::Arc::try_unwrap(frame.pixels)
                    .unwrap_or_else(|shared| shared.as_ref().clone());
                encoder::from_raw(frame.width, frame.height, pixels)
            }
        }
    }
}

#[async_trait]
impl ScreenshotProvider for ImageScreenshotProvider {
    async fn take_screenshot(
        &self,
        frame_number: u64,
        maximum_width: u32,
        maximum_height: u32,
        source: ScreenshotSource,
    ) -> Result<Vec<u8>, CoreError> {
        let source = self.resolve(source)?;
        let screen = self.screen;

        let bytes = tokio::task::spawn_blocking(move || {
            let image = source.into_image(screen)?;
            encoder::encode_png(image, maximum_width, maximum_height)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("스크린샷 인코딩 작업 실패: {e}")))??;

        debug!("스크린샷 인코딩 완료: 프레임 {frame_number}, {} bytes", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldreport_core::png;

    fn frame(width: u32, height: u32) -> RgbaFrame {
        RgbaFrame::new(width, height, vec![128; (width * height * 4) as usize])
    }

    #[tokio::test]
    async fn texture_is_downscaled_and_encoded() {
        let provider = ImageScreenshotProvider::new();
        let bytes = provider
            .take_screenshot(1, 64, 64, ScreenshotSource::Texture(frame(256, 128)))
            .await
            .unwrap();
        assert_eq!(png::dimensions(&bytes), Some((64, 32)));
    }

    #[tokio::test]
    async fn camera_uses_latest_registered_frame() {
        let provider = ImageScreenshotProvider::new();
        provider.register_camera("main", frame(8, 8));
        provider.register_camera("main", frame(16, 4));
        provider.register_camera("minimap", frame(4, 4));
        assert_eq!(provider.camera_names(), vec!["main", "minimap"]);

        let bytes = provider
            .take_screenshot(2, 100, 100, ScreenshotSource::Camera("main".to_string()))
            .await
            .unwrap();
        assert_eq!(png::dimensions(&bytes), Some((16, 4)));

        assert!(provider.unregister_camera("main"));
        let err = provider
            .take_screenshot(3, 100, 100, ScreenshotSource::Camera("main".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Capture(_)));
    }

    #[tokio::test]
    async fn malformed_texture_fails() {
        let provider = ImageScreenshotProvider::new();
        let bad = RgbaFrame::new(10, 10, vec![0; 12]);
        let err = provider
            .take_screenshot(4, 100, 100, ScreenshotSource::Texture(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Capture(_)));
    }
}
