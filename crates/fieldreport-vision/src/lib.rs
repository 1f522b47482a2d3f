//! # fieldreport-vision
//!
//! `ScreenshotProvider` 포트 구현.
//! 캡처 소스(화면/등록된 카메라/텍스처)를 해석하고, 최대 크기 안으로 축소한 뒤
//! PNG로 인코딩한다. 인코딩은 블로킹 스레드에서 수행된다.
//!
//! ## Feature Flags
//!
//! - `screen`: xcap 기반 실제 화면 캡처 활성화

pub mod capture;
pub mod encoder;
pub mod provider;

pub use provider::ImageScreenshotProvider;
