//! 축소 + PNG 인코딩.

use fieldreport_core::error::CoreError;
use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// 종횡비를 유지하며 `(max_w, max_h)` 안에 들어가는 크기. 확대하지 않는다.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scaled = |v: u32, max: u32| ((v as f64 * scale).round() as u32).clamp(1, max);
    (scaled(width, max_width), scaled(height, max_height))
}

/// RGBA8 원시 픽셀을 이미지로 변환
pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage, CoreError> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(CoreError::Capture(format!(
            "픽셀 버퍼 크기 불일치: {}x{}는 {} bytes 필요, {} bytes 제공",
            width,
            height,
            expected,
            pixels.len()
        )));
    }
    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| CoreError::Capture("픽셀 버퍼 변환 실패".to_string()))
}

/// 최대 크기 안으로 축소한 뒤 PNG로 인코딩
pub fn encode_png(
    image: RgbaImage,
    max_width: u32,
    max_height: u32,
) -> Result<Vec<u8>, CoreError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CoreError::Encoding("빈 이미지".to_string()));
    }

    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
    let image = if (width, height) == image.dimensions() {
        image
    } else {
        image::imageops::resize(&image, width, height, FilterType::Triangle)
    };

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CoreError::Encoding(format!("PNG 인코딩 실패: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldreport_core::png;

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within(1920, 1080, 512, 512), (512, 288));
        assert_eq!(fit_within(1080, 1920, 512, 512), (288, 512));
        assert_eq!(fit_within(640, 480, 2048, 2048), (640, 480));
        assert_eq!(fit_within(1000, 1, 10, 10), (10, 1));
    }

    #[test]
    fn encode_downscales_into_png() {
        let image = RgbaImage::from_pixel(400, 200, image::Rgba([10, 20, 30, 255]));
        let bytes = encode_png(image, 100, 100).unwrap();
        assert_eq!(png::dimensions(&bytes), Some((100, 50)));
    }

    #[test]
    fn raw_buffer_size_is_checked() {
        assert!(from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            from_raw(2, 2, vec![0; 15]),
            Err(CoreError::Capture(_))
        ));
    }
}
