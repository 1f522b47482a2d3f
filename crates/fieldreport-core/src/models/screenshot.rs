//! 스크린샷 모델.

use serde::{Deserialize, Serialize};

use crate::png;

/// 캡처된 스크린샷 (PNG 바이트)
///
/// 너비/높이는 따로 저장하지 않고 PNG 헤더에서 읽는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Screenshot {
    /// 캡처 요청 시점의 프레임 번호
    pub frame_number: u64,
    /// 인코딩된 이미지 (와이어에서는 Base64)
    #[serde(rename = "DataBase64", with = "super::base64_bytes")]
    pub data: Vec<u8>,
    /// 서버가 할당한 데이터 식별자
    pub data_identifier: Option<String>,
}

impl Screenshot {
    pub fn new(frame_number: u64, data: Vec<u8>) -> Self {
        Self {
            frame_number,
            data,
            data_identifier: None,
        }
    }

    /// 이미지 너비 (헤더를 읽을 수 없으면 0)
    pub fn width(&self) -> u32 {
        png::dimensions(&self.data).map_or(0, |(w, _)| w)
    }

    /// 이미지 높이 (헤더를 읽을 수 없으면 0)
    pub fn height(&self) -> u32 {
        png::dimensions(&self.data).map_or(0, |(_, h)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_come_from_png_header() {
        let shot = Screenshot::new(3, png::header(320, 200));
        assert_eq!(shot.width(), 320);
        assert_eq!(shot.height(), 200);
        assert_eq!(Screenshot::new(0, vec![1, 2, 3]).width(), 0);
    }

    #[test]
    fn data_travels_as_base64() {
        let shot = Screenshot::new(7, vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&shot).unwrap();
        assert_eq!(json["DataBase64"], "3q2+7w==");
        assert_eq!(json["FrameNumber"], 7);

        let back: Screenshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.data, vec![0xde, 0xad, 0xbe, 0xef]);
    }
}
