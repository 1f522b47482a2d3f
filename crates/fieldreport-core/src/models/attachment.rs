//! 첨부 파일 모델.
//!
//! 호출자가 제공하는 이름/타입이 있는 바이트 덩어리 (크래시 덤프, 로그 파일 등).

use serde::{Deserialize, Serialize};

/// 리포트 첨부 파일
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Attachment {
    /// 표시 이름
    pub name: String,
    /// 파일 이름
    pub file_name: String,
    /// MIME 타입
    pub content_type: String,
    /// 내용 (와이어에서는 Base64)
    #[serde(rename = "DataBase64", with = "super::base64_bytes")]
    pub data: Vec<u8>,
    /// 서버가 할당한 데이터 식별자
    pub data_identifier: Option<String>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
            data_identifier: None,
        }
    }

    /// JSON 첨부 (`application/json`)
    pub fn json(name: impl Into<String>, file_name: impl Into<String>, contents: &str) -> Self {
        Self::new(name, file_name, "application/json", contents.as_bytes().to_vec())
    }

    /// 텍스트 첨부 (`text/plain`)
    pub fn text(name: impl Into<String>, file_name: impl Into<String>, contents: &str) -> Self {
        Self::new(name, file_name, "text/plain", contents.as_bytes().to_vec())
    }
}
