//! 리포트 전송 포트.
//!
//! 구현: `fieldreport-network` crate (reqwest)

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreError;

/// 업로드/다운로드 진행률 (각각 0.0 ~ 1.0)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub upload: f32,
    pub download: f32,
}

impl Progress {
    pub fn new(upload: f32, download: f32) -> Self {
        Self {
            upload: upload.clamp(0.0, 1.0),
            download: download.clamp(0.0, 1.0),
        }
    }
}

/// 진행률 콜백. 전송 스레드에서 0회 이상 호출된다.
pub type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// 리포트 전송 계층
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// `url`로 `body`를 POST하고 응답 본문을 반환한다.
    ///
    /// 비정상 상태 코드는 `Err`로 분류한다. 완료는 반환값으로 정확히 한 번 전달되며,
    /// 그 전에 `progress`가 0회 이상 호출될 수 있다.
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
        progress: ProgressFn,
    ) -> Result<Vec<u8>, CoreError>;
}
