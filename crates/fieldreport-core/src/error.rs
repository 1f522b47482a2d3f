//! fieldreport 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 포트 구현에서 `CoreError`를 그대로 반환하거나
//! 라이브러리 에러를 `map_err`로 변환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 전송, 캡처 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 서버가 채워야 하는 필드를 클라이언트가 설정함
    #[error("서버 할당 필드는 클라이언트에서 설정할 수 없음: {0}")]
    ServerAssignedField(&'static str),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 그 외 비정상 HTTP 상태 코드
    #[error("HTTP 에러 ({status}): {body}")]
    Http {
        /// 응답 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },

    /// 서버 응답을 리포트로 해석할 수 없음
    #[error("잘못된 서버 응답: {0}")]
    InvalidResponse(String),

    /// 스크린샷 캡처 실패
    #[error("캡처 에러: {0}")]
    Capture(String),

    /// 이미지 인코딩 실패
    #[error("인코딩 에러: {0}")]
    Encoding(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 전송 계층에서 재시도할 만한 에러인지 판별
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
        )
    }
}
