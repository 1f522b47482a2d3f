//! 리포트 업로드 파이프라인.
//!
//! 직렬화 → POST → 응답 리포트 역직렬화. 재시도는 하지 않으며
//! 결과 분류만 담당한다. 완료 전달은 호출자(`ReportingClient`)가 큐로 처리한다.

use fieldreport_core::error::CoreError;
use fieldreport_core::models::report::Report;
use fieldreport_core::ports::transport::{ProgressFn, ReportTransport};
use tracing::debug;

/// 업로드 요청 콘텐츠 타입
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 리포트를 전송하고 서버가 보강한 리포트를 반환한다.
pub(crate) async fn upload(
    transport: &dyn ReportTransport,
    url: &str,
    report: Report,
    progress: ProgressFn,
) -> Result<Report, CoreError> {
    let body = tokio::task::spawn_blocking(move || serde_json::to_vec(&report))
        .await
        .map_err(|e| CoreError::Internal(format!("직렬화 작업 실패: {}", e)))??;

    debug!("리포트 업로드: {} ({} bytes)", url, body.len());
    let response = transport.post(url, CONTENT_TYPE_JSON, body, progress).await?;
    parse_response(&response)
}

/// 응답 본문을 리포트로 해석. `null`이나 해석 불가 본문은 `InvalidResponse`.
pub(crate) fn parse_response(body: &[u8]) -> Result<Report, CoreError> {
    let parsed: Option<Report> = serde_json::from_slice(body)
        .map_err(|e| CoreError::InvalidResponse(format!("리포트 역직렬화 실패: {}", e)))?;
    parsed.ok_or_else(|| CoreError::InvalidResponse("빈 응답 (null)".to_string()))
}
