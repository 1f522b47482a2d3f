//! HTTP 리포트 전송.
//!
//! `ReportTransport` 포트 구현. 상태 코드별 에러 매핑 + 재시도 로직.
//! 재시도 여부는 전송 계층만 결정하며, 기본값(`max_retries = 0`)은 한 번만 시도한다.

use async_trait::async_trait;
use fieldreport_core::config::ServerConfig;
use fieldreport_core::error::CoreError;
use fieldreport_core::ports::transport::{Progress, ProgressFn, ReportTransport};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry-After 헤더가 없을 때 대기 시간 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 대기 상한
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// reqwest 기반 리포트 전송: `ReportTransport` 포트 구현
pub struct HttpReportTransport {
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpReportTransport {
    /// 새 HTTP 전송 생성
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            max_retries: 0,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// 서버 설정(타임아웃, 재시도 횟수)으로 생성
    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.request_timeout())?.with_max_retries(config.max_retries))
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 첫 재시도 대기 시간 설정 (이후 2배씩 증가)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            code => Err(CoreError::Http {
                status: code,
                body: text,
            }),
        }
    }

    /// 요청 1회 실행 (진행률 보고 포함)
    async fn post_once(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
        progress: &ProgressFn,
    ) -> Result<Vec<u8>, CoreError> {
        progress(Progress::new(0.0, 0.0));

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("리포트 전송 요청 실패: {e}")))?;

        let mut resp = Self::check_response(resp).await?;
        progress(Progress::new(1.0, 0.0));

        let total = resp.content_length().filter(|len| *len > 0);
        let mut received = Vec::with_capacity(total.unwrap_or(0) as usize);
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| CoreError::Network(format!("응답 수신 실패: {e}")))?
        {
            received.extend_from_slice(&chunk);
            if let Some(total) = total {
                progress(Progress::new(1.0, received.len() as f32 / total as f32));
            }
        }

        progress(Progress::new(1.0, 1.0));
        Ok(received)
    }
}

#[async_trait]
impl ReportTransport for HttpReportTransport {
    /// exponential backoff: delay → 2×delay → … (상한 30초)
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
        progress: ProgressFn,
    ) -> Result<Vec<u8>, CoreError> {
        debug!("리포트 POST: {url} ({} bytes)", body.len());
        let mut delay = self.retry_delay;

        let mut attempt = 0;
        loop {
            match self.post_once(url, content_type, body.clone(), &progress).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_retryable() || attempt >= self.max_retries {
                        return Err(e);
                    }

                    // RateLimit의 경우 서버 지정 대기 시간 사용
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs);
                    }

                    warn!(
                        "전송 실패 (시도 {}/{}): {e}, {delay:?} 후 재시도",
                        attempt + 1,
                        self.max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn transport() -> HttpReportTransport {
        HttpReportTransport::new(Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn recorder() -> (ProgressFn, Arc<Mutex<Vec<Progress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (Arc::new(move |p: Progress| sink.lock().push(p)), seen)
    }

    fn url(server: &mockito::Server) -> String {
        format!("{}/api/userreporting", server.url())
    }

    #[tokio::test]
    async fn posts_body_and_returns_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userreporting")
            .match_header("content-type", "application/json")
            .match_body(r#"{"Summary":"stutter"}"#)
            .with_status(200)
            .with_body(r#"{"Identifier":"r-1"}"#)
            .create_async()
            .await;

        let (progress, seen) = recorder();
        let body = br#"{"Summary":"stutter"}"#.to_vec();
        let response = transport()
            .post(&url(&server), "application/json", body, progress)
            .await
            .unwrap();

        assert_eq!(response, br#"{"Identifier":"r-1"}"#.to_vec());
        let seen = seen.lock();
        assert_eq!(seen.first(), Some(&Progress::new(0.0, 0.0)));
        assert_eq!(seen.last(), Some(&Progress::new(1.0, 1.0)));
        assert!(seen.windows(2).all(|w| w[0].download <= w[1].download));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_429_uses_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userreporting")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let (progress, _) = recorder();
        let err = transport()
            .post(&url(&server), "application/json", vec![], progress)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::RateLimit { retry_after_secs: 7 }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn other_status_maps_to_http_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userreporting")
            .with_status(400)
            .with_body("bad report")
            .expect(1)
            .create_async()
            .await;

        // 재시도 대상이 아니므로 한 번만 요청
        let (progress, _) = recorder();
        let err = transport()
            .with_max_retries(2)
            .post(&url(&server), "application/json", vec![], progress)
            .await
            .unwrap_err();

        match err {
            CoreError::Http { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad report");
            }
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn service_unavailable_is_retried_up_to_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userreporting")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(2)
            .create_async()
            .await;

        let (progress, _) = recorder();
        let err = transport()
            .with_max_retries(1)
            .post(&url(&server), "application/json", b"{}".to_vec(), progress)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ServiceUnavailable(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn default_config_does_not_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/userreporting")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let config = ServerConfig {
            endpoint: server.url(),
            ..ServerConfig::default()
        };
        let (progress, _) = recorder();
        let err = HttpReportTransport::from_config(&config)
            .unwrap()
            .post(&config.report_url(), "application/json", vec![], progress)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ServiceUnavailable(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let (progress, _) = recorder();
        let err = transport()
            .post("http://127.0.0.1:9/api/userreporting", "application/json", vec![], progress)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }
}
