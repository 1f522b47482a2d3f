//! # fieldreport-network
//!
//! `ReportTransport` 포트의 HTTP 구현 (reqwest).
//! 상태 코드별 에러 분류와 선택적 재시도, 업로드/다운로드 진행률 보고를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use fieldreport_network::http_transport::HttpReportTransport;
//!
//! let transport = HttpReportTransport::from_config(&config.server)?;
//! ```

pub mod http_transport;

pub use http_transport::HttpReportTransport;
