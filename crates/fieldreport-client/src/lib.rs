//! # fieldreport-client
//!
//! 리포팅 클라이언트. 이벤트/측정 구간/스크린샷 순환 버퍼, 동기화 큐,
//! 리포트 조립과 업로드 파이프라인, tracing 브리지, 프레임레이트 모니터를 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use fieldreport_client::{Platform, ReportingClient};
//!
//! let mut client = ReportingClient::new(&config, Platform::new(transport, screenshots))?;
//! loop {
//!     client.update();
//! }
//! ```

pub mod client;
pub mod handle;
pub mod log_capture;
pub mod monitor;
pub mod platform;
mod state;
pub mod sync_queue;
pub mod upload;

pub use client::ReportingClient;
pub use handle::ReportingHandle;
pub use log_capture::{LogSink, ReportingLayer};
pub use monitor::FramerateMonitor;
pub use platform::Platform;
pub use sync_queue::{SyncAction, SyncQueue};
