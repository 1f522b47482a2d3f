//! 다른 스레드에서 쓰는 리포팅 핸들.
//!
//! 클라이언트 상태를 약한 참조로 들고 있으므로 클라이언트가 해제된 뒤에는
//! 모든 호출이 아무 일도 하지 않는다.

use fieldreport_core::models::event::{EventLevel, ExceptionInfo};
use std::error::Error as StdError;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use crate::client::ReportingClient;
use crate::state::SharedState;

/// 생산자 스레드용 핸들 (복제 가능)
#[derive(Clone)]
pub struct ReportingHandle {
    shared: Weak<SharedState>,
}

impl ReportingHandle {
    pub(crate) fn new(shared: &Arc<SharedState>) -> Self {
        Self {
            shared: Arc::downgrade(shared),
        }
    }

    /// 클라이언트가 아직 살아 있는지
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    pub fn frame_number(&self) -> Option<u64> {
        self.shared.upgrade().map(|s| s.frame_number())
    }

    pub fn log_event(&self, level: EventLevel, message: impl Into<String>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.log_event(level, Some(message.into()), None, None);
        }
    }

    pub fn log_event_with_stack(
        &self,
        level: EventLevel,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) {
        if let Some(shared) = self.shared.upgrade() {
            shared.log_event(level, Some(message.into()), Some(stack_trace.into()), None);
        }
    }

    pub fn log_error<E: StdError + ?Sized>(&self, error: &E) {
        if let Some(shared) = self.shared.upgrade() {
            shared.log_event(
                EventLevel::Error,
                Some(error.to_string()),
                None,
                Some(ExceptionInfo::from_error(error)),
            );
        }
    }

    /// 로거 연결 상태에서만 기록 (tracing 브리지용)
    pub(crate) fn log_captured(&self, level: EventLevel, message: String) {
        if let Some(shared) = self.shared.upgrade() {
            if shared.logger_connected.load(Ordering::Relaxed) {
                shared.log_event(level, Some(message), None, None);
            }
        }
    }

    pub fn sample_metric(&self, name: &str, value: f64) {
        if let Some(shared) = self.shared.upgrade() {
            shared.sample_metric(name, value);
        }
    }

    pub fn sample_client_metric(&self, name: &str, value: f64) {
        if let Some(shared) = self.shared.upgrade() {
            shared.sample_client_metric(name, value);
        }
    }

    pub fn add_device_metadata(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.add_device_metadata(name, value);
        }
    }

    pub fn add_measure_metadata(&self, name: &str, value: impl Into<String>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.add_measure_metadata(name, value);
        }
    }

    /// 다음 업데이트 틱에 클라이언트 컨텍스트에서 실행할 작업 추가
    ///
    /// 클라이언트가 해제되었으면 `false`.
    pub fn run_on_update<F>(&self, action: F) -> bool
    where
        F: FnOnce(&mut ReportingClient) + Send + 'static,
    {
        SharedState::deliver(&self.shared, action)
    }
}
