//! tracing → 리포트 이벤트 브리지.
//!
//! 구독자 초기화는 클라이언트 생성보다 먼저 일어나므로, 레이어는 [`LogSink`]를 통해
//! 나중에 연결되는 핸들로 기록한다. `fieldreport*` 타깃의 이벤트는 기록하지 않는다.

use fieldreport_core::models::event::EventLevel;
use parking_lot::RwLock;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::handle::ReportingHandle;

/// 자체 로그 타깃 접두사 (재귀 기록 방지)
const OWN_TARGET_PREFIX: &str = "fieldreport";

/// 레이어와 클라이언트를 잇는 연결 지점
#[derive(Clone, Default)]
pub struct LogSink {
    target: Arc<RwLock<Option<ReportingHandle>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, handle: ReportingHandle) {
        *self.target.write() = Some(handle);
    }

    pub fn detach(&self) {
        *self.target.write() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.target.read().as_ref().is_some_and(|h| h.is_alive())
    }

    fn record(&self, level: EventLevel, message: String) {
        if let Some(handle) = self.target.read().as_ref() {
            handle.log_captured(level, message);
        }
    }
}

/// tracing 이벤트를 리포트 이벤트로 기록하는 레이어
pub struct ReportingLayer {
    sink: LogSink,
}

impl ReportingLayer {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for ReportingLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET_PREFIX) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.sink.record(event_level(metadata.level()), visitor.finish());
    }
}

fn event_level(level: &Level) -> EventLevel {
    match *level {
        Level::ERROR => EventLevel::Error,
        Level::WARN => EventLevel::Warning,
        _ => EventLevel::Info,
    }
}

/// `message` 필드는 본문, 나머지는 `key=value`로 뒤에 붙인다
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}
