//! 업데이트 컨텍스트와 생산자 스레드가 공유하는 상태.
//!
//! 구조체마다 락을 하나씩 두고, 락은 O(1) 변경 동안만 잡는다.
//! I/O나 콜백 호출 중에는 락을 잡지 않는다.

use fieldreport_core::config::{ClientConfig, MetricsGatheringMode, ReportingConfig};
use fieldreport_core::models::event::{Event, EventLevel, ExceptionInfo};
use fieldreport_core::models::measure::Measure;
use fieldreport_core::models::metric::Metric;
use fieldreport_core::models::named_value::{self, NamedValue};
use fieldreport_core::models::report::Report;
use fieldreport_core::models::screenshot::Screenshot;
use fieldreport_core::ports::analytics::ReportDecorator;
use fieldreport_core::ring::BoundedRingBuffer;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Weak;
use std::time::Instant;
use tracing::debug;

use crate::client::ReportingClient;
use crate::sync_queue::SyncQueue;

/// 리포트 조립 소요 시간 지표
pub(crate) const CREATE_REPORT_TASK_METRIC: &str = "ReportingClient.CreateReport.Task";

pub(crate) struct SharedState {
    pub(crate) project_identifier: String,
    pub(crate) gathering_mode: MetricsGatheringMode,
    pub(crate) self_reporting: bool,
    pub(crate) logger_connected: AtomicBool,
    pub(crate) frame_number: AtomicU64,
    pub(crate) events: Mutex<BoundedRingBuffer<Event>>,
    pub(crate) measures: Mutex<BoundedRingBuffer<Measure>>,
    pub(crate) screenshots: Mutex<BoundedRingBuffer<Screenshot>>,
    pub(crate) device_metadata: Mutex<Vec<NamedValue>>,
    pub(crate) current_measure_metadata: Mutex<Vec<NamedValue>>,
    pub(crate) current_metrics: Mutex<BTreeMap<String, Metric>>,
    pub(crate) client_metrics: Mutex<BTreeMap<String, Metric>>,
    pub(crate) queue: SyncQueue<ReportingClient>,
}

impl SharedState {
    /// `config`는 이미 보정된 값이어야 한다
    pub(crate) fn new(
        config: &ClientConfig,
        reporting: &ReportingConfig,
        project_identifier: &str,
    ) -> Self {
        Self {
            project_identifier: project_identifier.to_string(),
            gathering_mode: config.metrics_gathering_mode,
            self_reporting: reporting.self_reporting,
            logger_connected: AtomicBool::new(reporting.connect_to_logger),
            frame_number: AtomicU64::new(0),
            events: Mutex::new(BoundedRingBuffer::new(config.maximum_event_count)),
            measures: Mutex::new(BoundedRingBuffer::new(config.maximum_measure_count)),
            screenshots: Mutex::new(BoundedRingBuffer::new(config.maximum_screenshot_count)),
            device_metadata: Mutex::new(Vec::new()),
            current_measure_metadata: Mutex::new(Vec::new()),
            current_metrics: Mutex::new(BTreeMap::new()),
            client_metrics: Mutex::new(BTreeMap::new()),
            queue: SyncQueue::new(),
        }
    }

    pub(crate) fn frame_number(&self) -> u64 {
        self.frame_number.load(Ordering::Relaxed)
    }

    pub(crate) fn log_event(
        &self,
        level: EventLevel,
        message: Option<String>,
        stack_trace: Option<String>,
        exception: Option<ExceptionInfo>,
    ) {
        let mut event = Event::new(level, String::new(), self.frame_number());
        event.message = message;
        event.stack_trace = stack_trace;
        event.exception = exception;
        self.events.lock().push(event);
    }

    pub(crate) fn sample_metric(&self, name: &str, value: f64) {
        if self.gathering_mode == MetricsGatheringMode::Disabled || !value.is_finite() {
            return;
        }
        sample_into(&mut self.current_metrics.lock(), name, value);
    }

    pub(crate) fn sample_client_metric(&self, name: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        sample_into(&mut self.client_metrics.lock(), name, value);
        if self.self_reporting {
            self.sample_metric(name, value);
        }
    }

    pub(crate) fn add_device_metadata(&self, name: impl Into<String>, value: impl Into<String>) {
        self.device_metadata.lock().push(NamedValue::new(name, value));
    }

    pub(crate) fn add_measure_metadata(&self, name: &str, value: impl Into<String>) {
        named_value::upsert(&mut self.current_measure_metadata.lock(), name, value);
    }

    /// 현재 구간을 측정값으로 확정해 버퍼에 넣는다.
    ///
    /// 다음에 밀려날 측정값의 벡터를 비워서 재사용한다.
    pub(crate) fn close_measure(&self, start_frame_number: u64, end_frame_number: u64) {
        let mut measures = self.measures.lock();
        let mut measure = measures
            .pending_eviction_mut()
            .map(std::mem::take)
            .unwrap_or_default();

        measure.start_frame_number = start_frame_number;
        measure.end_frame_number = end_frame_number;
        measure.metadata.clear();
        measure
            .metadata
            .extend(self.current_measure_metadata.lock().iter().cloned());
        measure.metrics.clear();
        measure
            .metrics
            .extend(std::mem::take(&mut *self.current_metrics.lock()).into_values());

        measures.push(measure);
    }

    /// 버퍼 복사본으로 리포트 조립 (백그라운드 스레드에서 실행)
    pub(crate) fn assemble_report(&self, decorator: Option<&dyn ReportDecorator>) -> Report {
        let started = Instant::now();

        let mut report = Report::new(self.project_identifier.as_str());
        report.device_metadata = self.device_metadata.lock().clone();
        report.events = self.events.lock().to_vec();
        report.measures = self.measures.lock().to_vec();
        report.screenshots = self.screenshots.lock().to_vec();
        report.complete();

        if let Some(decorator) = decorator {
            decorator.decorate(&mut report);
        }

        self.sample_client_metric(CREATE_REPORT_TASK_METRIC, elapsed_ms(started));
        report.client_metrics = self.client_metrics.lock().values().cloned().collect();
        report
    }

    /// 업데이트 컨텍스트로 작업 전달. 클라이언트가 이미 해제되었으면 버린다.
    pub(crate) fn deliver<F>(shared: &Weak<SharedState>, action: F) -> bool
    where
        F: FnOnce(&mut ReportingClient) + Send + 'static,
    {
        match shared.upgrade() {
            Some(shared) => {
                shared.queue.enqueue(action);
                true
            }
            None => {
                debug!("클라이언트 해제됨, 완료 작업 폐기");
                false
            }
        }
    }
}

fn sample_into(metrics: &mut BTreeMap<String, Metric>, name: &str, value: f64) {
    match metrics.get_mut(name) {
        Some(metric) => {
            metric.sample(value);
        }
        None => {
            let mut metric = Metric::new(name);
            metric.sample(value);
            metrics.insert(name.to_string(), metric);
        }
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
