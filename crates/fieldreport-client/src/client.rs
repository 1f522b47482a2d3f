//! 리포팅 클라이언트.
//!
//! 이벤트/측정 구간/스크린샷을 고정 용량 순환 버퍼에 모으고, 요청 시 하나의 리포트로 조립해
//! 업로드한다. 모든 상태 변경과 완료 콜백은 호스트가 매 틱 호출하는 [`ReportingClient::update`]
//! 컨텍스트에서 실행된다. 백그라운드 작업(캡처, 조립, 업로드)은 tokio 런타임에서 돌고
//! 결과는 [`SyncQueue`](crate::sync_queue::SyncQueue)를 통해서만 돌아온다.
//!
//! # 측정 구간
//!
//! `frames_per_measure` 틱마다 현재 구간의 지표가 하나의 `Measure`로 확정되고,
//! 그 틱 동안만 `is_measure_boundary()`가 `true`다. `Disabled` 모드에서는 매 틱이 경계다.
//!
//! # 천공(perforation)
//!
//! `create_report`는 호출 시점까지 요청된 스크린샷이 모두 저장되고 구간 경계에 도달할 때까지
//! 큐에 자신을 다시 넣으며 기다린다. 스레드를 막지 않으므로 업데이트 스레드에서 호출해도 된다.

use fieldreport_core::config::{AppConfig, ClientConfig, MetricsGatheringMode, ServerConfig};
use fieldreport_core::error::CoreError;
use fieldreport_core::models::event::{EventLevel, ExceptionInfo};
use fieldreport_core::models::named_value::NamedValue;
use fieldreport_core::models::report::Report;
use fieldreport_core::models::screenshot::Screenshot;
use fieldreport_core::ports::analytics::AnalyticsSink;
use fieldreport_core::ports::transport::{Progress, ProgressFn};
use fieldreport_core::ports::vision::ScreenshotSource;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{debug, error, info, trace, warn};

use crate::handle::ReportingHandle;
use crate::platform::Platform;
use crate::state::{elapsed_ms, SharedState};
use crate::sync_queue::SyncAction;
use crate::upload;

/// 업데이트 1틱 소요 시간 (ms)
pub const UPDATE_METRIC: &str = "ReportingClient.Update";
/// 자동 수집 프레임레이트
pub const FRAMES_PER_SECOND_METRIC: &str = "Graphics.FramesPerSecond";
/// 전송 성공 시 분석 이벤트 이름
pub const SEND_REPORT_EVENT: &str = "ReportingClient.SendReport";
/// 클라이언트 버전 디바이스 메타데이터 키
pub const CLIENT_VERSION_METADATA: &str = "ReportingClientVersion";

type SendCallback = Box<dyn FnOnce(&mut ReportingClient, Result<Report, CoreError>) + Send>;

/// 리포팅 클라이언트 (업데이트 컨텍스트 소유)
pub struct ReportingClient {
    shared: Arc<SharedState>,
    platform: Platform,
    runtime: Handle,
    config: ClientConfig,
    server: ServerConfig,
    send_events_to_analytics: bool,
    measure_frames: u64,
    is_measure_boundary: bool,
    screenshots_taken: u64,
    screenshots_saved: u64,
    last_update: Option<Instant>,
}

impl ReportingClient {
    /// 새 클라이언트 생성
    ///
    /// 현재 tokio 런타임 안에서 호출해야 한다. 용량 설정은 최소 1로 보정된다.
    pub fn new(config: &AppConfig, platform: Platform) -> Result<Self, CoreError> {
        let runtime = Handle::try_current()
            .map_err(|e| CoreError::Internal(format!("tokio 런타임을 찾을 수 없음: {}", e)))?;

        let client_config = config.client.clone().normalized();
        let shared = Arc::new(SharedState::new(
            &client_config,
            &config.reporting,
            &config.server.project_identifier,
        ));

        for metadata in platform.device_metadata.device_metadata() {
            shared.add_device_metadata(metadata.name, metadata.value);
        }
        shared.add_device_metadata(CLIENT_VERSION_METADATA, env!("CARGO_PKG_VERSION"));

        info!(
            "리포팅 클라이언트 생성: 이벤트 {}, 측정 {}, 스크린샷 {}, 구간 {}프레임, 모드 {:?}",
            client_config.maximum_event_count,
            client_config.maximum_measure_count,
            client_config.maximum_screenshot_count,
            client_config.frames_per_measure,
            client_config.metrics_gathering_mode
        );

        Ok(Self {
            shared,
            platform,
            runtime,
            config: client_config,
            server: config.server.clone(),
            send_events_to_analytics: config.reporting.send_events_to_analytics,
            measure_frames: 0,
            is_measure_boundary: false,
            screenshots_taken: 0,
            screenshots_saved: 0,
            last_update: None,
        })
    }

    /// 다른 스레드에서 쓸 핸들
    pub fn handle(&self) -> ReportingHandle {
        ReportingHandle::new(&self.shared)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn frame_number(&self) -> u64 {
        self.shared.frame_number()
    }

    pub fn is_measure_boundary(&self) -> bool {
        self.is_measure_boundary
    }

    pub fn screenshots_taken(&self) -> u64 {
        self.screenshots_taken
    }

    pub fn screenshots_saved(&self) -> u64 {
        self.screenshots_saved
    }

    /// 큐에서 대기 중인 작업 수
    pub fn pending_actions(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_connected_to_logger(&self) -> bool {
        self.shared.logger_connected.load(Ordering::Relaxed)
    }

    pub fn set_connected_to_logger(&self, connected: bool) {
        self.shared.logger_connected.store(connected, Ordering::Relaxed);
    }

    pub fn log_event(&self, level: EventLevel, message: impl Into<String>) {
        self.shared.log_event(level, Some(message.into()), None, None);
    }

    pub fn log_event_with_stack(
        &self,
        level: EventLevel,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) {
        self.shared
            .log_event(level, Some(message.into()), Some(stack_trace.into()), None);
    }

    /// 에러를 구조화된 예외 정보와 함께 Error 이벤트로 기록
    pub fn log_error<E: StdError + ?Sized>(&self, error: &E) {
        self.shared.log_event(
            EventLevel::Error,
            Some(error.to_string()),
            None,
            Some(ExceptionInfo::from_error(error)),
        );
    }

    /// 현재 측정 구간에 지표 샘플링 (`Disabled` 모드나 NaN/Infinity는 무시)
    pub fn sample_metric(&self, name: &str, value: f64) {
        self.shared.sample_metric(name, value);
    }

    /// 프로세스 수명 동안 누적되는 클라이언트 자체 지표 샘플링
    pub fn sample_client_metric(&self, name: &str, value: f64) {
        self.shared.sample_client_metric(name, value);
    }

    pub fn add_device_metadata(&self, name: impl Into<String>, value: impl Into<String>) {
        self.shared.add_device_metadata(name, value);
    }

    /// 현재 측정 구간 메타데이터 설정 (같은 이름은 덮어씀)
    pub fn add_measure_metadata(&self, name: &str, value: impl Into<String>) {
        self.shared.add_measure_metadata(name, value);
    }

    pub fn clear_screenshots(&self) {
        self.shared.screenshots.lock().clear();
    }

    /// 스크린샷 요청
    ///
    /// 캡처/인코딩은 백그라운드에서 진행되고, 결과는 다음 업데이트 틱에 버퍼에 들어간 뒤
    /// `callback`으로 전달된다. 실패해도 저장된 것으로 집계해 리포트 조립이 멈추지 않는다.
    pub fn take_screenshot<F>(
        &mut self,
        maximum_width: u32,
        maximum_height: u32,
        source: ScreenshotSource,
        callback: F,
    ) where
        F: FnOnce(&mut ReportingClient, Result<Screenshot, CoreError>) + Send + 'static,
    {
        self.log_event(EventLevel::Info, "Taking screenshot.");
        self.screenshots_taken += 1;

        let frame_number = self.frame_number();
        let provider = Arc::clone(&self.platform.screenshots);
        let shared = Arc::downgrade(&self.shared);

        self.runtime.spawn(async move {
            let result = provider
                .take_screenshot(frame_number, maximum_width, maximum_height, source)
                .await;
            SharedState::deliver(&shared, move |client| {
                client.save_screenshot(frame_number, result, callback)
            });
        });
    }

    fn save_screenshot<F>(
        &mut self,
        frame_number: u64,
        result: Result<Vec<u8>, CoreError>,
        callback: F,
    ) where
        F: FnOnce(&mut ReportingClient, Result<Screenshot, CoreError>),
    {
        let result = result.map(|data| {
            let screenshot = Screenshot::new(frame_number, data);
            self.shared.screenshots.lock().push(screenshot.clone());
            screenshot
        });

        if let Err(e) = &result {
            warn!("스크린샷 실패 (프레임 {}): {}", frame_number, e);
            self.log_event(EventLevel::Error, format!("Taking screenshot failed: {}", e));
        }

        self.screenshots_saved += 1;
        callback(self, result);
    }

    /// 리포트 생성 요청
    ///
    /// 천공 조건이 만족되면 버퍼 복사본으로 백그라운드에서 조립하고,
    /// 완성된 리포트를 업데이트 컨텍스트에서 `callback`으로 전달한다.
    pub fn create_report<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut ReportingClient, Report) + Send + 'static,
    {
        self.log_event(EventLevel::Info, "Creating report.");
        let screenshots_taken = self.screenshots_taken;
        self.wait_for_perforation(
            screenshots_taken,
            Box::new(move |client: &mut ReportingClient| client.spawn_report_task(callback)),
        );
    }

    fn wait_for_perforation(&mut self, screenshots_taken: u64, then: SyncAction<ReportingClient>) {
        if self.screenshots_saved >= screenshots_taken && self.is_measure_boundary {
            then(self);
        } else {
            self.shared
                .queue
                .enqueue(move |client| client.wait_for_perforation(screenshots_taken, then));
        }
    }

    fn spawn_report_task<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut ReportingClient, Report) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let weak = Arc::downgrade(&self.shared);
        let decorator = self.platform.decorator.clone();

        let task = self
            .runtime
            .spawn_blocking(move || shared.assemble_report(decorator.as_deref()));

        self.runtime.spawn(async move {
            match task.await {
                Ok(report) => {
                    SharedState::deliver(&weak, move |client| callback(client, report));
                }
                Err(e) => error!("리포트 조립 작업 실패: {}", e),
            }
        });
    }

    /// 리포트 전송
    ///
    /// 서버 할당 필드가 설정된 리포트는 네트워크 요청 없이 `Err(ServerAssignedField)`로 완료된다.
    /// 완료는 항상 업데이트 컨텍스트에서 정확히 한 번 전달된다.
    pub fn send_report<F>(&mut self, report: Report, callback: F)
    where
        F: FnOnce(&mut ReportingClient, Result<Report, CoreError>) + Send + 'static,
    {
        self.send_report_inner(report, Arc::new(|_| {}), Box::new(callback));
    }

    /// 진행률 콜백과 함께 리포트 전송 (진행률도 업데이트 컨텍스트에서 전달)
    pub fn send_report_with_progress<P, F>(&mut self, report: Report, progress: P, callback: F)
    where
        P: Fn(&mut ReportingClient, Progress) + Send + Sync + 'static,
        F: FnOnce(&mut ReportingClient, Result<Report, CoreError>) + Send + 'static,
    {
        let progress = Arc::new(progress);
        let shared = Arc::downgrade(&self.shared);
        let forward: ProgressFn = Arc::new(move |value: Progress| {
            let progress = Arc::clone(&progress);
            SharedState::deliver(&shared, move |client| progress(client, value));
        });
        self.send_report_inner(report, forward, Box::new(callback));
    }

    fn send_report_inner(&mut self, report: Report, progress: ProgressFn, callback: SendCallback) {
        if let Some(field) = report.server_assigned_field() {
            warn!("서버 할당 필드가 설정된 리포트 전송 거부: {}", field);
            self.log_event(
                EventLevel::Warning,
                format!(
                    "{} cannot be set on the client side. The value provided was discarded.",
                    field
                ),
            );
            self.shared.queue.enqueue(move |client| {
                callback(client, Err(CoreError::ServerAssignedField(field)))
            });
            return;
        }

        self.log_event(EventLevel::Info, "Sending report.");

        let transport = Arc::clone(&self.platform.transport);
        let url = self.server.report_url();
        let analytics = if self.send_events_to_analytics {
            self.platform.analytics.clone()
        } else {
            None
        };
        let shared = Arc::downgrade(&self.shared);

        self.runtime.spawn(async move {
            let outcome = upload::upload(transport.as_ref(), &url, report, progress).await;
            SharedState::deliver(&shared, move |client| {
                client.finish_send(outcome, analytics, callback)
            });
        });
    }

    fn finish_send(
        &mut self,
        outcome: Result<Report, CoreError>,
        analytics: Option<Arc<dyn AnalyticsSink>>,
        callback: SendCallback,
    ) {
        match outcome {
            Ok(server_report) => {
                let identifier = server_report.overview.identifier.clone().unwrap_or_default();
                info!("리포트 전송 완료: {}", identifier);
                // 전송 전 리포트에는 식별자가 없으므로 서버가 할당한 식별자를 싣는다
                if let Some(sink) = analytics {
                    sink.send_event(
                        SEND_REPORT_EVENT,
                        &[NamedValue::new("ReportIdentifier", identifier)],
                    );
                }
                callback(self, Ok(server_report));
            }
            Err(e) => {
                error!("리포트 전송 실패: {}", e);
                self.log_event(EventLevel::Error, format!("Sending report failed: {}", e));
                callback(self, Err(e));
            }
        }
    }

    /// 리포트를 JSON 파일로 저장
    pub fn save_report_to_disk(
        &self,
        report: &Report,
        path: impl AsRef<Path>,
    ) -> Result<(), CoreError> {
        let path = path.as_ref();
        self.log_event(EventLevel::Info, "Saving report to disk.");

        let json = serde_json::to_string_pretty(report)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;

        info!("리포트 저장: {}", path.display());
        Ok(())
    }

    /// 1틱 진행
    ///
    /// 자동 지표 샘플링 → 측정 구간 확정 → 큐 드레인 → 프레임 번호 증가 순서로 실행한다.
    pub fn update(&mut self) {
        let started = Instant::now();
        let mode = self.config.metrics_gathering_mode;

        if mode == MetricsGatheringMode::Automatic {
            self.sample_automatic_metrics(started);
        }
        self.last_update = Some(started);

        if mode != MetricsGatheringMode::Disabled {
            self.is_measure_boundary = false;
            let frames_per_measure = self.config.frames_per_measure;
            if self.measure_frames >= frames_per_measure {
                let frame_number = self.shared.frame_number();
                let start = frame_number.saturating_sub(frames_per_measure);
                let end = frame_number.saturating_sub(1);
                self.shared.close_measure(start, end);
                self.measure_frames = 0;
                self.is_measure_boundary = true;
                trace!("측정 구간 확정: {}..={}", start, end);
            }
            self.measure_frames += 1;
        } else {
            self.is_measure_boundary = true;
        }

        let shared = Arc::clone(&self.shared);
        let executed = shared.queue.drain(self);
        if executed > 0 {
            trace!("동기화 작업 {}개 실행", executed);
        }

        shared.frame_number.fetch_add(1, Ordering::Relaxed);
        shared.sample_client_metric(UPDATE_METRIC, elapsed_ms(started));
    }

    #[cfg(test)]
    pub(crate) fn shared_events(&self) -> Vec<fieldreport_core::models::event::Event> {
        self.shared.events.lock().to_vec()
    }

    fn sample_automatic_metrics(&self, now: Instant) {
        if let Some(last) = self.last_update {
            let delta = now.duration_since(last).as_secs_f64();
            if delta > 0.0 {
                self.shared.sample_metric(FRAMES_PER_SECOND_METRIC, 1.0 / delta);
            }
        }
        for source in &self.platform.metric_sources {
            for (name, value) in source.collect() {
                self.shared.sample_metric(&name, value);
            }
        }
    }
}

impl Drop for ReportingClient {
    fn drop(&mut self) {
        let pending = self.shared.queue.len();
        if pending > 0 {
            debug!("리포팅 클라이언트 해제, 미실행 작업 {}개 폐기", pending);
        }
    }
}
