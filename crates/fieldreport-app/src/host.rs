//! 프레임 루프 호스트.
//!
//! 게임 루프를 흉내 내며 매 틱 `ReportingClient::update`를 호출한다.
//! 지표/로그/측정 메타데이터를 만들어 내고, 렌더 결과를 `main` 카메라로 등록하며,
//! 종료 시 리포트를 생성해 저장하거나 전송한다.

use anyhow::{anyhow, Result};
use fieldreport_client::{FramerateMonitor, ReportingClient};
use fieldreport_core::config::{MonitorConfig, ScreenshotConfig};
use fieldreport_core::models::report::Report;
use fieldreport_core::ports::vision::{RgbaFrame, ScreenshotSource};
use fieldreport_vision::ImageScreenshotProvider;
use parking_lot::Mutex;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 렌더 타깃 크기
const RENDER_WIDTH: u32 = 320;
const RENDER_HEIGHT: u32 = 180;

/// 카메라 이름
pub const MAIN_CAMERA: &str = "main";

/// 콜백 완료를 기다리는 최대 틱 수
const MAX_PUMP_TICKS: u32 = 10_000;

/// 호스트 실행 옵션
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub frames: u64,
    pub fps: f64,
    pub save_path: Option<PathBuf>,
    pub send: bool,
}

/// 실행 결과
#[derive(Debug, Clone, Default)]
pub struct HostOutcome {
    pub frames_run: u64,
    pub report: Option<Report>,
    pub saved_to: Option<PathBuf>,
    pub server_identifier: Option<String>,
}

pub struct FrameHost {
    client: ReportingClient,
    monitor: FramerateMonitor,
    screenshots: Arc<ImageScreenshotProvider>,
    screenshot: ScreenshotConfig,
    options: HostOptions,
}

impl FrameHost {
    pub fn new(
        client: ReportingClient,
        monitor_config: &MonitorConfig,
        screenshots: Arc<ImageScreenshotProvider>,
        screenshot: ScreenshotConfig,
        options: HostOptions,
    ) -> Self {
        Self {
            client,
            monitor: FramerateMonitor::new(monitor_config),
            screenshots,
            screenshot,
            options,
        }
    }

    /// 프레임 루프 실행 후 최종 리포트 처리
    pub async fn run<S>(mut self, shutdown: S) -> Result<HostOutcome>
    where
        S: Future<Output = ()>,
    {
        let mut ticker = ticker(self.options.fps)?;
        tokio::pin!(shutdown);

        let mut outcome = HostOutcome::default();
        let mut last = Instant::now();
        info!(
            "프레임 루프 시작: {}프레임 @ {}fps",
            self.options.frames, self.options.fps
        );

        while outcome.frames_run < self.options.frames {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("종료 신호 수신, 프레임 루프 중단");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let now = Instant::now();
            let delta = now.duration_since(last);
            last = now;

            self.client.update();
            self.simulate_frame(outcome.frames_run);
            self.monitor.observe(&mut self.client, delta);
            outcome.frames_run += 1;
        }

        let report = self.create_final_report(&mut ticker).await?;

        if let Some(path) = self.options.save_path.clone() {
            self.client.save_report_to_disk(&report, &path)?;
            outcome.saved_to = Some(path);
        }

        if self.options.send {
            let sent = self.send(report.clone(), &mut ticker).await?;
            outcome.server_identifier = sent.overview.identifier;
        }

        outcome.report = Some(report);
        Ok(outcome)
    }

    /// 한 프레임 분량의 게임 상태 생성
    fn simulate_frame(&mut self, frame: u64) {
        let frames_per_measure = self.client.config().frames_per_measure.max(1);
        let entities = 100.0 + (frame % 50) as f64;
        self.client.sample_metric("Game.EntityCount", entities);
        self.client.sample_metric("Game.DrawCalls", (entities * 1.5).round());

        if frame % frames_per_measure == 0 {
            let scene = ["Forest", "Cave", "Town"][(frame / frames_per_measure % 3) as usize];
            self.client.add_measure_metadata("Scene", scene);
            self.screenshots.register_camera(MAIN_CAMERA, render(frame));
            info!(target: "game", scene, "scene loaded");
        }
        if frame > 0 && frame % 97 == 0 {
            warn!(target: "game::audio", frame, "audio buffer underrun");
        }
    }

    async fn create_final_report(&mut self, ticker: &mut Interval) -> Result<Report> {
        self.client.take_screenshot(
            self.screenshot.maximum_width,
            self.screenshot.maximum_height,
            ScreenshotSource::Camera(MAIN_CAMERA.to_string()),
            |_, result| {
                if let Err(e) = result {
                    warn!("최종 스크린샷 실패: {}", e);
                }
            },
        );

        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        self.client.create_report(move |_, mut report| {
            report.overview.summary = "Session summary".to_string();
            *sink.lock() = Some(report);
        });

        let report = self.pump(ticker, &slot).await?;
        info!(
            "리포트 생성: 이벤트 {}개, 측정 구간 {}개, 스크린샷 {}개",
            report.events.len(),
            report.measures.len(),
            report.screenshots.len()
        );
        Ok(report)
    }

    async fn send(&mut self, report: Report, ticker: &mut Interval) -> Result<Report> {
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        self.client.send_report_with_progress(
            report,
            |_, progress| debug!("업로드 진행률: {:.0}%", progress.upload * 100.0),
            move |_, result| *sink.lock() = Some(result),
        );

        Ok(self.pump(ticker, &slot).await??)
    }

    /// 콜백이 슬롯을 채울 때까지 틱 진행
    async fn pump<T>(
        &mut self,
        ticker: &mut Interval,
        slot: &Arc<Mutex<Option<T>>>,
    ) -> Result<T> {
        for _ in 0..MAX_PUMP_TICKS {
            ticker.tick().await;
            self.client.update();
            if let Some(value) = slot.lock().take() {
                return Ok(value);
            }
        }
        Err(anyhow!("{}틱 안에 완료되지 않음", MAX_PUMP_TICKS))
    }
}

fn ticker(fps: f64) -> Result<Interval> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(anyhow!("잘못된 fps: {}", fps));
    }
    let mut ticker = interval(Duration::from_secs_f64(1.0 / fps));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ok(ticker)
}

/// 프레임 번호로 색이 변하는 그라데이션 렌더 타깃
fn render(frame: u64) -> RgbaFrame {
    let shade = (frame % 256) as u8;
    let mut pixels = Vec::with_capacity((RENDER_WIDTH * RENDER_HEIGHT * 4) as usize);
    for y in 0..RENDER_HEIGHT {
        for x in 0..RENDER_WIDTH {
            pixels.extend_from_slice(&[
                (x * 255 / RENDER_WIDTH) as u8,
                (y * 255 / RENDER_HEIGHT) as u8,
                shade,
                255,
            ]);
        }
    }
    RgbaFrame::new(RENDER_WIDTH, RENDER_HEIGHT, pixels)
}
