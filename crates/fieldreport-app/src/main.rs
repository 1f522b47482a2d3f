//! # fieldreport-app
//!
//! fieldreport 데모 호스트 바이너리 진입점.
//! 설정 로드, 플랫폼 협력자 DI, 프레임 루프 실행, 리포트 저장/전송.

mod host;
mod wiring;

use anyhow::Result;
use clap::Parser;
use fieldreport_client::{LogSink, ReportingClient, ReportingLayer};
use fieldreport_core::config::AppConfig;
use fieldreport_core::config_manager::ConfigManager;
use fieldreport_vision::ImageScreenshotProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::host::{FrameHost, HostOptions};

/// fieldreport 데모 호스트
///
/// 게임 루프를 흉내 내며 진단 데이터를 모으고 리포트를 만든다
#[derive(Parser, Debug)]
#[command(name = "fieldreport")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 리포트 서버 URL (설정 파일 값 덮어씀)
    #[arg(long, short = 'e')]
    endpoint: Option<String>,

    /// 프로젝트 식별자
    #[arg(long, short = 'p')]
    project: Option<String>,

    /// 실행할 프레임 수
    #[arg(long, short = 'n', default_value = "600")]
    frames: u64,

    /// 목표 프레임레이트
    #[arg(long, default_value = "60")]
    fps: f64,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 최종 리포트를 JSON으로 저장할 경로
    #[arg(long)]
    save: Option<PathBuf>,

    /// 최종 리포트를 서버로 전송
    #[arg(long)]
    send: bool,
}

/// 설정 로드 (실패 시 기본 설정)
fn load_config(path: Option<PathBuf>) -> AppConfig {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    match manager {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            manager.get()
        }
        Err(e) => {
            warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
            AppConfig::default_config()
        }
    }
}

/// CLI 인자로 설정 덮어쓰기 (파일에는 저장하지 않음)
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(endpoint) = &args.endpoint {
        config.server.endpoint = endpoint.clone();
    }
    if let Some(project) = &args.project {
        config.server.project_identifier = project.clone();
    }
}

/// 기본 저장 경로: `{data_dir}/report-{timestamp}.json`
fn default_save_path() -> Option<PathBuf> {
    let dir = ConfigManager::data_dir().ok()?;
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    Some(dir.join(format!("report-{stamp}.json")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화: 콘솔 출력 + 리포트 이벤트 브리지
    let log_filter = format!(
        "warn,fieldreport={l},fieldreport_app={l},fieldreport_client={l},fieldreport_core={l},\
         fieldreport_network={l},fieldreport_vision={l},fieldreport_monitor={l},game={l}",
        l = args.log_level
    );
    let sink = LogSink::new();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .with(ReportingLayer::new(sink.clone()))
        .init();

    info!("fieldreport 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.clone());
    apply_overrides(&mut config, &args);
    if config.server.project_identifier.is_empty() {
        warn!("프로젝트 식별자가 비어 있음 (--project 또는 설정 파일 지정)");
    }

    // ── 플랫폼 협력자 (DI) ──
    let session_id = wiring::generate_session_id();
    let screenshots = Arc::new(ImageScreenshotProvider::new());
    let platform = wiring::build_platform(&config, Arc::clone(&screenshots), &session_id)?;

    let client = ReportingClient::new(&config, platform)?;
    if config.reporting.connect_to_logger {
        sink.attach(client.handle());
    }
    info!("리포팅 클라이언트 준비: 세션 {}", session_id);

    let save_path = args.save.clone().or_else(|| {
        if args.send {
            None
        } else {
            default_save_path()
        }
    });

    let host = FrameHost::new(
        client,
        &config.monitor,
        screenshots,
        config.screenshot.clone(),
        HostOptions {
            frames: args.frames,
            fps: args.fps,
            save_path,
            send: args.send,
        },
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("종료 신호 핸들러 등록 실패: {e}");
            std::future::pending::<()>().await;
        }
    };

    let outcome = host.run(shutdown).await?;
    sink.detach();

    info!("프레임 {}개 실행 완료", outcome.frames_run);
    if let Some(path) = &outcome.saved_to {
        info!("리포트 저장 위치: {}", path.display());
    }
    if let Some(identifier) = &outcome.server_identifier {
        info!("서버 리포트 식별자: {}", identifier);
    }
    Ok(())
}
