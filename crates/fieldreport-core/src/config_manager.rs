//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리의 `config.json`을 읽고 쓴다.
//! 읽은 설정은 버퍼 용량을 정규화하고 서버 설정을 검증한 뒤에만 공개된다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.json";

/// 리포트 클라이언트 설정 저장소
///
/// 복제본끼리 같은 설정을 공유한다. 디스크 쓰기가 성공한 경우에만 메모리 값이 바뀐다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: Arc<RwLock<AppConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 `config.json` 사용
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// 지정 경로 사용. 파일이 없으면 기본 설정을 기록한다.
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let config = if path.is_file() {
            read_config(&path)?
        } else {
            let defaults = AppConfig::default_config();
            write_config(&path, &defaults)?;
            info!("기본 리포팅 설정 생성: {}", path.display());
            defaults
        };

        Ok(Self {
            current: Arc::new(RwLock::new(config)),
            path,
        })
    }

    /// 현재 설정 (복제본)
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 설정 교체. 정규화/검증 후 디스크에 먼저 쓴다.
    pub fn update(&self, config: AppConfig) -> Result<AppConfig, CoreError> {
        let config = prepare(config)?;
        write_config(&self.path, &config)?;
        *self.current.write() = config.clone();
        debug!("리포팅 설정 저장: {}", self.path.display());
        Ok(config)
    }

    /// 현재 설정을 수정해 저장
    pub fn update_with<F>(&self, edit: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        edit(&mut config);
        self.update(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// 디스크 내용으로 다시 읽기. 실패하면 기존 설정을 유지한다.
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config;
        info!("리포팅 설정 다시 읽음: {}", self.path.display());
        Ok(())
    }

    /// 플랫폼별 설정 디렉토리
    pub fn config_dir() -> Result<PathBuf, CoreError> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// `save_report_to_disk` 기본 저장 디렉토리
    pub fn data_dir() -> Result<PathBuf, CoreError> {
        project_dirs().map(|dirs| dirs.data_dir().join("reports"))
    }
}

fn project_dirs() -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from("com", "fieldreport", "fieldreport")
        .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
}

/// 용량 정규화 + 서버 설정 검증
fn prepare(mut config: AppConfig) -> Result<AppConfig, CoreError> {
    config.client = config.client.normalized();

    let endpoint = config.server.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(CoreError::Validation {
            field: "server.endpoint".to_string(),
            message: format!("http(s) URL이 아님: {endpoint:?}"),
        });
    }
    if config.server.request_timeout_secs == 0 {
        return Err(CoreError::Validation {
            field: "server.request_timeout_secs".to_string(),
            message: "0보다 커야 함".to_string(),
        });
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{} 읽기 실패: {e}", path.display())))?;
    let parsed: AppConfig = serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("{} 파싱 실패: {e}", path.display())))?;
    debug!("리포팅 설정 로드: {}", path.display());
    prepare(parsed)
}

/// 임시 파일에 쓴 뒤 rename. 쓰기 도중 중단돼도 기존 파일은 온전하다.
fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| CoreError::Config(format!("{} 생성 실패: {e}", dir.display())))?;
    }

    let json = serde_json::to_vec_pretty(config)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json)
        .map_err(|e| CoreError::Config(format!("{} 쓰기 실패: {e}", staging.display())))?;
    fs::rename(&staging, path)
        .map_err(|e| CoreError::Config(format!("{} 교체 실패: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsGatheringMode;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(manager.get(), AppConfig::default_config());
    }

    #[test]
    fn update_persists_across_managers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::with_path(path.clone()).unwrap();

        manager
            .update_with(|c| {
                c.client.frames_per_measure = 30;
                c.client.metrics_gathering_mode = MetricsGatheringMode::Manual;
                c.server.project_identifier = "demo".to_string();
            })
            .unwrap();

        let config = ConfigManager::with_path(path).unwrap().get();
        assert_eq!(config.client.frames_per_measure, 30);
        assert_eq!(config.client.metrics_gathering_mode, MetricsGatheringMode::Manual);
        assert_eq!(config.server.project_identifier, "demo");
    }

    #[test]
    fn zero_capacities_are_normalized_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"client":{"maximum_event_count":0,"frames_per_measure":0}}"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(path).unwrap().get();
        assert_eq!(config.client.maximum_event_count, 1);
        assert_eq!(config.client.frames_per_measure, 1);
    }

    #[test]
    fn invalid_endpoint_is_rejected_and_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::with_path(path.clone()).unwrap();

        let err = manager
            .update_with(|c| c.server.endpoint = "ftp://reports".to_string())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "server.endpoint"));

        assert_eq!(manager.get().server.endpoint, "https://localhost");
        let on_disk = ConfigManager::with_path(path).unwrap().get();
        assert_eq!(on_disk.server.endpoint, "https://localhost");
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::with_path(path.clone()).unwrap();

        let mut edited = manager.get();
        edited.screenshot.maximum_width = 640;
        fs::write(&path, serde_json::to_string_pretty(&edited).unwrap()).unwrap();

        manager.reload().unwrap();
        assert_eq!(manager.get().screenshot.maximum_width, 640);
    }

    #[test]
    fn corrupt_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ConfigManager::with_path(path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
