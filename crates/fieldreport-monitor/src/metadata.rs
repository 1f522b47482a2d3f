//! 디바이스 메타데이터.
//!
//! `DeviceMetadataProvider` 포트 구현. 클라이언트 생성 시 한 번 수집된다.

use fieldreport_core::models::named_value::NamedValue;
use fieldreport_core::ports::monitor::DeviceMetadataProvider;
use sysinfo::System;
use tracing::debug;

/// sysinfo 기반 디바이스 메타데이터: `DeviceMetadataProvider` 포트 구현
pub struct SysInfoMetadata {
    app_version: String,
}

impl SysInfoMetadata {
    /// `app_version`은 `Version` 항목으로 기록된다 (프레임레이트 모니터 차원에 사용)
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            app_version: app_version.into(),
        }
    }
}

impl DeviceMetadataProvider for SysInfoMetadata {
    fn device_metadata(&self) -> Vec<NamedValue> {
        let sys = System::new_all();

        let unknown = || "Unknown".to_string();
        let metadata = vec![
            NamedValue::new("Platform", System::name().unwrap_or_else(unknown)),
            NamedValue::new("Version", self.app_version.as_str()),
            NamedValue::new(
                "OperatingSystem",
                System::long_os_version().unwrap_or_else(unknown),
            ),
            NamedValue::new("Architecture", std::env::consts::ARCH),
            NamedValue::new("HostName", System::host_name().unwrap_or_else(unknown)),
            NamedValue::new("ProcessorCount", sys.cpus().len().to_string()),
            NamedValue::new(
                "SystemMemorySize",
                (sys.total_memory() / 1_048_576).to_string(),
            ),
        ];

        debug!("디바이스 메타데이터 {}개 수집", metadata.len());
        metadata
    }
}
