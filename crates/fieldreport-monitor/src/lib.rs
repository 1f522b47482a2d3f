//! # fieldreport-monitor
//!
//! sysinfo 기반 시스템 어댑터.
//!
//! - [`metadata::SysInfoMetadata`]: `DeviceMetadataProvider` 구현 (OS, 호스트, CPU, 메모리)
//! - [`system::SystemMetricSource`]: `MetricSource` 구현 (갱신 주기 제한)

pub mod metadata;
pub mod system;

pub use metadata::SysInfoMetadata;
pub use system::SystemMetricSource;
