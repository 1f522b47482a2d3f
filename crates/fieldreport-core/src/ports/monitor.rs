//! 디바이스/시스템 지표 포트.
//!
//! 구현: `fieldreport-monitor` crate (sysinfo)

use crate::models::named_value::NamedValue;

/// 디바이스 메타데이터 수집 (클라이언트 생성 시 한 번 호출)
pub trait DeviceMetadataProvider: Send + Sync {
    fn device_metadata(&self) -> Vec<NamedValue>;
}

/// 자동 지표 소스
///
/// `Automatic` 모드에서 매 틱 호출되므로 빠르게 반환해야 한다.
pub trait MetricSource: Send + Sync {
    /// (지표 이름, 값) 목록
    fn collect(&self) -> Vec<(String, f64)>;
}
