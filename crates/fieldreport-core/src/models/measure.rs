//! 측정 구간 모델.

use serde::{Deserialize, Serialize};

use super::metric::Metric;
use super::named_value::NamedValue;

/// 고정 길이 프레임 구간 하나의 지표 묶음
///
/// 순환 버퍼 안에서 재활용되므로 `metadata`/`metrics`는 비우고 다시 채워 쓴다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Measure {
    /// 구간 시작 프레임
    pub start_frame_number: u64,
    /// 구간 마지막 프레임 (포함)
    pub end_frame_number: u64,
    /// 구간 메타데이터 (입력 순서 유지)
    pub metadata: Vec<NamedValue>,
    /// 구간 동안 샘플링된 지표
    pub metrics: Vec<Metric>,
}

impl Measure {
    /// 이름으로 지표 조회
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}
