//! 누적 통계 지표.
//!
//! 샘플마다 count/sum/min/max를 갱신하고 평균은 읽을 때 계산한다.
//! 하나의 지표는 소유한 맵 안에서만 변경된다 (구간 지표, 클라이언트 자체 지표).

use serde::{Deserialize, Serialize};

/// 이름이 붙은 누적 지표
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Metric {
    /// 지표 이름 (예: "Graphics.FramesPerSecond")
    pub name: String,
    /// 유효 샘플 수
    pub count: u64,
    /// 샘플 합계
    pub sum: f64,
    /// 최솟값
    pub minimum: f64,
    /// 최댓값
    pub maximum: f64,
}

impl Metric {
    /// 빈 지표 생성
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 값 샘플링
    ///
    /// NaN/±Infinity는 조용히 무시하고 `false`를 반환한다.
    pub fn sample(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.count == 0 {
            self.minimum = f64::INFINITY;
            self.maximum = f64::NEG_INFINITY;
        }
        self.count += 1;
        self.sum += value;
        self.minimum = self.minimum.min(value);
        self.maximum = self.maximum.max(value);
        true
    }

    /// 평균 (샘플이 없으면 NaN, 호출자가 `count`를 확인해야 함)
    pub fn average(&self) -> f64 {
        self.sum / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_sets_min_and_max() {
        let mut metric = Metric::new("fps");
        assert!(metric.sample(-5.0));
        assert_eq!(metric.minimum, -5.0);
        assert_eq!(metric.maximum, -5.0);
        assert_eq!(metric.count, 1);
    }

    #[test]
    fn min_avg_max_ordering_holds() {
        let mut metric = Metric::new("frame_ms");
        for v in [16.6, 33.3, 8.0, 12.5, 100.0, 0.5] {
            metric.sample(v);
        }
        assert_eq!(metric.count, 6);
        assert!(metric.maximum >= metric.average());
        assert!(metric.average() >= metric.minimum);
        assert_eq!(metric.minimum, 0.5);
        assert_eq!(metric.maximum, 100.0);
    }

    #[test]
    fn non_finite_samples_are_ignored() {
        let mut metric = Metric::new("x");
        assert!(!metric.sample(f64::NAN));
        assert_eq!(metric.count, 0);
        assert!(metric.average().is_nan());

        assert!(!metric.sample(f64::INFINITY));
        assert!(!metric.sample(f64::NEG_INFINITY));
        metric.sample(2.0);
        metric.sample(4.0);
        assert_eq!(metric.count, 2);
        assert_eq!(metric.average(), 3.0);
    }

    #[test]
    fn serializes_with_pascal_case_names() {
        let mut metric = Metric::new("Memory.Used");
        metric.sample(1.0);
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["Name"], "Memory.Used");
        assert_eq!(json["Count"], 1);
        assert_eq!(json["Minimum"], 1.0);
    }
}
