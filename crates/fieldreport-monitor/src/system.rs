//! 자동 시스템 지표.
//!
//! `MetricSource` 포트 구현. `Automatic` 모드에서는 매 틱 호출되므로
//! sysinfo 갱신은 `refresh_interval`마다 한 번만 하고 그 사이에는 캐시를 반환한다.

use fieldreport_core::ports::monitor::MetricSource;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use sysinfo::System;
use tracing::trace;

pub const MEMORY_USED_METRIC: &str = "Memory.Used";
pub const MEMORY_TOTAL_METRIC: &str = "Memory.Total";
pub const CPU_USAGE_METRIC: &str = "Cpu.Usage";

struct Sampler {
    sys: System,
    last_refresh: Option<Instant>,
    cached: Vec<(String, f64)>,
}

/// sysinfo 기반 지표 소스: `MetricSource` 포트 구현
pub struct SystemMetricSource {
    refresh_interval: Duration,
    sampler: Mutex<Sampler>,
}

impl SystemMetricSource {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            sampler: Mutex::new(Sampler {
                sys: System::new(),
                last_refresh: None,
                cached: Vec::new(),
            }),
        }
    }
}

impl MetricSource for SystemMetricSource {
    fn collect(&self) -> Vec<(String, f64)> {
        let mut sampler = self.sampler.lock();
        let now = Instant::now();
        let due = sampler
            .last_refresh
            .map_or(true, |last| now.duration_since(last) >= self.refresh_interval);

        if due {
            sampler.sys.refresh_memory();
            sampler.sys.refresh_cpu_usage();

            let sys = &sampler.sys;
            let cached = vec![
                (
                    MEMORY_USED_METRIC.to_string(),
                    sys.used_memory() as f64 / 1_048_576.0,
                ),
                (
                    MEMORY_TOTAL_METRIC.to_string(),
                    sys.total_memory() as f64 / 1_048_576.0,
                ),
                (CPU_USAGE_METRIC.to_string(), sys.global_cpu_usage() as f64),
            ];
            trace!("시스템 지표 갱신: {:?}", cached);
            sampler.cached = cached;
            sampler.last_refresh = Some(now);
        }

        sampler.cached.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_memory_and_cpu() {
        let source = SystemMetricSource::new(Duration::ZERO);
        let metrics = source.collect();
        let names: Vec<&str> = metrics.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![MEMORY_USED_METRIC, MEMORY_TOTAL_METRIC, CPU_USAGE_METRIC]);

        let value = |name: &str| metrics.iter().find(|(n, _)| n == name).map(|(_, v)| *v);
        assert!(value(MEMORY_TOTAL_METRIC).unwrap() > 0.0);
        assert!(value(MEMORY_USED_METRIC).unwrap() <= value(MEMORY_TOTAL_METRIC).unwrap());
    }

    #[test]
    fn refresh_is_throttled() {
        let source = SystemMetricSource::new(Duration::from_secs(3600));
        let first = source.collect();
        let stamp = source.sampler.lock().last_refresh;
        let second = source.collect();
        assert_eq!(first, second);
        assert_eq!(source.sampler.lock().last_refresh, stamp);
    }
}
