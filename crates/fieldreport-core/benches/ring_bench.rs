//! fieldreport-core 성능 벤치마크
//!
//! 실행: cargo bench -p fieldreport-core
//!
//! 벤치마크 대상:
//! - BoundedRingBuffer: 회전 중 추가, 스냅샷 복사
//! - Report::complete: 측정 구간 집계

use criterion::{
    criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use fieldreport_core::models::event::{Event, EventLevel};
use fieldreport_core::models::measure::Measure;
use fieldreport_core::models::metric::Metric;
use fieldreport_core::models::report::Report;
use fieldreport_core::ring::BoundedRingBuffer;
use std::hint::black_box;

/// 용량만큼 이벤트로 채운 버퍼
fn filled_events(capacity: usize) -> BoundedRingBuffer<Event> {
    let mut ring = BoundedRingBuffer::new(capacity);
    for frame in 0..capacity as u64 {
        ring.push(Event::new(EventLevel::Info, format!("event {}", frame), frame));
    }
    ring
}

/// 가득 찬 버퍼에 추가 (덮어쓰기 경로)
fn bench_ring_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_push");

    for capacity in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("u64_rotating", capacity),
            &capacity,
            |b, &n| {
                let mut ring = BoundedRingBuffer::new(n);
                let mut i = 0u64;
                b.iter(|| {
                    ring.push(black_box(i));
                    i += 1;
                });
            },
        );
    }

    group.finish();
}

/// 리포트 조립 시 스냅샷 복사 비용
fn bench_ring_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_snapshot");

    for capacity in [100usize, 1000] {
        let ring = filled_events(capacity);
        group.throughput(Throughput::Elements(capacity as u64));
        group.bench_with_input(BenchmarkId::new("events", capacity), &ring, |b, ring| {
            b.iter(|| black_box(ring.to_vec()));
        });
    }

    group.finish();
}

/// 측정 구간 300개 집계
fn bench_report_complete(c: &mut Criterion) {
    let measures: Vec<Measure> = (0..300u64)
        .map(|i| {
            let mut fps = Metric::new("Graphics.FramesPerSecond");
            let mut mem = Metric::new("Memory.Used");
            for s in 0..60 {
                fps.sample(55.0 + (s % 10) as f64);
                mem.sample(1024.0 + s as f64);
            }
            Measure {
                start_frame_number: i * 60,
                end_frame_number: i * 60 + 59,
                metadata: Vec::new(),
                metrics: vec![fps, mem],
            }
        })
        .collect();

    c.bench_function("report_complete_300_measures", |b| {
        b.iter_batched(
            || {
                let mut report = Report::new("bench");
                report.measures = measures.clone();
                report
            },
            |mut report| {
                report.complete();
                black_box(report.overview.aggregate_metrics.len())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_ring_push,
    bench_ring_snapshot,
    bench_report_complete
);
criterion_main!(benches);
