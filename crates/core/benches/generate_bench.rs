//! Benchmarks for triple generation under different window pressures
//!
//! Run with: cargo bench -p filestamp-core --bench generate_bench

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filestamp_core::{OffsetPolicy, TimeWindowPolicy, TimestampGenerator};
use std::hint::black_box;

fn generator(start: u32, end: u32) -> TimestampGenerator<Utc> {
  let base = Utc.with_ymd_and_hms(2024, 4, 7, 10, 9, 45).unwrap();
  let offsets = OffsetPolicy::new(base, 5.0, 3.7, 7.2, 2.0, 4.8).unwrap();
  TimestampGenerator::seeded(offsets, TimeWindowPolicy::new(start, end).unwrap(), 42)
}

fn bench_generate_triple(c: &mut Criterion) {
  let mut group = c.benchmark_group("generate_triple");

  // forbidden hours per day: 4, 12, 20
  for (start, end) in [(1, 5), (22, 10), (3, 23)] {
    let mut generator = generator(start, end);
    group.bench_with_input(
      BenchmarkId::from_parameter(format!("{:02}-{:02}", start, end)),
      &(start, end),
      |b, _| b.iter(|| black_box(generator.generate_triple().unwrap())),
    );
  }

  group.finish();
}

criterion_group!(benches, bench_generate_triple);
criterion_main!(benches);
