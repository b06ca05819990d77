//! Benchmarks for the seat table.
//!
//! Measures the operations the monitor performs under its lock:
//! - neighbor lookups
//! - quiescence scans
//! - invariant audits

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use symposium_table::{check_table, SeatState, StateTable};

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");

    for &n in &[2usize, 5, 50, 500] {
        let table = StateTable::new(n);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| table.neighbors(black_box(n / 2)))
        });
    }
    group.finish();
}

fn bench_quiescence_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_quiescent");

    for &n in &[5usize, 50, 500] {
        // Worst case: the busy seat is last.
        let mut table = StateTable::new(n);
        table.set_state(n - 1, SeatState::Hungry).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| table.is_quiescent())
        });
    }
    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_table");

    for &n in &[5usize, 50, 500] {
        let mut table = StateTable::new(n);
        // Sparse realistic load: every third seat eating.
        for i in (0..n).step_by(3) {
            table.set_state(i, SeatState::Eating).unwrap();
        }
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| check_table(black_box(table)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_neighbors, bench_quiescence_scan, bench_audit);
criterion_main!(benches);
