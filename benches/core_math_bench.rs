use criterion::{Criterion, criterion_group, criterion_main};
use drill_rs::api::{DrillEngine, DrillRequest};
use drill_rs::core::{
    ColumnSpec, DuplicateGroupPolicy, GroupScope, RankOrder, Row, build_snapshot,
    compare_snapshots, comparison_group_keys,
};
use std::hint::black_box;

fn generated_rows(groups: usize, drift: f64) -> Vec<Row> {
    (0..groups)
        .map(|i| {
            let t = i as f64;
            Row::new(1.0 + (i % 17) as f64)
                .with_dim("host", format!("web-{i}"))
                .with_dim("dc", if i % 3 == 0 { "east" } else { "west" })
                .with_column("sum(bytes)", 1_000.0 + t * 0.5 + drift)
                .with_column("avg(latency)", 40.0 + (t * 0.01).sin() * 5.0 + drift)
        })
        .collect()
}

fn bench_snapshot_build_10k(c: &mut Criterion) {
    let rows = generated_rows(10_000, 0.0);
    let column = ColumnSpec::avg("avg(latency)");

    c.bench_function("snapshot_build_avg_10k", |b| {
        b.iter(|| {
            let _ = build_snapshot(
                black_box(&rows),
                black_box(&column),
                DuplicateGroupPolicy::Reject,
            )
            .expect("snapshot should build");
        })
    });
}

fn bench_comparison_10k(c: &mut Criterion) {
    let current = generated_rows(10_000, 0.0);
    let baseline = generated_rows(10_000, 3.0);
    let column = ColumnSpec::sum("sum(bytes)");
    let new = build_snapshot(&current, &column, DuplicateGroupPolicy::Reject).expect("current");
    let old = build_snapshot(&baseline, &column, DuplicateGroupPolicy::Reject).expect("baseline");
    let groups = comparison_group_keys(&baseline, &current, GroupScope::Union);

    c.bench_function("comparison_sum_10k", |b| {
        b.iter(|| {
            let comparison = compare_snapshots(black_box(&old), black_box(&new), black_box(&groups))
                .expect("comparison should succeed");
            let _ = comparison.ranking(RankOrder::Descending);
        })
    });
}

fn bench_report_json_2k(c: &mut Criterion) {
    let request = DrillRequest::new(generated_rows(2_000, 0.0))
        .with_baseline(generated_rows(2_000, 1.5))
        .with_column(ColumnSpec::sum("sum(bytes)"))
        .with_column(ColumnSpec::avg("avg(latency)"));
    let report = DrillEngine::default().run(&request).expect("report");

    c.bench_function("report_json_contract_2k", |b| {
        b.iter(|| {
            let _ = black_box(&report)
                .to_json_contract_v1_pretty()
                .expect("serialize report");
        })
    });
}

criterion_group!(
    benches,
    bench_snapshot_build_10k,
    bench_comparison_10k,
    bench_report_json_2k
);
criterion_main!(benches);
