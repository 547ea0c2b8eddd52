use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use pipeline_kernel::editors::{add_bend, connect_pipes, recalculate_curvatures};
use pipeline_kernel::{parse_pcf, Pipeline, Section, SelectionMode, Structure, StructureKind};
use std::hint::black_box;

fn bench_pcf_parsing(c: &mut Criterion) {
    let content = include_str!("../tests/fixtures/simple_line.pcf");

    c.bench_function("pcf_parse_simple_line", |b| {
        b.iter(|| {
            let pipeline = parse_pcf(black_box(content)).expect("PCF parse failed");
            black_box(pipeline.structure_count())
        })
    });
}

/// Zickzack-Route mit `corners` Ecken, jede mit einem Bogen
fn build_zigzag(corners: usize) -> Pipeline {
    let mut pipeline = Pipeline::new();
    let positions = (0..corners + 2).map(|i| {
        let x = i as f64 * 2.0;
        let y = if i % 2 == 0 { 0.0 } else { 2.0 };
        DVec3::new(x, y, (i / 100) as f64)
    });
    let ids = pipeline.add_points(positions);
    pipeline.select_points(ids.clone(), SelectionMode::Replace);
    connect_pipes(&mut pipeline, Section::tube(0.1, 0.005));

    pipeline.select_points(ids[1..ids.len() - 1].to_vec(), SelectionMode::Replace);
    add_bend(&mut pipeline, 0.2, false);
    pipeline.commit();
    pipeline
}

/// Kurze Rohre, bei denen jedes zweite ein koinzidentes Anschlussrohr bekommt
fn build_duplicated_points(count: usize) -> Pipeline {
    let mut pipeline = Pipeline::new();
    let section = Section::tube(0.1, 0.005);
    for index in 0..count {
        let column = (index % 100) as f64;
        let row = (index / 100) as f64;
        let start = DVec3::new(column, row, 0.0);
        let end = start + DVec3::new(0.5, 0.0, 0.0);
        let ids = pipeline.add_points([start, end]);
        pipeline.add_structure(Structure::linear(StructureKind::Pipe, ids[0], ids[1], section));
        if index % 2 == 0 {
            let ids = pipeline.add_points([end + DVec3::splat(1e-8), end + DVec3::new(0.0, 0.5, 0.0)]);
            pipeline.add_structure(Structure::linear(StructureKind::Pipe, ids[0], ids[1], section));
        }
    }
    pipeline.commit();
    pipeline
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_coincident_points");

    for &count in &[1_000usize, 10_000usize] {
        let pipeline = build_duplicated_points(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &pipeline, |b, base| {
            b.iter(|| {
                let mut pipeline = base.clone();
                black_box(pipeline.merge_coincident_points(6))
            })
        });
    }

    group.finish();
}

fn bench_recalculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("recalculate_curvatures");

    for &corners in &[100usize, 1_000usize] {
        let pipeline = build_zigzag(corners);
        group.bench_with_input(BenchmarkId::from_parameter(corners), &pipeline, |b, base| {
            b.iter(|| {
                let mut pipeline = base.clone();
                black_box(recalculate_curvatures(&mut pipeline))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pcf_parsing, bench_merge, bench_recalculate);
criterion_main!(benches);
