// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_particles::{ParticleSystemConfig, ParticleSystemData3};
use understory_point_search::{BoundingBox, Point3, SearcherKind, bcc_lattice};

fn seeded_system(kind: SearcherKind, spacing: f64) -> ParticleSystemData3 {
    let bounds = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let points = bcc_lattice(bounds, spacing);
    let mut system =
        ParticleSystemData3::with_config(0, ParticleSystemConfig::default().with_searcher_kind(kind));
    // Lengths always agree here.
    let _ = system.add_particles(&points, &[], &[]);
    system
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_step");
    let spacing = 0.04;
    let radius = 1.5 * spacing;
    for kind in [
        SearcherKind::HashGrid,
        SearcherKind::ParallelHashGrid,
        SearcherKind::KdTree,
    ] {
        let system = seeded_system(kind, spacing);
        group.throughput(Throughput::Elements(system.number_of_particles() as u64));
        group.bench_function(format!("{kind}_searcher_and_lists"), |b| {
            b.iter_batched(
                || system.clone(),
                |mut s| {
                    s.build_neighbor_searcher(radius);
                    s.build_neighbor_lists(radius);
                    black_box(s.neighbor_lists().len());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_lists_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_lists");
    let spacing = 0.04;
    let radius = 1.5 * spacing;
    let mut system = seeded_system(SearcherKind::ParallelHashGrid, spacing);
    system.build_neighbor_searcher(radius);
    group.throughput(Throughput::Elements(system.number_of_particles() as u64));
    group.bench_function("parallel_hash_grid", |b| {
        b.iter(|| {
            system.build_neighbor_lists(radius);
            black_box(system.neighbor_lists().len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_step, bench_lists_only);
criterion_main!(benches);
