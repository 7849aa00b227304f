// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_point_search::{
    BoundingBox, Bvh, GridResolution, NeighborSearcherBuilder, Point, Point2, Point3,
    PointNeighborSearcher, SearcherKind, bcc_lattice, triangle_lattice,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points_3d(count: usize, extent: f64) -> Vec<Point3> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            Point3::new(
                rng.next_f64() * extent,
                rng.next_f64() * extent,
                rng.next_f64() * extent,
            )
        })
        .collect()
}

fn gen_clustered_points_2d(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Point2> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 20.0, rng.next_f64() * 20.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Point2::new(cx + dx, cy + dy));
        }
    }
    out
}

fn searcher<P: Point>(kind: SearcherKind, radius: f64) -> Box<dyn PointNeighborSearcher<P>> {
    NeighborSearcherBuilder::new()
        .with_kind(kind)
        .with_resolution(GridResolution::uniform(64))
        .with_grid_spacing(2.0 * radius)
        .build::<P>()
}

fn count_all<P: Point>(s: &dyn PointNeighborSearcher<P>, points: &[P], radius: f64) -> usize {
    let mut hits = 0_usize;
    for &p in points {
        s.for_each_nearby_point(p, radius, &mut |_, _| hits += 1);
    }
    hits
}

fn bench_build_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_3d");
    let radius = 0.05;
    for &n in &[4_096_usize, 32_768] {
        let points = gen_random_points_3d(n, 1.0);
        group.throughput(Throughput::Elements(n as u64));
        for kind in SearcherKind::ALL {
            if kind == SearcherKind::NaiveList && n > 4_096 {
                continue;
            }
            group.bench_function(format!("{kind}_n{n}"), |b| {
                b.iter_batched(
                    || searcher::<Point3>(kind, radius),
                    |mut s| {
                        s.build(&points);
                        black_box(s);
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_query_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_3d");
    let radius = 0.05;
    let points = gen_random_points_3d(8_192, 1.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    for kind in SearcherKind::ALL {
        let mut s = searcher::<Point3>(kind, radius);
        s.build(&points);
        group.bench_function(format!("{kind}_all_points"), |b| {
            b.iter(|| black_box(count_all(s.as_ref(), &points, radius)));
        });
    }
    group.finish();
}

fn bench_lattice(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice");
    let bounds2 = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
    let tri = triangle_lattice(bounds2, 0.01);
    let bounds3 = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let bcc = bcc_lattice(bounds3, 0.05);
    for kind in [SearcherKind::HashGrid, SearcherKind::ParallelHashGrid, SearcherKind::KdTree] {
        group.bench_function(format!("{kind}_triangle_build_query"), |b| {
            b.iter_batched(
                || searcher::<Point2>(kind, 0.015),
                |mut s| {
                    s.build(&tri);
                    black_box(count_all(s.as_ref(), &tri, 0.015));
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("{kind}_bcc_build_query"), |b| {
            b.iter_batched(
                || searcher::<Point3>(kind, 0.05),
                |mut s| {
                    s.build(&bcc);
                    black_box(count_all(s.as_ref(), &bcc, 0.05));
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_clustered_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustered_2d");
    let points = gen_clustered_points_2d(16, 512, 0.5);
    let radius = 0.02;
    for kind in [SearcherKind::ParallelHashGrid, SearcherKind::KdTree] {
        let mut s = searcher::<Point2>(kind, radius);
        s.build(&points);
        group.bench_function(format!("{kind}_has_nearby"), |b| {
            b.iter(|| {
                let found = points
                    .iter()
                    .filter(|p| s.has_nearby_point(**p, radius))
                    .count();
                black_box(found);
            });
        });
    }
    group.finish();
}

fn bench_bvh_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh");
    let points = gen_random_points_3d(8_192, 10.0);
    let queries = gen_random_points_3d(256, 12.0);
    group.bench_function("build_points", |b| {
        b.iter(|| {
            let mut bvh = Bvh::new();
            bvh.build(
                points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i, BoundingBox::from_point(*p))),
            );
            black_box(bvh.len());
        });
    });
    let mut bvh = Bvh::new();
    bvh.build(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, BoundingBox::from_point(*p))),
    );
    group.bench_function("nearest_256", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(bvh.nearest(*q, |&i, q| points[i].distance(q)));
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_3d,
    bench_query_3d,
    bench_lattice,
    bench_clustered_2d,
    bench_bvh_nearest,
);
criterion_main!(benches);
