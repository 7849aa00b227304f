// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serial uniform grid hash searcher with per-cell buckets.

use core::fmt::Debug;

use crate::grid::{GridResolution, HashGrid};
use crate::searcher::{PointNeighborSearcher, radius_squared};
use crate::types::{Point, Point2, Point3};

/// Uniform grid hash searcher.
///
/// Each point index is pushed into the bucket of the cell containing it.
/// Queries visit at most the adjacent buckets, so the grid spacing must be at least twice
/// the largest query radius for results to be complete.
#[derive(Clone)]
pub struct HashGridSearcher<P: Point> {
    grid: HashGrid,
    points: Vec<P>,
    buckets: Vec<Vec<usize>>,
}

impl<P: Point> HashGridSearcher<P> {
    /// Create a searcher with the given resolution and cell size.
    pub fn new(resolution: GridResolution, grid_spacing: f64) -> Self {
        let grid = HashGrid::new(resolution, grid_spacing);
        Self {
            grid,
            points: Vec::new(),
            buckets: vec![Vec::new(); grid.bucket_count::<P>()],
        }
    }

    /// Grid geometry.
    pub fn grid(&self) -> &HashGrid {
        &self.grid
    }

    /// Points from the last build (plus any [`add`](Self::add)ed), in input order.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Bucket table, indexed by hash key. Each bucket holds point indices.
    pub fn buckets(&self) -> &[Vec<usize>] {
        &self.buckets
    }

    /// Append a single point without rebuilding. Its index is the current point count.
    pub fn add(&mut self, point: P) {
        let index = self.points.len();
        self.points.push(point);
        let key = self.grid.hash_key(&point);
        self.buckets[key].push(index);
    }

    /// Visit in-radius points until `visit` returns `true`; reports whether it did.
    fn walk(&self, origin: P, radius: f64, mut visit: impl FnMut(usize, P) -> bool) -> bool {
        let r2 = radius_squared(radius);
        for &key in self.grid.nearby_keys(&origin, radius).as_slice() {
            for &i in &self.buckets[key] {
                let p = self.points[i];
                if p.distance_squared(&origin) <= r2 && visit(i, p) {
                    return true;
                }
            }
        }
        false
    }
}

impl<P: Point> Debug for HashGridSearcher<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.buckets.iter().filter(|b| !b.is_empty()).count();
        f.debug_struct("HashGridSearcher")
            .field("resolution", &self.grid.resolution())
            .field("spacing", &self.grid.spacing())
            .field("points", &self.points.len())
            .field("occupied_buckets", &occupied)
            .finish_non_exhaustive()
    }
}

impl<P: Point> PointNeighborSearcher<P> for HashGridSearcher<P> {
    fn type_name(&self) -> &'static str {
        "hash-grid"
    }

    fn build(&mut self, points: &[P]) {
        let bucket_count = self.grid.bucket_count::<P>();
        self.buckets.clear();
        self.buckets.resize_with(bucket_count, Vec::new);
        self.points.clear();
        self.points.extend_from_slice(points);
        for (i, p) in points.iter().enumerate() {
            let key = self.grid.hash_key(p);
            self.buckets[key].push(i);
        }
        log::debug!(
            "hash-grid build: {} points into {} buckets",
            points.len(),
            bucket_count
        );
    }

    fn for_each_nearby_point(&self, origin: P, radius: f64, callback: &mut dyn FnMut(usize, P)) {
        self.walk(origin, radius, |i, p| {
            callback(i, p);
            false
        });
    }

    fn has_nearby_point(&self, origin: P, radius: f64) -> bool {
        self.walk(origin, radius, |_, _| true)
    }

    fn clone_box(&self) -> Box<dyn PointNeighborSearcher<P>> {
        Box::new(self.clone())
    }
}

/// Serial hash grid searcher over 2D points.
pub type HashGridSearcher2 = HashGridSearcher<Point2>;

/// Serial hash grid searcher over 3D points.
pub type HashGridSearcher3 = HashGridSearcher<Point3>;
