// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel uniform grid hash searcher built from sorted index tables.
//!
//! Construction runs four phases, each exposed as a free function:
//!
//! 1. [`compute_hash_keys`]: parallel map, one key per point.
//! 2. [`sort_indices_by_key`]: parallel unstable sort of point indices by key.
//! 3. [`reorder_by_indices`]: parallel gather of points and keys into sorted order.
//! 4. [`build_index_tables`]: sequential scan recording where each key's run
//!    starts and ends.
//!
//! Each phase consumes the previous phase's output, so they run strictly in order.
//! Within a phase, every iteration writes its own output slot.

use core::fmt::Debug;

use rayon::prelude::*;

use crate::grid::{GridResolution, HashGrid};
use crate::searcher::{PointNeighborSearcher, radius_squared};
use crate::types::{Point, Point2, Point3};

/// Marker stored in the start/end tables for buckets with no points.
pub const EMPTY_BUCKET: usize = usize::MAX;

/// Phase 1: hash key of every point, in input order.
pub fn compute_hash_keys<P: Point>(grid: &HashGrid, points: &[P]) -> Vec<usize> {
    points.par_iter().map(|p| grid.hash_key(p)).collect()
}

/// Phase 2: permutation of `0..keys.len()` ordering indices by ascending key.
///
/// The sort is not stable; indices sharing a key come out in any order.
pub fn sort_indices_by_key(keys: &[usize]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..keys.len()).collect();
    indices.par_sort_unstable_by_key(|&i| keys[i]);
    indices
}

/// Phase 3: points and keys gathered into sorted order.
pub fn reorder_by_indices<P: Point>(
    points: &[P],
    keys: &[usize],
    sorted_indices: &[usize],
) -> (Vec<P>, Vec<usize>) {
    let sorted_points = sorted_indices.par_iter().map(|&i| points[i]).collect();
    let sorted_keys = sorted_indices.par_iter().map(|&i| keys[i]).collect();
    (sorted_points, sorted_keys)
}

/// Phase 4: half-open `[start, end)` ranges into the sorted arrays, per key.
///
/// `sorted_keys` must be ascending and every key below `bucket_count`. Buckets
/// without points hold [`EMPTY_BUCKET`] in both tables.
pub fn build_index_tables(sorted_keys: &[usize], bucket_count: usize) -> (Vec<usize>, Vec<usize>) {
    let mut start = vec![EMPTY_BUCKET; bucket_count];
    let mut end = vec![EMPTY_BUCKET; bucket_count];
    let n = sorted_keys.len();
    if n == 0 {
        return (start, end);
    }
    start[sorted_keys[0]] = 0;
    end[sorted_keys[n - 1]] = n;
    for i in 1..n {
        if sorted_keys[i] > sorted_keys[i - 1] {
            start[sorted_keys[i]] = i;
            end[sorted_keys[i - 1]] = i;
        }
    }
    (start, end)
}

/// Uniform grid hash searcher with the same query semantics as
/// [`HashGridSearcher`](crate::HashGridSearcher), built in parallel.
///
/// Points are stored sorted by bucket; each bucket is a contiguous window of
/// the sorted arrays described by the start/end tables.
#[derive(Clone)]
pub struct ParallelHashGridSearcher<P: Point> {
    grid: HashGrid,
    points: Vec<P>,
    keys: Vec<usize>,
    sorted_indices: Vec<usize>,
    start_index_table: Vec<usize>,
    end_index_table: Vec<usize>,
}

impl<P: Point> ParallelHashGridSearcher<P> {
    /// Create a searcher with the given resolution and cell size.
    pub fn new(resolution: GridResolution, grid_spacing: f64) -> Self {
        let grid = HashGrid::new(resolution, grid_spacing);
        let bucket_count = grid.bucket_count::<P>();
        Self {
            grid,
            points: Vec::new(),
            keys: Vec::new(),
            sorted_indices: Vec::new(),
            start_index_table: vec![EMPTY_BUCKET; bucket_count],
            end_index_table: vec![EMPTY_BUCKET; bucket_count],
        }
    }

    /// Grid geometry.
    pub fn grid(&self) -> &HashGrid {
        &self.grid
    }

    /// Points in sorted (bucket) order.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Hash keys in ascending order, parallel to [`points`](Self::points).
    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    /// Maps a sorted position to the point's index in the last build's input.
    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }

    /// First sorted position of each bucket, or [`EMPTY_BUCKET`].
    pub fn start_index_table(&self) -> &[usize] {
        &self.start_index_table
    }

    /// One past the last sorted position of each bucket, or [`EMPTY_BUCKET`].
    pub fn end_index_table(&self) -> &[usize] {
        &self.end_index_table
    }

    /// Sorted-array window for `key`, empty when the bucket has no points.
    fn window(&self, key: usize) -> core::ops::Range<usize> {
        let start = self.start_index_table[key];
        if start == EMPTY_BUCKET {
            return 0..0;
        }
        start..self.end_index_table[key]
    }

    /// Visit in-radius points (by input index) until `visit` returns `true`;
    /// reports whether it did.
    fn walk(&self, origin: P, radius: f64, mut visit: impl FnMut(usize, P) -> bool) -> bool {
        let r2 = radius_squared(radius);
        for &key in self.grid.nearby_keys(&origin, radius).as_slice() {
            for j in self.window(key) {
                let p = self.points[j];
                if p.distance_squared(&origin) <= r2 && visit(self.sorted_indices[j], p) {
                    return true;
                }
            }
        }
        false
    }
}

impl<P: Point> Debug for ParallelHashGridSearcher<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self
            .start_index_table
            .iter()
            .filter(|&&s| s != EMPTY_BUCKET)
            .count();
        f.debug_struct("ParallelHashGridSearcher")
            .field("resolution", &self.grid.resolution())
            .field("spacing", &self.grid.spacing())
            .field("points", &self.points.len())
            .field("occupied_buckets", &occupied)
            .finish_non_exhaustive()
    }
}

impl<P: Point> PointNeighborSearcher<P> for ParallelHashGridSearcher<P> {
    fn type_name(&self) -> &'static str {
        "parallel-hash-grid"
    }

    fn build(&mut self, points: &[P]) {
        let bucket_count = self.grid.bucket_count::<P>();
        let keys = compute_hash_keys(&self.grid, points);
        let sorted_indices = sort_indices_by_key(&keys);
        let (sorted_points, sorted_keys) = reorder_by_indices(points, &keys, &sorted_indices);
        let (start, end) = build_index_tables(&sorted_keys, bucket_count);

        self.points = sorted_points;
        self.keys = sorted_keys;
        self.sorted_indices = sorted_indices;
        self.start_index_table = start;
        self.end_index_table = end;
        log::debug!(
            "parallel-hash-grid build: {} points into {} buckets",
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

/// Parallel hash grid searcher over 2D points.
pub type ParallelHashGridSearcher2 = ParallelHashGridSearcher<Point2>;

/// Parallel hash grid searcher over 3D points.
pub type ParallelHashGridSearcher3 = ParallelHashGridSearcher<Point3>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_stops_at_first_accepted_point() {
        let mut s = ParallelHashGridSearcher3::new(GridResolution::uniform(4), 1.0);
        s.build(&[Point3::new(0.25, 0.25, 0.25); 10]);
        let origin = Point3::new(0.3, 0.25, 0.25);
        let mut visits = 0;
        assert!(s.walk(origin, 0.5, |_, _| {
            visits += 1;
            true
        }));
        assert_eq!(visits, 1);

        let mut seen = Vec::new();
        assert!(!s.walk(origin, 0.5, |i, _| {
            seen.push(i);
            false
        }));
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert!(!s.walk(Point3::new(3.0, 3.0, 3.0), 0.1, |_, _| true));
    }

    #[test]
    fn index_tables_cover_each_run() {
        let (start, end) = build_index_tables(&[1, 1, 3, 3, 3, 4], 6);
        assert_eq!(start, vec![EMPTY_BUCKET, 0, EMPTY_BUCKET, 2, 5, EMPTY_BUCKET]);
        assert_eq!(end, vec![EMPTY_BUCKET, 2, EMPTY_BUCKET, 5, 6, EMPTY_BUCKET]);
    }

    #[test]
    fn index_tables_single_run_and_empty() {
        let (start, end) = build_index_tables(&[2, 2, 2], 3);
        assert_eq!((start[2], end[2]), (0, 3));
        let (start, end) = build_index_tables(&[], 3);
        assert!(start.iter().chain(end.iter()).all(|&v| v == EMPTY_BUCKET));
    }

    #[test]
    fn phases_compose_into_a_permutation() {
        let grid = HashGrid::new(GridResolution::uniform(4), 1.0);
        let points = [
            Point2::new(3.5, 0.5),
            Point2::new(0.5, 0.5),
            Point2::new(1.5, 2.5),
            Point2::new(0.2, 0.1),
        ];
        let keys = compute_hash_keys(&grid, &points);
        assert_eq!(keys, vec![3, 0, 9, 0]);

        let sorted = sort_indices_by_key(&keys);
        let mut seen = sorted.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);

        let (sorted_points, sorted_keys) = reorder_by_indices(&points, &keys, &sorted);
        assert_eq!(sorted_keys, vec![0, 0, 3, 9]);
        for (j, &i) in sorted.iter().enumerate() {
            assert_eq!(sorted_points[j], points[i]);
        }
    }

    #[test]
    fn window_holds_exactly_the_bucket_members() {
        let mut s = ParallelHashGridSearcher2::new(GridResolution::uniform(4), 1.0);
        let points = [
            Point2::new(0.5, 0.5),
            Point2::new(2.5, 2.5),
            Point2::new(0.7, 0.2),
            Point2::new(2.1, 2.9),
        ];
        s.build(&points);
        let key = s.grid().hash_key(&Point2::new(2.5, 2.5));
        let (start, end) = (s.start_index_table()[key], s.end_index_table()[key]);
        let mut members = s.sorted_indices()[start..end].to_vec();
        members.sort_unstable();
        assert_eq!(members, vec![1, 3]);
        assert!(s.keys().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn query_reports_input_indices() {
        let mut s = ParallelHashGridSearcher3::new(GridResolution::uniform(8), 1.0);
        s.build(&[
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(0.1, 0.1, 0.1),
            Point3::new(0.2, 0.1, 0.1),
        ]);
        let mut hits = Vec::new();
        s.for_each_nearby_point(Point3::new(0.1, 0.1, 0.1), 0.5, &mut |i, p| hits.push((i, p)));
        hits.sort_unstable_by_key(|&(i, _)| i);
        assert_eq!(
            hits,
            vec![(1, Point3::new(0.1, 0.1, 0.1)), (2, Point3::new(0.2, 0.1, 0.1))]
        );
    }
}
