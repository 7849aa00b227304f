// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid hashing shared by the serial and parallel hash grid searchers.
//!
//! Bucket coordinates are `floor(coord / spacing)` per axis, wrapped into
//! `[0, resolution)` with Euclidean remainder. The table is therefore toroidal:
//! points far apart can share a bucket, which costs extra distance tests but
//! never loses a neighbor.

use crate::types::Point;

/// Default number of buckets along each axis.
pub const DEFAULT_RESOLUTION: usize = 64;

/// Largest number of buckets along one axis.
///
/// A 3D table therefore has at most `2^30` buckets, so bucket counts and
/// flattened keys fit in `usize` on 32-bit targets as well.
pub const MAX_AXIS_RESOLUTION: usize = 1 << 10;

/// Number of buckets along each axis. The `z` axis is ignored for 2D points.
///
/// Every axis is used as if clamped to `[1, MAX_AXIS_RESOLUTION]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridResolution {
    /// Buckets along x.
    pub x: usize,
    /// Buckets along y.
    pub y: usize,
    /// Buckets along z.
    pub z: usize,
}

impl GridResolution {
    /// Create a resolution; every axis is clamped to `[1, MAX_AXIS_RESOLUTION]`.
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self {
            x: x.clamp(1, MAX_AXIS_RESOLUTION),
            y: y.clamp(1, MAX_AXIS_RESOLUTION),
            z: z.clamp(1, MAX_AXIS_RESOLUTION),
        }
    }

    /// Same number of buckets on every axis.
    pub fn uniform(n: usize) -> Self {
        Self::new(n, n, n)
    }

    /// Buckets along `axis`.
    #[inline]
    pub fn axis(&self, axis: usize) -> usize {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
        .clamp(1, MAX_AXIS_RESOLUTION)
    }

    /// Size of the bucket table for points of type `P`.
    pub fn bucket_count<P: Point>(&self) -> usize {
        (0..P::DIM).fold(1_usize, |acc, axis| acc.saturating_mul(self.axis(axis)))
    }
}

impl Default for GridResolution {
    fn default() -> Self {
        Self::uniform(DEFAULT_RESOLUTION)
    }
}

/// Grid geometry: resolution plus cell size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HashGrid {
    resolution: GridResolution,
    spacing: f64,
}

impl HashGrid {
    /// Create a grid. Spacing is clamped to a tiny positive value.
    pub fn new(resolution: GridResolution, spacing: f64) -> Self {
        let spacing = if spacing > 0.0 {
            spacing
        } else {
            f64::MIN_POSITIVE
        };
        Self {
            resolution: GridResolution::new(resolution.x, resolution.y, resolution.z),
            spacing,
        }
    }

    /// Grid resolution.
    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    /// Cell size.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Size of the bucket table for points of type `P`.
    pub fn bucket_count<P: Point>(&self) -> usize {
        self.resolution.bucket_count::<P>()
    }

    /// Unwrapped integer cell coordinates of `p`. Unused axes stay zero.
    pub fn bucket_index<P: Point>(&self, p: &P) -> [i64; 3] {
        let mut out = [0_i64; 3];
        for (axis, slot) in out.iter_mut().enumerate().take(P::DIM) {
            *slot = self.cell_of(p.coord(axis));
        }
        out
    }

    /// Wrap cell coordinates into the table and flatten them to a key.
    pub fn hash_key_from_bucket_index(&self, bucket: [i64; 3]) -> usize {
        let wrapped = |axis: usize| -> usize {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "rem_euclid by the resolution yields a value below the resolution."
            )]
            let w = bucket[axis].rem_euclid(self.resolution.axis(axis) as i64) as usize;
            w
        };
        let (x, y, z) = (wrapped(0), wrapped(1), wrapped(2));
        x + self.resolution.axis(0) * (y + self.resolution.axis(1) * z)
    }

    /// Key of the bucket containing `p`.
    pub fn hash_key<P: Point>(&self, p: &P) -> usize {
        self.hash_key_from_bucket_index(self.bucket_index(p))
    }

    /// Keys of the buckets that can hold points within `radius` of `origin`.
    ///
    /// On each axis the visited cells are the ones containing `origin - radius`
    /// and `origin + radius`, widened by a few ulps so rounding in the distance
    /// test cannot put an in-range point one cell further out. The range is
    /// limited to the origin's cell and its two neighbors, so the result is
    /// complete whenever `radius <= spacing / 2`; larger radii can miss points.
    pub fn nearby_keys<P: Point>(&self, origin: &P, radius: f64) -> NearbyKeys {
        let radius = radius.max(0.0);
        let center = self.bucket_index(origin);
        let mut lo = center;
        let mut hi = center;
        for axis in 0..P::DIM {
            let c = origin.coord(axis);
            let slack = 4.0 * f64::EPSILON * (c.abs() + radius);
            let reach = radius + slack;
            lo[axis] = self.cell_of(c - reach).max(center[axis].saturating_sub(1));
            hi[axis] = self.cell_of(c + reach).min(center[axis].saturating_add(1));
        }

        let mut keys = NearbyKeys::default();
        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    keys.push(self.hash_key_from_bucket_index([x, y, z]));
                }
            }
        }
        keys
    }

    #[inline]
    fn cell_of(&self, coord: f64) -> i64 {
        floor_to_i64(coord / self.spacing)
    }
}

/// Up to 27 distinct bucket keys.
///
/// Wrapping can map two neighbor cells onto the same bucket (for example
/// with a single bucket on an axis); duplicates are dropped so no point is
/// visited twice.
#[derive(Copy, Clone, Debug, Default)]
pub struct NearbyKeys {
    keys: [usize; 27],
    len: usize,
}

impl NearbyKeys {
    fn push(&mut self, key: usize) {
        if !self.as_slice().contains(&key) {
            self.keys[self.len] = key;
            self.len += 1;
        }
    }

    /// The distinct keys.
    pub fn as_slice(&self) -> &[usize] {
        &self.keys[..self.len]
    }
}

#[inline]
fn floor_to_i64(v: f64) -> i64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Saturating float-to-int casts are the intended behavior for far-away points."
    )]
    let i = v.floor() as i64;
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point2, Point3};

    #[test]
    fn resolution_clamps_to_one() {
        let r = GridResolution::new(0, 4, 0);
        assert_eq!(r, GridResolution::new(1, 4, 1));
        assert_eq!(r.bucket_count::<Point2>(), 4);
        assert_eq!(GridResolution::uniform(4).bucket_count::<Point3>(), 64);
    }

    #[test]
    fn negative_coordinates_wrap() {
        let grid = HashGrid::new(GridResolution::uniform(4), 1.0);
        assert_eq!(grid.bucket_index(&Point2::new(-0.5, 2.5)), [-1, 2, 0]);
        assert_eq!(grid.hash_key(&Point2::new(-0.5, 2.5)), 3 + 4 * 2);
        // Five cells to the right wraps back onto cell one.
        assert_eq!(
            grid.hash_key(&Point2::new(5.5, 0.0)),
            grid.hash_key(&Point2::new(1.5, 0.0))
        );
    }

    #[test]
    fn nearby_keys_cover_the_query_interval() {
        let grid = HashGrid::new(GridResolution::uniform(8), 2.0);
        let keys = grid.nearby_keys(&Point2::new(3.5, 2.2), 1.0);
        // Cell (1, 1); x reaches up into 2, y reaches down into 0.
        let mut got = keys.as_slice().to_vec();
        got.sort_unstable();
        let mut want = vec![1 + 8, 2 + 8, 1, 2];
        want.sort_unstable();
        assert_eq!(got, want);
        assert_eq!(grid.nearby_keys(&Point3::new(0.1, 0.1, 0.1), 1.0).as_slice().len(), 8);
    }

    #[test]
    fn nearby_keys_are_distinct_on_tiny_grids() {
        let grid = HashGrid::new(GridResolution::new(1, 2, 1), 1.0);
        let keys = grid.nearby_keys(&Point2::new(0.2, 0.2), 0.5);
        assert_eq!(keys.as_slice().len(), 2);
    }

    #[test]
    fn small_radius_visits_only_the_origin_cell() {
        let grid = HashGrid::new(GridResolution::uniform(8), 2.0);
        let keys = grid.nearby_keys(&Point2::new(3.0, 3.0), 0.25);
        assert_eq!(keys.as_slice(), &[1 + 8]);
    }

    #[test]
    fn midpoint_origin_reaches_a_point_at_exactly_the_radius() {
        let spacing = 0.375_764_816_818_790_7;
        let radius = 0.5 * spacing;
        let grid = HashGrid::new(GridResolution::uniform(64), spacing);
        let mid = 19.5 * spacing;
        for ulps in 0..4_u64 {
            let x = f64::from_bits(mid.to_bits() - ulps);
            let origin = Point2::new(x, 0.3);
            let keys = grid.nearby_keys(&origin, radius);
            for p in [Point2::new(x + radius, 0.3), Point2::new(x - radius, 0.3)] {
                assert!(
                    keys.as_slice().contains(&grid.hash_key(&p)),
                    "{p:?} not covered from {origin:?}"
                );
            }
        }
    }

    #[test]
    fn resolution_is_capped_per_axis() {
        let r = GridResolution::new(usize::MAX, 3, usize::MAX);
        assert_eq!(r.x, MAX_AXIS_RESOLUTION);
        assert_eq!(r.bucket_count::<Point3>(), 3 * MAX_AXIS_RESOLUTION * MAX_AXIS_RESOLUTION);
        let raw = GridResolution {
            x: usize::MAX,
            y: usize::MAX,
            z: 0,
        };
        assert_eq!(raw.axis(0), MAX_AXIS_RESOLUTION);
        assert_eq!(raw.axis(2), 1);
        assert_eq!(raw.bucket_count::<Point2>(), MAX_AXIS_RESOLUTION * MAX_AXIS_RESOLUTION);
    }

    #[test]
    fn flattened_keys_stay_inside_the_table() {
        let grid = HashGrid::new(GridResolution::new(usize::MAX, 7, usize::MAX), 0.5);
        let count = grid.bucket_count::<Point3>();
        for p in [
            Point3::new(-1e300, 1e300, 0.0),
            Point3::new(12345.6, -7.0, 99999.9),
            Point3::new(f64::MAX, f64::MIN, 0.25),
        ] {
            assert!(grid.hash_key(&p) < count);
        }
    }
}
