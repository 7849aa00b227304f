// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

/// A point in 2D or 3D space with `f64` coordinates.
///
/// Searchers, grids, and the BVH are written once against this trait and
/// instantiated for [`Point2`] and [`Point3`].
pub trait Point: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// Number of coordinates (2 or 3).
    const DIM: usize;

    /// Coordinate along `axis`. `axis` must be less than [`Self::DIM`].
    fn coord(&self, axis: usize) -> f64;

    /// Build a point by evaluating `f` for each axis in order.
    fn from_fn(f: impl FnMut(usize) -> f64) -> Self;

    /// Squared Euclidean distance to `other`.
    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        let mut acc = 0.0;
        for axis in 0..Self::DIM {
            let d = self.coord(axis) - other.coord(axis);
            acc += d * d;
        }
        acc
    }

    /// Euclidean distance to `other`.
    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Dot product, treating both points as vectors from the origin.
    #[inline]
    fn dot(&self, other: &Self) -> f64 {
        let mut acc = 0.0;
        for axis in 0..Self::DIM {
            acc += self.coord(axis) * other.coord(axis);
        }
        acc
    }
}

/// A 2D point (or vector).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Point for Point2 {
    const DIM: usize = 2;

    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            _ => self.y,
        }
    }

    #[inline]
    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1))
    }
}

/// A 3D point (or vector).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Point for Point3 {
    const DIM: usize = 3;

    #[inline]
    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    fn from_fn(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2))
    }
}

macro_rules! impl_point_ops {
    ($ty:ty) => {
        impl Add for $ty {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::from_fn(|a| self.coord(a) + rhs.coord(a))
            }
        }

        impl Sub for $ty {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::from_fn(|a| self.coord(a) - rhs.coord(a))
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                Self::from_fn(|a| self.coord(a) * rhs)
            }
        }

        impl Neg for $ty {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self::from_fn(|a| -self.coord(a))
            }
        }
    };
}

impl_point_ops!(Point2);
impl_point_ops!(Point3);

#[cfg(feature = "kurbo")]
impl From<kurbo::Point> for Point2 {
    fn from(p: kurbo::Point) -> Self {
        Self::new(p.x, p.y)
    }
}

#[cfg(feature = "kurbo")]
impl From<Point2> for kurbo::Point {
    fn from(p: Point2) -> Self {
        Self::new(p.x, p.y)
    }
}

#[cfg(feature = "kurbo")]
impl From<kurbo::Vec2> for Point2 {
    fn from(v: kurbo::Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

#[cfg(feature = "kurbo")]
impl From<Point2> for kurbo::Vec2 {
    fn from(p: Point2) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox<P> {
    /// Minimum corner.
    pub lower: P,
    /// Maximum corner.
    pub upper: P,
}

impl<P: Point> BoundingBox<P> {
    /// Create a box from two arbitrary corners; coordinates are sorted per axis.
    pub fn from_corners(a: P, b: P) -> Self {
        Self {
            lower: P::from_fn(|axis| min_t(a.coord(axis), b.coord(axis))),
            upper: P::from_fn(|axis| max_t(a.coord(axis), b.coord(axis))),
        }
    }

    /// A degenerate box containing exactly `p`.
    pub fn from_point(p: P) -> Self {
        Self { lower: p, upper: p }
    }

    /// Box extent along `axis`.
    #[inline]
    pub fn extent(&self, axis: usize) -> f64 {
        (self.upper.coord(axis) - self.lower.coord(axis)).max(0.0)
    }

    /// Center of the box.
    pub fn midpoint(&self) -> P {
        P::from_fn(|axis| 0.5 * (self.lower.coord(axis) + self.upper.coord(axis)))
    }

    /// Whether the box contains the point (boundary inclusive).
    pub fn contains(&self, p: &P) -> bool {
        (0..P::DIM).all(|axis| {
            le(self.lower.coord(axis), p.coord(axis)) && le(p.coord(axis), self.upper.coord(axis))
        })
    }

    /// Whether two boxes share at least one point.
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..P::DIM).all(|axis| {
            le(self.lower.coord(axis), other.upper.coord(axis))
                && le(other.lower.coord(axis), self.upper.coord(axis))
        })
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lower: P::from_fn(|axis| min_t(self.lower.coord(axis), other.lower.coord(axis))),
            upper: P::from_fn(|axis| max_t(self.upper.coord(axis), other.upper.coord(axis))),
        }
    }

    /// Squared distance from `p` to the nearest point of the box; zero inside.
    pub fn distance_squared_to(&self, p: &P) -> f64 {
        let mut acc = 0.0;
        for axis in 0..P::DIM {
            let c = p.coord(axis);
            let lo = self.lower.coord(axis);
            let hi = self.upper.coord(axis);
            let d = if c < lo {
                lo - c
            } else if c > hi {
                c - hi
            } else {
                0.0
            };
            acc += d * d;
        }
        acc
    }

    /// Sum of pairwise extent products: area in 2D, half the surface area in 3D.
    ///
    /// Used as the SAH cost measure; only relative values matter.
    pub fn surface_measure(&self) -> f64 {
        let mut acc = 0.0;
        for a in 0..P::DIM {
            for b in (a + 1)..P::DIM {
                acc += self.extent(a) * self.extent(b);
            }
        }
        acc
    }

    /// Slab test. Returns the `[t_min, t_max]` interval (clamped to `t >= 0`)
    /// over which the ray is inside the box.
    pub fn intersect_ray(&self, ray: &Ray<P>) -> Option<(f64, f64)> {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..P::DIM {
            let o = ray.origin.coord(axis);
            let d = ray.direction.coord(axis);
            let lo = self.lower.coord(axis);
            let hi = self.upper.coord(axis);
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

/// Half-line `origin + t * direction`, `t >= 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray<P> {
    /// Ray origin.
    pub origin: P,
    /// Ray direction. Not required to be normalized; hit parameters are in units of it.
    pub direction: P,
}

impl<P: Point> Ray<P> {
    /// Create a new ray.
    pub const fn new(origin: P, direction: P) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    pub fn point_at(&self, t: f64) -> P {
        P::from_fn(|axis| self.origin.coord(axis) + t * self.direction.coord(axis))
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_dot() {
        let a = Point3::new(1.0, 2.0, 2.0);
        assert_eq!(a.distance_squared(&Point3::default()), 9.0);
        assert_eq!(a.distance(&Point3::default()), 3.0);
        assert_eq!(a.dot(&Point3::new(1.0, 0.0, 1.0)), 3.0);
        assert_eq!(Point2::new(1.0, 1.0) - Point2::new(0.5, 2.0), Point2::new(0.5, -1.0));
    }

    #[test]
    fn box_distance_is_zero_inside() {
        let b = BoundingBox::from_corners(Point2::new(1.0, 1.0), Point2::new(-1.0, -1.0));
        assert_eq!(b.lower, Point2::new(-1.0, -1.0));
        assert_eq!(b.distance_squared_to(&Point2::new(0.5, 0.0)), 0.0);
        assert_eq!(b.distance_squared_to(&Point2::new(4.0, 5.0)), 9.0 + 16.0);
        assert!(b.contains(&Point2::new(1.0, -1.0)));
    }

    #[test]
    fn surface_measure_matches_dimension() {
        let b2 = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(2.0, 3.0));
        assert_eq!(b2.surface_measure(), 6.0);
        let b3 = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(b3.surface_measure(), 2.0 + 3.0 + 6.0);
    }

    #[test]
    fn ray_slab_test() {
        let b = BoundingBox::from_corners(Point3::new(1.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0));
        let hit = Ray::new(Point3::default(), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(b.intersect_ray(&hit), Some((1.0, 3.0)));
        let miss = Ray::new(Point3::default(), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(b.intersect_ray(&miss), None);
        let behind = Ray::new(Point3::new(5.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(b.intersect_ray(&behind), None);
    }

    #[cfg(feature = "kurbo")]
    #[test]
    fn kurbo_round_trip() {
        let p: Point2 = kurbo::Point::new(3.0, -4.0).into();
        assert_eq!(p, Point2::new(3.0, -4.0));
        let k: kurbo::Point = p.into();
        assert_eq!(k, kurbo::Point::new(3.0, -4.0));
    }
}
