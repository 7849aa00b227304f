// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sets of geometric primitives with BVH-accelerated closest-point and ray queries.
//!
//! A [`PrimitiveSet`] splits its members into bounded primitives, indexed by
//! a [`Bvh`], and unbounded ones (planes, half-spaces), which every query
//! scans linearly. Answers combine both halves and keep the better result.
//! The BVH is rebuilt lazily, on the first query after the set changes.

use core::cell::OnceCell;
use core::fmt::Debug;

use crate::bvh::{Bvh, NearestItem, RayHit};
use crate::types::{BoundingBox, Point, Ray};

/// A primitive that can answer closest-point and ray queries.
pub trait Primitive<P: Point> {
    /// Finite bounds, or `None` for unbounded primitives.
    fn bounding_box(&self) -> Option<BoundingBox<P>>;

    /// Point on the primitive's surface closest to `p`.
    fn closest_point(&self, p: P) -> P;

    /// Unsigned distance from `p` to the surface.
    fn closest_distance(&self, p: P) -> f64 {
        self.closest_point(p).distance(&p)
    }

    /// Smallest non-negative ray parameter at which the ray meets the surface.
    fn closest_intersection(&self, ray: &Ray<P>) -> Option<f64>;

    /// Whether the ray meets the surface.
    fn intersects(&self, ray: &Ray<P>) -> bool {
        self.closest_intersection(ray).is_some()
    }
}

/// Sphere (circle in 2D) surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere<P> {
    /// Center.
    pub center: P,
    /// Radius, non-negative.
    pub radius: f64,
}

impl<P: Point> Sphere<P> {
    /// Create a sphere; a negative radius is clamped to zero.
    pub fn new(center: P, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

impl<P: Point> Primitive<P> for Sphere<P> {
    fn bounding_box(&self) -> Option<BoundingBox<P>> {
        let r = self.radius;
        Some(BoundingBox {
            lower: P::from_fn(|a| self.center.coord(a) - r),
            upper: P::from_fn(|a| self.center.coord(a) + r),
        })
    }

    fn closest_point(&self, p: P) -> P {
        let d = p.distance(&self.center);
        if d == 0.0 {
            return P::from_fn(|a| self.center.coord(a) + if a == 0 { self.radius } else { 0.0 });
        }
        let s = self.radius / d;
        P::from_fn(|a| self.center.coord(a) + (p.coord(a) - self.center.coord(a)) * s)
    }

    fn closest_distance(&self, p: P) -> f64 {
        (p.distance(&self.center) - self.radius).abs()
    }

    fn closest_intersection(&self, ray: &Ray<P>) -> Option<f64> {
        let oc = P::from_fn(|a| ray.origin.coord(a) - self.center.coord(a));
        let a = ray.direction.dot(&ray.direction);
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * ray.direction.dot(&oc);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = (-b - sq) / (2.0 * a);
        let t1 = (-b + sq) / (2.0 * a);
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }
}

/// Infinite plane (line in 2D) through `point` with unit `normal`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane<P> {
    /// A point on the plane.
    pub point: P,
    /// Unit normal.
    pub normal: P,
}

impl<P: Point> Plane<P> {
    /// Create a plane; `normal` is normalized unless it is zero.
    pub fn new(point: P, normal: P) -> Self {
        let len = normal.dot(&normal).sqrt();
        let normal = if len > 0.0 {
            P::from_fn(|a| normal.coord(a) / len)
        } else {
            normal
        };
        Self { point, normal }
    }

    fn signed_distance(&self, p: &P) -> f64 {
        let rel = P::from_fn(|a| p.coord(a) - self.point.coord(a));
        self.normal.dot(&rel)
    }
}

impl<P: Point> Primitive<P> for Plane<P> {
    fn bounding_box(&self) -> Option<BoundingBox<P>> {
        None
    }

    fn closest_point(&self, p: P) -> P {
        let d = self.signed_distance(&p);
        P::from_fn(|a| p.coord(a) - self.normal.coord(a) * d)
    }

    fn closest_distance(&self, p: P) -> f64 {
        self.signed_distance(&p).abs()
    }

    fn closest_intersection(&self, ray: &Ray<P>) -> Option<f64> {
        let denom = self.normal.dot(&ray.direction);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = -self.signed_distance(&ray.origin) / denom;
        (t >= 0.0).then_some(t)
    }
}

/// A set of primitives answering queries against the union of their surfaces.
///
/// Reported indices are positions in insertion order.
#[derive(Clone)]
pub struct PrimitiveSet<P: Point, S> {
    primitives: Vec<S>,
    bounded: Vec<usize>,
    unbounded: Vec<usize>,
    bvh: OnceCell<Bvh<P, usize>>,
}

impl<P: Point, S: Primitive<P>> Default for PrimitiveSet<P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point, S: Primitive<P>> PrimitiveSet<P, S> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            bounded: Vec::new(),
            unbounded: Vec::new(),
            bvh: OnceCell::new(),
        }
    }

    /// Create a set from primitives.
    pub fn from_primitives(primitives: impl IntoIterator<Item = S>) -> Self {
        let mut set = Self::new();
        for p in primitives {
            set.add(p);
        }
        set
    }

    /// Append a primitive. Invalidates the BVH.
    pub fn add(&mut self, primitive: S) {
        let index = self.primitives.len();
        if primitive.bounding_box().is_some() {
            self.bounded.push(index);
        } else {
            self.unbounded.push(index);
        }
        self.primitives.push(primitive);
        self.invalidate();
    }

    /// Drop the BVH; the next query rebuilds it.
    pub fn invalidate(&mut self) {
        self.bvh = OnceCell::new();
    }

    /// Whether the BVH is currently built.
    pub fn is_bvh_built(&self) -> bool {
        self.bvh.get().is_some()
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitive by insertion index.
    pub fn get(&self, index: usize) -> Option<&S> {
        self.primitives.get(index)
    }

    /// Bounds of the whole set; `None` when empty or when any member is unbounded.
    pub fn bounding_box(&self) -> Option<BoundingBox<P>> {
        if !self.unbounded.is_empty() {
            return None;
        }
        self.bvh().bounding_box()
    }

    /// Primitive closest to `p` and its distance.
    pub fn nearest(&self, p: P) -> Option<NearestItem> {
        let prims = &self.primitives;
        let mut best = self
            .bvh()
            .nearest(p, |&i, q| prims[i].closest_distance(*q))
            .map(|hit| NearestItem {
                index: self.bvh().items()[hit.index],
                distance: hit.distance,
            });
        for &i in &self.unbounded {
            let d = prims[i].closest_distance(p);
            if best.is_none_or(|b| d < b.distance) {
                best = Some(NearestItem {
                    index: i,
                    distance: d,
                });
            }
        }
        best
    }

    /// Closest point on any surface, or `None` when empty.
    pub fn closest_point(&self, p: P) -> Option<P> {
        self.nearest(p)
            .map(|hit| self.primitives[hit.index].closest_point(p))
    }

    /// Distance to the closest surface; infinite when empty.
    pub fn closest_distance(&self, p: P) -> f64 {
        self.nearest(p).map_or(f64::INFINITY, |hit| hit.distance)
    }

    /// Whether the ray meets any surface.
    pub fn intersects(&self, ray: &Ray<P>) -> bool {
        let prims = &self.primitives;
        self.unbounded.iter().any(|&i| prims[i].intersects(ray))
            || self.bvh().intersects_ray(ray, |&i, r| prims[i].intersects(r))
    }

    /// First hit along the ray over all surfaces.
    pub fn closest_intersection(&self, ray: &Ray<P>) -> Option<RayHit> {
        let prims = &self.primitives;
        let mut best = self
            .bvh()
            .closest_intersection(ray, |&i, r| prims[i].closest_intersection(r))
            .map(|hit| RayHit {
                index: self.bvh().items()[hit.index],
                t: hit.t,
            });
        for &i in &self.unbounded {
            if let Some(t) = prims[i].closest_intersection(ray)
                && best.is_none_or(|b| t < b.t)
            {
                best = Some(RayHit { index: i, t });
            }
        }
        best
    }

    fn bvh(&self) -> &Bvh<P, usize> {
        self.bvh.get_or_init(|| {
            let mut bvh = Bvh::new();
            bvh.build(self.bounded.iter().filter_map(|&i| {
                self.primitives[i].bounding_box().map(|bbox| (i, bbox))
            }));
            log::debug!(
                "primitive set: rebuilt BVH over {} bounded primitives ({} unbounded)",
                bvh.len(),
                self.unbounded.len()
            );
            bvh
        })
    }
}

impl<P: Point, S> Debug for PrimitiveSet<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("bounded", &self.bounded.len())
            .field("unbounded", &self.unbounded.len())
            .field("bvh_built", &self.bvh.get().is_some())
            .finish_non_exhaustive()
    }
}
