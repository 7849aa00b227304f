// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force searcher with linear scans. Small and simple; good for tiny sets
//! and as a reference when checking the accelerated searchers.

use core::fmt::Debug;

use crate::searcher::{PointNeighborSearcher, radius_squared};
use crate::types::{Point, Point2, Point3};

/// Flat list of points, scanned linearly on every query.
#[derive(Clone)]
pub struct NaiveListSearcher<P: Point> {
    points: Vec<P>,
}

impl<P: Point> Default for NaiveListSearcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point> NaiveListSearcher<P> {
    /// Create an empty searcher.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Points from the last build, in input order.
    pub fn points(&self) -> &[P] {
        &self.points
    }
}

impl<P: Point> Debug for NaiveListSearcher<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NaiveListSearcher")
            .field("points", &self.points.len())
            .finish_non_exhaustive()
    }
}

impl<P: Point> PointNeighborSearcher<P> for NaiveListSearcher<P> {
    fn type_name(&self) -> &'static str {
        "naive-list"
    }

    fn build(&mut self, points: &[P]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    fn for_each_nearby_point(&self, origin: P, radius: f64, callback: &mut dyn FnMut(usize, P)) {
        let r2 = radius_squared(radius);
        for (i, p) in self.points.iter().enumerate() {
            if p.distance_squared(&origin) <= r2 {
                callback(i, *p);
            }
        }
    }

    fn has_nearby_point(&self, origin: P, radius: f64) -> bool {
        let r2 = radius_squared(radius);
        self.points.iter().any(|p| p.distance_squared(&origin) <= r2)
    }

    fn clone_box(&self) -> Box<dyn PointNeighborSearcher<P>> {
        Box::new(self.clone())
    }
}

/// Brute-force searcher over 2D points.
pub type NaiveListSearcher2 = NaiveListSearcher<Point2>;

/// Brute-force searcher over 3D points.
pub type NaiveListSearcher3 = NaiveListSearcher<Point3>;
