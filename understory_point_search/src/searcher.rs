// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability shared by every point neighbor searcher.

use core::fmt::Debug;

use crate::types::Point;

/// Fixed-radius point neighbor search over a set of points.
///
/// Implementations own a snapshot of the points passed to [`build`](Self::build);
/// queries only ever reflect the most recent build. Indices reported to callbacks
/// are positions in that build's input slice.
pub trait PointNeighborSearcher<P: Point>: Debug + Send + Sync {
    /// Stable backend name, matching [`SearcherKind`](crate::SearcherKind)'s string form.
    fn type_name(&self) -> &'static str;

    /// Replace all internal state with an index over `points`.
    fn build(&mut self, points: &[P]);

    /// Invoke `callback(index, point)` exactly once for every point within
    /// `radius` (inclusive) of `origin`. Call order is unspecified.
    fn for_each_nearby_point(&self, origin: P, radius: f64, callback: &mut dyn FnMut(usize, P));

    /// Whether any point lies within `radius` of `origin`. Stops at the first match.
    fn has_nearby_point(&self, origin: P, radius: f64) -> bool;

    /// Deep copy into a new allocation; the copy shares no buffers with `self`.
    fn clone_box(&self) -> Box<dyn PointNeighborSearcher<P>>;
}

impl<P: Point> Clone for Box<dyn PointNeighborSearcher<P>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Square a query radius after clamping it to be non-negative.
#[inline]
pub(crate) fn radius_squared(radius: f64) -> f64 {
    let r = radius.max(0.0);
    r * r
}
