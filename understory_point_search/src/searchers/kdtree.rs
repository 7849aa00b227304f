// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! k-d tree searcher with median splits on alternating axes.

use core::fmt::Debug;

use crate::searcher::{PointNeighborSearcher, radius_squared};
use crate::types::{Point, Point2, Point3};

/// k-d tree over a point snapshot.
///
/// Every node stores one point and splits on `depth % DIM`. Points in the
/// left subtree have `coord[axis] <= split` and points in the right subtree
/// have `coord[axis] >= split`; ties may land on either side, so queries
/// descend into both children whenever the query ball touches the plane.
#[derive(Clone)]
pub struct KdTreeSearcher<P: Point> {
    points: Vec<P>,
    nodes: Vec<KdNode>,
    root: Option<NodeIdx>,
}

#[derive(Copy, Clone, Debug)]
struct KdNode {
    axis: usize,
    split: f64,
    item: usize,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

impl<P: Point> Default for KdTreeSearcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point> KdTreeSearcher<P> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Points from the last build, in input order.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Index and distance of the point closest to `origin`, or `None` when empty.
    pub fn nearest(&self, origin: P) -> Option<(usize, f64)> {
        let root = self.root?;
        let mut best = (usize::MAX, f64::INFINITY);
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx.get()];
            let d2 = self.points[node.item].distance_squared(&origin);
            if d2 < best.1 {
                best = (node.item, d2);
            }
            let delta = origin.coord(node.axis) - node.split;
            let (near, far) = if delta <= 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            // Push the far side first so the near side is explored first.
            if let Some(far) = far
                && delta * delta <= best.1
            {
                stack.push(far);
            }
            if let Some(near) = near {
                stack.push(near);
            }
        }
        Some((best.0, best.1.sqrt()))
    }

    fn build_range(
        nodes: &mut Vec<KdNode>,
        points: &[P],
        indices: &mut [usize],
        depth: usize,
    ) -> Option<NodeIdx> {
        if indices.is_empty() {
            return None;
        }
        let axis = depth % P::DIM;
        let mid = indices.len() / 2;
        indices.select_nth_unstable_by(mid, |&a, &b| {
            points[a].coord(axis).total_cmp(&points[b].coord(axis))
        });
        let item = indices[mid];
        let idx = NodeIdx(nodes.len());
        nodes.push(KdNode {
            axis,
            split: points[item].coord(axis),
            item,
            left: None,
            right: None,
        });
        let (lower, upper) = indices.split_at_mut(mid);
        let left = Self::build_range(nodes, points, lower, depth + 1);
        let right = Self::build_range(nodes, points, &mut upper[1..], depth + 1);
        nodes[idx.get()].left = left;
        nodes[idx.get()].right = right;
        Some(idx)
    }

    /// Depth-first walk that stops as soon as `visit` returns `true`; reports
    /// whether it did.
    fn walk(&self, origin: P, radius: f64, mut visit: impl FnMut(usize, P) -> bool) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let radius = radius.max(0.0);
        let r2 = radius_squared(radius);
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx.get()];
            let p = self.points[node.item];
            if p.distance_squared(&origin) <= r2 && visit(node.item, p) {
                return true;
            }
            let c = origin.coord(node.axis);
            if let Some(left) = node.left
                && c - radius <= node.split
            {
                stack.push(left);
            }
            if let Some(right) = node.right
                && c + radius >= node.split
            {
                stack.push(right);
            }
        }
        false
    }
}

impl<P: Point> Debug for KdTreeSearcher<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTreeSearcher")
            .field("points", &self.points.len())
            .field("nodes", &self.nodes.len())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}

impl<P: Point> PointNeighborSearcher<P> for KdTreeSearcher<P> {
    fn type_name(&self) -> &'static str {
        "kdtree"
    }

    fn build(&mut self, points: &[P]) {
        self.points.clear();
        self.points.extend_from_slice(points);
        self.nodes.clear();
        self.nodes.reserve(points.len());
        let mut indices: Vec<usize> = (0..points.len()).collect();
        self.root = Self::build_range(&mut self.nodes, &self.points, &mut indices, 0);
        log::debug!("kdtree build: {} points", points.len());
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

/// k-d tree searcher over 2D points.
pub type KdTreeSearcher2 = KdTreeSearcher<Point2>;

/// k-d tree searcher over 3D points.
pub type KdTreeSearcher3 = KdTreeSearcher<Point3>;
