// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding volume hierarchy over items with finite bounding boxes.
//!
//! The tree is bulk built with an SAH-like split: along each axis, items are
//! sorted by box center, prefix/suffix bounds are precomputed, and the split
//! `k` minimizing `measure(LB_k) * k + measure(RB_k) * (n - k)` is kept.
//! Ties prefer the more balanced split, so degenerate (zero-measure) boxes
//! still produce a shallow tree.

use core::fmt::Debug;

use crate::types::{BoundingBox, Point, Ray};

/// Result of [`Bvh::nearest`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NearestItem {
    /// Index of the item in build order.
    pub index: usize,
    /// Distance reported by the caller's distance function.
    pub distance: f64,
}

/// Result of [`Bvh::closest_intersection`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Index of the item in build order.
    pub index: usize,
    /// Ray parameter of the hit.
    pub t: f64,
}

/// Binary BVH owning its items.
#[derive(Clone)]
pub struct Bvh<P: Point, T> {
    max_leaf: usize,
    items: Vec<T>,
    item_bounds: Vec<BoundingBox<P>>,
    arena: Vec<Node<P>>,
    root: Option<NodeIdx>,
}

#[derive(Clone, Debug)]
enum Kind {
    Leaf(Vec<usize>),
    Internal { left: NodeIdx, right: NodeIdx },
}

#[derive(Clone, Debug)]
struct Node<P> {
    bbox: BoundingBox<P>,
    kind: Kind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

impl<P: Point, T> Default for Bvh<P, T> {
    fn default() -> Self {
        Self {
            max_leaf: 4,
            items: Vec::new(),
            item_bounds: Vec::new(),
            arena: Vec::new(),
            root: None,
        }
    }
}

impl<P: Point, T> Bvh<P, T> {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `entries` and rebuild the tree.
    pub fn build(&mut self, entries: impl IntoIterator<Item = (T, BoundingBox<P>)>) {
        self.items.clear();
        self.item_bounds.clear();
        for (item, bbox) in entries {
            self.items.push(item);
            self.item_bounds.push(bbox);
        }
        self.arena.clear();
        self.root = None;
        if self.items.is_empty() {
            return;
        }
        let indices: Vec<usize> = (0..self.items.len()).collect();
        self.root = Some(Self::build_node(
            &mut self.arena,
            &self.item_bounds,
            indices,
            self.max_leaf,
        ));
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the hierarchy holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item by build index.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Items in build order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Bounds of every item, or `None` when empty.
    pub fn bounding_box(&self) -> Option<BoundingBox<P>> {
        self.root.map(|r| self.arena[r.get()].bbox)
    }

    /// Item minimizing `distance(item, origin)`.
    ///
    /// `distance` must never be smaller than the distance from `origin` to the
    /// item's bounding box, or subtrees may be pruned incorrectly.
    pub fn nearest(
        &self,
        origin: P,
        mut distance: impl FnMut(&T, &P) -> f64,
    ) -> Option<NearestItem> {
        let root = self.root?;
        let mut best: Option<NearestItem> = None;
        let mut best_d = f64::INFINITY;
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let node = &self.arena[i.get()];
            if node.bbox.distance_squared_to(&origin) > best_d * best_d {
                continue;
            }
            match &node.kind {
                Kind::Leaf(items) => {
                    for &item in items {
                        let d = distance(&self.items[item], &origin);
                        if d < best_d {
                            best_d = d;
                            best = Some(NearestItem {
                                index: item,
                                distance: d,
                            });
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    let dl = self.arena[left.get()].bbox.distance_squared_to(&origin);
                    let dr = self.arena[right.get()].bbox.distance_squared_to(&origin);
                    // Visit the closer child first.
                    if dl <= dr {
                        stack.push(*right);
                        stack.push(*left);
                    } else {
                        stack.push(*left);
                        stack.push(*right);
                    }
                }
            }
        }
        best
    }

    /// Whether any item whose bounds overlap `query` passes `test`.
    pub fn intersects_box(
        &self,
        query: &BoundingBox<P>,
        mut test: impl FnMut(&T, &BoundingBox<P>) -> bool,
    ) -> bool {
        let mut hit = false;
        self.for_each_candidate(
            |bbox| bbox.overlaps(query),
            |item| {
                hit = test(item, query);
                hit
            },
        );
        hit
    }

    /// Whether any item whose bounds the ray enters passes `test`.
    pub fn intersects_ray(&self, ray: &Ray<P>, mut test: impl FnMut(&T, &Ray<P>) -> bool) -> bool {
        let mut hit = false;
        self.for_each_candidate(
            |bbox| bbox.intersect_ray(ray).is_some(),
            |item| {
                hit = test(item, ray);
                hit
            },
        );
        hit
    }

    /// Closest hit along the ray. `test` returns the ray parameter of its hit, if any.
    pub fn closest_intersection(
        &self,
        ray: &Ray<P>,
        mut test: impl FnMut(&T, &Ray<P>) -> Option<f64>,
    ) -> Option<RayHit> {
        let root = self.root?;
        let mut best: Option<RayHit> = None;
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let node = &self.arena[i.get()];
            let Some((t_enter, _)) = node.bbox.intersect_ray(ray) else {
                continue;
            };
            if best.is_some_and(|b| t_enter > b.t) {
                continue;
            }
            match &node.kind {
                Kind::Leaf(items) => {
                    for &item in items {
                        if let Some(t) = test(&self.items[item], ray)
                            && best.is_none_or(|b| t < b.t)
                        {
                            best = Some(RayHit { index: item, t });
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        best
    }

    /// Call `visitor(index, item)` for every item whose bounds overlap `query`
    /// and that passes `test`.
    pub fn for_each_intersecting_item(
        &self,
        query: &BoundingBox<P>,
        mut test: impl FnMut(&T, &BoundingBox<P>) -> bool,
        mut visitor: impl FnMut(usize, &T),
    ) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let node = &self.arena[i.get()];
            if !node.bbox.overlaps(query) {
                continue;
            }
            match &node.kind {
                Kind::Leaf(items) => {
                    for &item in items {
                        if self.item_bounds[item].overlaps(query) && test(&self.items[item], query) {
                            visitor(item, &self.items[item]);
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
    }

    /// Depth-first walk over items whose bounds pass `node_filter`; stops when
    /// `visit` returns `true`.
    fn for_each_candidate(
        &self,
        node_filter: impl Fn(&BoundingBox<P>) -> bool,
        mut visit: impl FnMut(&T) -> bool,
    ) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let node = &self.arena[i.get()];
            if !node_filter(&node.bbox) {
                continue;
            }
            match &node.kind {
                Kind::Leaf(items) => {
                    for &item in items {
                        if node_filter(&self.item_bounds[item]) && visit(&self.items[item]) {
                            return;
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
    }

    fn bbox_of(bounds: &[BoundingBox<P>], indices: &[usize]) -> BoundingBox<P> {
        let mut it = indices.iter();
        let first = it.next().map(|&i| bounds[i]);
        let first = first.unwrap_or_else(|| BoundingBox::from_point(P::from_fn(|_| 0.0)));
        it.fold(first, |acc, &i| acc.union(&bounds[i]))
    }

    fn build_node(
        arena: &mut Vec<Node<P>>,
        bounds: &[BoundingBox<P>],
        indices: Vec<usize>,
        max_leaf: usize,
    ) -> NodeIdx {
        let bbox = Self::bbox_of(bounds, &indices);
        if indices.len() <= max_leaf {
            arena.push(Node {
                bbox,
                kind: Kind::Leaf(indices),
            });
            return NodeIdx(arena.len() - 1);
        }
        let (l, r) = Self::split_sah(bounds, indices);
        let left = Self::build_node(arena, bounds, l, max_leaf);
        let right = Self::build_node(arena, bounds, r, max_leaf);
        arena.push(Node {
            bbox,
            kind: Kind::Internal { left, right },
        });
        NodeIdx(arena.len() - 1)
    }

    /// SAH-like split of at least two items into two non-empty halves.
    fn split_sah(bounds: &[BoundingBox<P>], mut items: Vec<usize>) -> (Vec<usize>, Vec<usize>) {
        let n = items.len();
        let center = |i: usize, axis: usize| bounds[i].midpoint().coord(axis);
        // (cost, imbalance, axis, k)
        let mut best = (f64::INFINITY, usize::MAX, 0_usize, n / 2);
        for axis in 0..P::DIM {
            items.sort_by(|&a, &b| center(a, axis).total_cmp(&center(b, axis)));

            // Precompute prefix/suffix measures for O(1) split evaluation
            let mut prefix: Vec<f64> = Vec::with_capacity(n);
            let mut acc = bounds[items[0]];
            for &i in &items {
                acc = acc.union(&bounds[i]);
                prefix.push(acc.surface_measure());
            }
            let mut suffix: Vec<f64> = vec![0.0; n];
            let mut acc = bounds[items[n - 1]];
            for (k, &i) in items.iter().enumerate().rev() {
                acc = acc.union(&bounds[i]);
                suffix[k] = acc.surface_measure();
            }

            for k in 1..n {
                let cost = prefix[k - 1] * k as f64 + suffix[k] * (n - k) as f64;
                let imbalance = k.abs_diff(n / 2);
                if cost < best.0 || (cost == best.0 && imbalance < best.1) {
                    best = (cost, imbalance, axis, k);
                }
            }
        }
        let (_, _, axis, k) = best;
        items.sort_by(|&a, &b| center(a, axis).total_cmp(&center(b, axis)));
        let right = items.split_off(k);
        (items, right)
    }
}

impl<P: Point, T> Debug for Bvh<P, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bvh")
            .field("max_leaf", &self.max_leaf)
            .field("arena_nodes", &self.arena.len())
            .field("items", &self.items.len())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point2, Point3};

    fn unit_box_at(x: f64, y: f64) -> BoundingBox<Point2> {
        BoundingBox::from_corners(Point2::new(x, y), Point2::new(x + 1.0, y + 1.0))
    }

    fn row_of_boxes(n: usize) -> Bvh<Point2, usize> {
        let mut bvh = Bvh::new();
        bvh.build((0..n).map(|i| (i, unit_box_at(i as f64 * 2.0, 0.0))));
        bvh
    }

    fn leaf_depths(bvh: &Bvh<Point2, usize>, idx: NodeIdx, depth: usize, out: &mut Vec<usize>) {
        match &bvh.arena[idx.get()].kind {
            Kind::Leaf(items) => out.extend(items.iter().map(|_| depth)),
            Kind::Internal { left, right } => {
                leaf_depths(bvh, *left, depth + 1, out);
                leaf_depths(bvh, *right, depth + 1, out);
            }
        }
    }

    #[test]
    fn build_splits_past_max_leaf() {
        let bvh = row_of_boxes(12);
        let root = bvh.root.unwrap();
        assert!(matches!(bvh.arena[root.get()].kind, Kind::Internal { .. }));
        let mut depths = Vec::new();
        leaf_depths(&bvh, root, 0, &mut depths);
        assert_eq!(depths.len(), 12, "every item lands in exactly one leaf");
        assert_eq!(
            bvh.bounding_box(),
            Some(BoundingBox::from_corners(
                Point2::new(0.0, 0.0),
                Point2::new(23.0, 1.0)
            ))
        );
    }

    #[test]
    fn degenerate_boxes_stay_shallow() {
        let mut bvh: Bvh<Point3, usize> = Bvh::new();
        bvh.build((0..256).map(|i| {
            let p = Point3::new(i as f64, 0.0, 0.0);
            (i, BoundingBox::from_point(p))
        }));
        let mut depths = Vec::new();
        let mut stack = vec![(bvh.root.unwrap(), 0_usize)];
        while let Some((idx, d)) = stack.pop() {
            match &bvh.arena[idx.get()].kind {
                Kind::Leaf(_) => depths.push(d),
                Kind::Internal { left, right } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        assert!(depths.iter().all(|&d| d <= 8), "median fallback keeps depth logarithmic");
    }

    #[test]
    fn nearest_uses_caller_distance() {
        let bvh = row_of_boxes(10);
        let origin = Point2::new(9.4, 3.0);
        let hit = bvh
            .nearest(origin, |&i, p| bvh.item_bounds[i].distance_squared_to(p).sqrt())
            .unwrap();
        // Box 4 spans x in [8, 9], box 5 spans [10, 11].
        assert_eq!(hit.index, 4);
        assert!((hit.distance - (0.4_f64 * 0.4 + 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn box_and_ray_queries() {
        let bvh = row_of_boxes(10);
        let q = BoundingBox::from_corners(Point2::new(4.5, 0.5), Point2::new(6.5, 0.6));
        let mut seen = Vec::new();
        bvh.for_each_intersecting_item(&q, |_, _| true, |i, _| seen.push(i));
        seen.sort_unstable();
        assert_eq!(seen, vec![2, 3]);
        assert!(bvh.intersects_box(&q, |&i, _| i == 3));
        assert!(!bvh.intersects_box(&q, |&i, _| i == 7));

        let ray = Ray::new(Point2::new(-5.0, 0.5), Point2::new(1.0, 0.0));
        let hit = bvh
            .closest_intersection(&ray, |&i, r| bvh.item_bounds[i].intersect_ray(r).map(|t| t.0))
            .unwrap();
        assert_eq!(hit, RayHit { index: 0, t: 5.0 });
        let up = Ray::new(Point2::new(-5.0, 0.5), Point2::new(0.0, 1.0));
        assert!(!bvh.intersects_ray(&up, |_, _| true));
    }

    #[test]
    fn empty_bvh_answers_nothing() {
        let mut bvh: Bvh<Point2, ()> = Bvh::new();
        bvh.build(core::iter::empty());
        assert!(bvh.is_empty());
        assert!(bvh.nearest(Point2::new(0.0, 0.0), |_, _| 0.0).is_none());
        assert!(bvh.bounding_box().is_none());
    }
}
