// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic lattice point generators for seeding particles.

use crate::types::{BoundingBox, Point, Point2, Point3};

/// Points of a triangular lattice filling `bounds`.
///
/// Rows are `spacing * sqrt(3) / 2` apart and every other row is shifted by
/// half a spacing, so each interior point has six neighbors at `spacing`.
/// Non-positive spacing, non-finite bounds, or a spacing too small for the
/// point count to be representable yield no points.
pub fn triangle_lattice(bounds: BoundingBox<Point2>, spacing: f64) -> Vec<Point2> {
    let mut out = Vec::new();
    let half = 0.5 * spacing;
    let row = spacing * 3.0_f64.sqrt() * 0.5;
    let width = bounds.extent(0);
    let height = bounds.extent(1);
    if !corners_finite(&bounds) || !steps_fit(spacing, &[width / spacing, height / row]) {
        return out;
    }

    let mut offset = false;
    let mut j = 0_usize;
    while j as f64 * row <= height {
        let y = j as f64 * row + bounds.lower.y;
        let shift = if offset { half } else { 0.0 };
        let mut i = 0_usize;
        while i as f64 * spacing + shift <= width {
            out.push(Point2::new(i as f64 * spacing + shift + bounds.lower.x, y));
            i += 1;
        }
        offset = !offset;
        j += 1;
    }
    out
}

/// Points of a body-centered cubic lattice filling `bounds`.
///
/// Layers are `spacing / 2` apart along z; odd layers are shifted by half a
/// spacing in x and y. Degenerate input yields no points, as for
/// [`triangle_lattice`].
pub fn bcc_lattice(bounds: BoundingBox<Point3>, spacing: f64) -> Vec<Point3> {
    let mut out = Vec::new();
    let half = 0.5 * spacing;
    let (width, height, depth) = (bounds.extent(0), bounds.extent(1), bounds.extent(2));
    if !corners_finite(&bounds)
        || !steps_fit(spacing, &[width / spacing, height / spacing, depth / half])
    {
        return out;
    }

    let mut offset = false;
    let mut k = 0_usize;
    while k as f64 * half <= depth {
        let z = k as f64 * half + bounds.lower.z;
        let shift = if offset { half } else { 0.0 };
        let mut j = 0_usize;
        while j as f64 * spacing + shift <= height {
            let y = j as f64 * spacing + shift + bounds.lower.y;
            let mut i = 0_usize;
            while i as f64 * spacing + shift <= width {
                let x = i as f64 * spacing + shift + bounds.lower.x;
                out.push(Point3::new(x, y, z));
                i += 1;
            }
            j += 1;
        }
        offset = !offset;
        k += 1;
    }
    out
}

/// Largest number of steps along one axis.
const MAX_STEPS: f64 = (1_u64 << 32) as f64;

fn corners_finite<P: Point>(bounds: &BoundingBox<P>) -> bool {
    (0..P::DIM)
        .all(|axis| bounds.lower.coord(axis).is_finite() && bounds.upper.coord(axis).is_finite())
}

/// Whether `spacing` is usable and every per-axis step count is finite and bounded.
fn steps_fit(spacing: f64, steps: &[f64]) -> bool {
    spacing.is_finite() && spacing > 0.0 && steps.iter().all(|s| s.is_finite() && *s < MAX_STEPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_lattice_rows_alternate() {
        let bounds = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let points = triangle_lattice(bounds, 0.5);
        // Rows at y = 0, 0.433, 0.866; widths 3, 2, 3.
        assert_eq!(points.len(), 8);
        assert_eq!(points[3], Point2::new(0.25, 0.5 * 3.0_f64.sqrt() * 0.5));
        assert!(points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn nearest_lattice_neighbors_are_one_spacing_apart() {
        let bounds = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let points = triangle_lattice(bounds, 0.1);
        let center = points[points.len() / 2];
        let nearest = points
            .iter()
            .filter(|p| **p != center)
            .map(|p| p.distance(&center))
            .fold(f64::INFINITY, f64::min);
        assert!((nearest - 0.1).abs() < 1e-9);
    }

    #[test]
    fn bcc_lattice_layers() {
        let bounds =
            BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let points = bcc_lattice(bounds, 1.0);
        // Layer z=0: 2x2 corners, z=0.5: one center, z=1: 2x2 corners.
        assert_eq!(points.len(), 9);
        assert!(points.contains(&Point3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn degenerate_spacing_is_empty() {
        let bounds = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(triangle_lattice(bounds, 0.0).is_empty());
        assert!(triangle_lattice(bounds, f64::NAN).is_empty());
    }

    #[test]
    fn non_finite_bounds_are_empty() {
        let wide = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(f64::INFINITY, 1.0));
        assert!(triangle_lattice(wide, 0.5).is_empty());
        let nan = BoundingBox {
            lower: Point3::new(0.0, 0.0, 0.0),
            upper: Point3::new(1.0, f64::NAN, 1.0),
        };
        assert!(bcc_lattice(nan, 0.5).is_empty());
        let unit = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(triangle_lattice(unit, f64::INFINITY).is_empty());
    }

    #[test]
    fn step_counts_beyond_the_limit_are_empty() {
        let bounds = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1e12, 1.0));
        assert!(triangle_lattice(bounds, 1e-3).is_empty());
        let cube =
            BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1e300));
        assert!(bcc_lattice(cube, 1.0).is_empty());
    }
}
