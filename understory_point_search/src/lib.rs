// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_point_search --heading-base-level=0

//! Understory Point Search: interchangeable fixed-radius point neighbor searchers.
//!
//! Understory Point Search is the spatial building block for particle simulations.
//!
//! - Build an index over a slice of 2D or 3D points.
//! - Visit every point within a radius of a query origin, or ask whether one exists.
//! - Swap backends behind one trait object without touching call sites.
//!
//! All searchers implement [`PointNeighborSearcher`]. Queries are inclusive
//! (`distance <= radius`), report each point exactly once, and reflect only the
//! most recent [`build`](PointNeighborSearcher::build).
//!
//! # Example
//!
//! ```rust
//! use understory_point_search::{
//!     GridResolution, ParallelHashGridSearcher3, Point3, PointNeighborSearcher,
//! };
//!
//! let radius = 0.25;
//! let mut searcher = ParallelHashGridSearcher3::new(GridResolution::uniform(16), 2.0 * radius);
//! searcher.build(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.2, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 1.0),
//! ]);
//!
//! let mut hits = Vec::new();
//! searcher.for_each_nearby_point(Point3::new(0.1, 0.0, 0.0), radius, &mut |i, _| hits.push(i));
//! hits.sort_unstable();
//! assert_eq!(hits, [0, 1]);
//! ```
//!
//! Backends can also be chosen by name, for example from a configuration file:
//!
//! ```rust
//! use understory_point_search::{NeighborSearcherBuilder, Point2, SearcherKind};
//!
//! let kind: SearcherKind = "hash-grid".parse().unwrap();
//! let searcher = NeighborSearcherBuilder::new()
//!     .with_kind(kind)
//!     .with_grid_spacing(1.0)
//!     .build_with_points(&[Point2::new(0.0, 0.0)]);
//! assert!(searcher.has_nearby_point(Point2::new(0.3, 0.4), 0.5));
//! ```
//!
//! ## Choosing a backend
//!
//! - `NaiveListSearcher`: linear scans. Best for a handful of points, and the
//!   reference the other searchers are tested against.
//! - `HashGridSearcher`: serial uniform grid with bucket vectors; supports
//!   incremental [`add`](HashGridSearcher::add).
//! - `ParallelHashGridSearcher` (default): same grid, built with a parallel sort
//!   into contiguous windows. Good for large, frequently rebuilt sets.
//! - `KdTreeSearcher`: no spacing constraint and adapts to clustered data.
//!
//! ### Grid spacing
//!
//! The grid searchers visit only the cells overlapping `origin ± radius` on each
//! axis, clipped to the origin's cell and its direct neighbors. This is complete
//! only when the spacing is at least twice the query radius. Grid coordinates wrap
//! around the resolution, so points far apart may share a bucket; this costs
//! distance tests, never results.
//!
//! ## Primitives and BVH
//!
//! [`Bvh`] accelerates nearest and ray queries over items with finite bounds;
//! [`PrimitiveSet`] pairs it with a linear list of unbounded primitives and rebuilds
//! it lazily after edits.
//!
//! ### Float semantics
//!
//! This crate assumes finite coordinates. NaNs never match a query.

pub mod builder;
pub mod bvh;
pub mod error;
pub mod generators;
pub mod grid;
pub mod searcher;
pub mod searchers;
pub mod surfaces;
pub mod types;

pub use builder::{NeighborSearcherBuilder, SearcherKind};
pub use bvh::{Bvh, NearestItem, RayHit};
pub use error::SearchError;
pub use generators::{bcc_lattice, triangle_lattice};
pub use grid::{DEFAULT_RESOLUTION, GridResolution, HashGrid, MAX_AXIS_RESOLUTION};
pub use searcher::PointNeighborSearcher;
pub use searchers::{
    HashGridSearcher, HashGridSearcher2, HashGridSearcher3, KdTreeSearcher, KdTreeSearcher2,
    KdTreeSearcher3, NaiveListSearcher, NaiveListSearcher2, NaiveListSearcher3,
    ParallelHashGridSearcher, ParallelHashGridSearcher2, ParallelHashGridSearcher3,
};
pub use surfaces::{Plane, Primitive, PrimitiveSet, Sphere};
pub use types::{BoundingBox, Point, Point2, Point3, Ray};
