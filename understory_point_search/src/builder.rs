// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend selection by name, and a factory producing boxed searchers.

use core::fmt;
use core::str::FromStr;

use crate::error::SearchError;
use crate::grid::GridResolution;
use crate::searcher::PointNeighborSearcher;
use crate::searchers::{
    HashGridSearcher, KdTreeSearcher, NaiveListSearcher, ParallelHashGridSearcher,
};
use crate::types::Point;

/// Available searcher backends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SearcherKind {
    /// [`HashGridSearcher`].
    HashGrid,
    /// [`ParallelHashGridSearcher`].
    #[default]
    ParallelHashGrid,
    /// [`KdTreeSearcher`].
    #[cfg_attr(feature = "serde", serde(rename = "kdtree"))]
    KdTree,
    /// [`NaiveListSearcher`].
    NaiveList,
}

impl SearcherKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::HashGrid,
        Self::ParallelHashGrid,
        Self::KdTree,
        Self::NaiveList,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::HashGrid => "hash-grid",
            Self::ParallelHashGrid => "parallel-hash-grid",
            Self::KdTree => "kdtree",
            Self::NaiveList => "naive-list",
        }
    }
}

impl fmt::Display for SearcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearcherKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SearchError::UnknownSearcherKind(s.to_owned()))
    }
}

/// Factory for boxed searchers.
///
/// Grid parameters are only used by the two hash grid kinds.
///
/// ```
/// use understory_point_search::{GridResolution, NeighborSearcherBuilder, Point3};
///
/// let mut searcher = NeighborSearcherBuilder::new()
///     .with_kind("kdtree".parse().unwrap())
///     .with_resolution(GridResolution::uniform(16))
///     .build::<Point3>();
/// searcher.build(&[Point3::new(0.0, 0.0, 0.0)]);
/// assert!(searcher.has_nearby_point(Point3::new(0.1, 0.0, 0.0), 0.2));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborSearcherBuilder {
    kind: SearcherKind,
    resolution: GridResolution,
    grid_spacing: f64,
}

impl Default for NeighborSearcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborSearcherBuilder {
    /// Parallel hash grid, default resolution, unit spacing.
    pub fn new() -> Self {
        Self {
            kind: SearcherKind::default(),
            resolution: GridResolution::default(),
            grid_spacing: 1.0,
        }
    }

    /// Select the backend.
    pub fn with_kind(mut self, kind: SearcherKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the grid resolution.
    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the grid cell size. Should be at least twice the largest query radius.
    pub fn with_grid_spacing(mut self, grid_spacing: f64) -> Self {
        self.grid_spacing = grid_spacing;
        self
    }

    /// Selected backend.
    pub fn kind(&self) -> SearcherKind {
        self.kind
    }

    /// Grid resolution.
    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    /// Grid cell size.
    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    /// Create an empty searcher of the selected kind.
    pub fn build<P: Point>(&self) -> Box<dyn PointNeighborSearcher<P>> {
        match self.kind {
            SearcherKind::HashGrid => {
                Box::new(HashGridSearcher::new(self.resolution, self.grid_spacing))
            }
            SearcherKind::ParallelHashGrid => Box::new(ParallelHashGridSearcher::new(
                self.resolution,
                self.grid_spacing,
            )),
            SearcherKind::KdTree => Box::new(KdTreeSearcher::new()),
            SearcherKind::NaiveList => Box::new(NaiveListSearcher::new()),
        }
    }

    /// Create a searcher of the selected kind and build it over `points`.
    pub fn build_with_points<P: Point>(&self, points: &[P]) -> Box<dyn PointNeighborSearcher<P>> {
        let mut searcher = self.build::<P>();
        searcher.build(points);
        searcher
    }
}
