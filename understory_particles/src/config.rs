// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time settings for [`ParticleSystemData`](crate::ParticleSystemData).

use understory_point_search::{GridResolution, SearcherKind};

/// Settings threaded through [`ParticleSystemData::with_config`](crate::ParticleSystemData::with_config).
///
/// `resolution` and `searcher_kind` are used every time
/// [`build_neighbor_searcher`](crate::ParticleSystemData::build_neighbor_searcher)
/// replaces the searcher. `radius` and `mass` seed the per-particle constants and
/// are clamped to be non-negative.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParticleSystemConfig {
    /// Bucket counts for the grid searchers.
    pub resolution: GridResolution,
    /// Particle radius.
    pub radius: f64,
    /// Particle mass.
    pub mass: f64,
    /// Backend created by `build_neighbor_searcher`.
    pub searcher_kind: SearcherKind,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            resolution: GridResolution::default(),
            radius: 1e-3,
            mass: 1e-3,
            searcher_kind: SearcherKind::default(),
        }
    }
}

impl ParticleSystemConfig {
    /// Replace the grid resolution.
    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Replace the searcher backend.
    pub fn with_searcher_kind(mut self, kind: SearcherKind) -> Self {
        self.searcher_kind = kind;
        self
    }
}
