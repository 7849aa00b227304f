// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_particles --heading-base-level=0

//! Understory Particles: per-particle attribute arrays with pluggable neighbor search.
//!
//! [`ParticleSystemData`] owns particle positions, the reserved velocity and force
//! channels, any number of caller-registered scalar or vector channels, and one
//! [`PointNeighborSearcher`](understory_point_search::PointNeighborSearcher).
//! All channels grow and shrink in lockstep; new slots take the channel's default.
//!
//! A solver step typically looks like this:
//!
//! ```rust
//! use understory_particles::ParticleSystemData3;
//! use understory_point_search::Point3;
//!
//! let mut particles = ParticleSystemData3::new(0);
//! particles
//!     .add_particles(
//!         &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.01, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
//!         &[],
//!         &[],
//!     )
//!     .unwrap();
//!
//! // Move particles, then refresh adjacency.
//! let radius = 0.02;
//! particles.build_neighbor_searcher(radius);
//! particles.build_neighbor_lists(radius);
//!
//! assert_eq!(particles.neighbor_lists()[0], vec![1]);
//! assert!(particles.neighbor_lists()[2].is_empty());
//! ```
//!
//! The searcher backend and grid resolution come from [`ParticleSystemConfig`];
//! with the `serde` feature it can be loaded from any serde format, selecting the
//! backend by name (`"hash-grid"`, `"parallel-hash-grid"`, `"kdtree"`, `"naive-list"`).
//!
//! Neighbor lists are computed in parallel with rayon. They are a derived view:
//! each call to [`ParticleSystemData::build_neighbor_lists`] replaces them.

mod channel;
mod config;
mod error;
mod system;

pub use channel::{ScalarHandle, VectorHandle};
pub use config::ParticleSystemConfig;
pub use error::ParticleError;
pub use system::{ParticleSystemData, ParticleSystemData2, ParticleSystemData3};
