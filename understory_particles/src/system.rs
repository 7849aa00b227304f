// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The particle attribute container.

use core::fmt;

use rayon::prelude::*;
use understory_point_search::{
    NeighborSearcherBuilder, Point, Point2, Point3, PointNeighborSearcher,
};

use crate::channel::{Channel, ScalarHandle, VectorHandle};
use crate::config::ParticleSystemConfig;
use crate::error::ParticleError;

/// Per-particle positions and attribute channels, plus a neighbor searcher and the
/// adjacency lists derived from it.
///
/// Every channel has exactly [`number_of_particles`](Self::number_of_particles)
/// entries at all times. Vector channels use the point type `P` as their value
/// type.
///
/// Slices returned by the accessors borrow the system, so they cannot outlive a
/// resize. Indices reported in [`neighbor_lists`](Self::neighbor_lists) are
/// particle indices at the time of the last
/// [`build_neighbor_searcher`](Self::build_neighbor_searcher).
#[derive(Clone)]
pub struct ParticleSystemData<P: Point> {
    config: ParticleSystemConfig,
    radius: f64,
    mass: f64,
    positions: Channel<P>,
    scalar_channels: Vec<Channel<f64>>,
    vector_channels: Vec<Channel<P>>,
    searcher: Box<dyn PointNeighborSearcher<P>>,
    neighbor_lists: Vec<Vec<usize>>,
}

fn zero<P: Point>() -> P {
    P::from_fn(|_| 0.0)
}

impl<P: Point> Default for ParticleSystemData<P> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<P: Point> ParticleSystemData<P> {
    /// Create `count` particles at the origin, using the default configuration.
    pub fn new(count: usize) -> Self {
        Self::with_config(count, ParticleSystemConfig::default())
    }

    /// Create `count` particles at the origin.
    ///
    /// The velocity and force channels are registered here, so
    /// [`VectorHandle::VELOCITY`] and [`VectorHandle::FORCE`] are always valid.
    /// The initial searcher is empty until the first
    /// [`build_neighbor_searcher`](Self::build_neighbor_searcher).
    pub fn with_config(count: usize, config: ParticleSystemConfig) -> Self {
        let radius = config.radius.max(0.0);
        let searcher = NeighborSearcherBuilder::new()
            .with_kind(config.searcher_kind)
            .with_resolution(config.resolution)
            .with_grid_spacing(2.0 * radius)
            .build::<P>();
        let mut system = Self {
            config,
            radius,
            mass: config.mass.max(0.0),
            positions: Channel::filled(zero(), 0),
            scalar_channels: Vec::new(),
            vector_channels: vec![Channel::filled(zero(), 0), Channel::filled(zero(), 0)],
            searcher,
            neighbor_lists: Vec::new(),
        };
        system.resize(count);
        system
    }

    /// The configuration this system was created with.
    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// Number of particles.
    pub fn number_of_particles(&self) -> usize {
        self.positions.as_slice().len()
    }

    /// Grow or shrink every channel to `count` particles.
    ///
    /// Grown slots take each channel's default. Shrinking truncates from the end;
    /// surviving particles keep their indices and values.
    pub fn resize(&mut self, count: usize) {
        log::trace!(
            "particle resize: {} -> {count}",
            self.number_of_particles()
        );
        self.positions.resize(count);
        for channel in &mut self.scalar_channels {
            channel.resize(count);
        }
        for channel in &mut self.vector_channels {
            channel.resize(count);
        }
    }

    /// Register a scalar channel filled with `initial`, which is also the value
    /// of slots created by later growth.
    pub fn add_scalar_data(&mut self, initial: f64) -> ScalarHandle {
        let handle = ScalarHandle(self.scalar_channels.len());
        self.scalar_channels
            .push(Channel::filled(initial, self.number_of_particles()));
        handle
    }

    /// Register a vector channel filled with `initial`, which is also the value
    /// of slots created by later growth.
    pub fn add_vector_data(&mut self, initial: P) -> VectorHandle {
        let handle = VectorHandle(self.vector_channels.len());
        self.vector_channels
            .push(Channel::filled(initial, self.number_of_particles()));
        handle
    }

    /// Number of scalar channels.
    pub fn number_of_scalar_data(&self) -> usize {
        self.scalar_channels.len()
    }

    /// Number of vector channels, including velocity and force.
    pub fn number_of_vector_data(&self) -> usize {
        self.vector_channels.len()
    }

    /// Particle radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the particle radius. Negative values clamp to zero.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    /// Particle mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the particle mass. Negative values clamp to zero.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(0.0);
    }

    /// Particle positions.
    pub fn positions(&self) -> &[P] {
        self.positions.as_slice()
    }

    /// Mutable particle positions.
    pub fn positions_mut(&mut self) -> &mut [P] {
        self.positions.as_mut_slice()
    }

    /// Particle velocities.
    pub fn velocities(&self) -> &[P] {
        self.vector_data_at(VectorHandle::VELOCITY)
    }

    /// Mutable particle velocities.
    pub fn velocities_mut(&mut self) -> &mut [P] {
        self.vector_data_at_mut(VectorHandle::VELOCITY)
    }

    /// Forces acting on each particle.
    pub fn forces(&self) -> &[P] {
        self.vector_data_at(VectorHandle::FORCE)
    }

    /// Mutable forces.
    pub fn forces_mut(&mut self) -> &mut [P] {
        self.vector_data_at_mut(VectorHandle::FORCE)
    }

    /// Values of a scalar channel.
    ///
    /// # Panics
    ///
    /// If `handle` was not issued by this system or a system it was cloned from.
    pub fn scalar_data_at(&self, handle: ScalarHandle) -> &[f64] {
        self.scalar_channels[handle.index()].as_slice()
    }

    /// Mutable values of a scalar channel. Panics like
    /// [`scalar_data_at`](Self::scalar_data_at).
    pub fn scalar_data_at_mut(&mut self, handle: ScalarHandle) -> &mut [f64] {
        self.scalar_channels[handle.index()].as_mut_slice()
    }

    /// Values of a vector channel.
    ///
    /// # Panics
    ///
    /// If `handle` was not issued by this system or a system it was cloned from.
    pub fn vector_data_at(&self, handle: VectorHandle) -> &[P] {
        self.vector_channels[handle.index()].as_slice()
    }

    /// Mutable values of a vector channel. Panics like
    /// [`vector_data_at`](Self::vector_data_at).
    pub fn vector_data_at_mut(&mut self, handle: VectorHandle) -> &mut [P] {
        self.vector_channels[handle.index()].as_mut_slice()
    }

    /// Append one particle. Other channels get their defaults.
    pub fn add_particle(&mut self, position: P, velocity: P, force: P) {
        let i = self.number_of_particles();
        self.resize(i + 1);
        self.positions.as_mut_slice()[i] = position;
        self.velocities_mut()[i] = velocity;
        self.forces_mut()[i] = force;
    }

    /// Append `positions.len()` particles.
    ///
    /// `velocities` and `forces` may be empty, in which case the new particles
    /// keep the channel default (zero). Only the appended tail is written.
    ///
    /// # Errors
    ///
    /// [`ParticleError::LengthMismatch`] if `velocities` or `forces` is non-empty
    /// with a length different from `positions`. The system is left unchanged.
    pub fn add_particles(
        &mut self,
        positions: &[P],
        velocities: &[P],
        forces: &[P],
    ) -> Result<(), ParticleError> {
        let expected = positions.len();
        for (channel, actual) in [("velocities", velocities.len()), ("forces", forces.len())] {
            if actual != 0 && actual != expected {
                log::warn!(
                    "add_particles rejected: {channel} has {actual} entries, expected {expected}"
                );
                return Err(ParticleError::LengthMismatch {
                    channel,
                    expected,
                    actual,
                });
            }
        }

        let old = self.number_of_particles();
        let new = old + expected;
        self.resize(new);
        self.positions.as_mut_slice()[old..].copy_from_slice(positions);
        if !velocities.is_empty() {
            self.velocities_mut()[old..].copy_from_slice(velocities);
        }
        if !forces.is_empty() {
            self.forces_mut()[old..].copy_from_slice(forces);
        }
        Ok(())
    }

    /// The current searcher.
    pub fn neighbor_searcher(&self) -> &dyn PointNeighborSearcher<P> {
        self.searcher.as_ref()
    }

    /// Replace the searcher. It is used as-is; call its `build` first, or follow
    /// with [`build_neighbor_searcher`](Self::build_neighbor_searcher).
    pub fn set_neighbor_searcher(&mut self, searcher: Box<dyn PointNeighborSearcher<P>>) {
        self.searcher = searcher;
    }

    /// Neighbor indices of each particle, from the last
    /// [`build_neighbor_lists`](Self::build_neighbor_lists).
    pub fn neighbor_lists(&self) -> &[Vec<usize>] {
        &self.neighbor_lists
    }

    /// Replace the searcher with a fresh one of the configured kind and build it
    /// over the current positions. Grid searchers use the configured resolution
    /// and a spacing of `2 * max_search_radius`.
    pub fn build_neighbor_searcher(&mut self, max_search_radius: f64) {
        self.searcher = NeighborSearcherBuilder::new()
            .with_kind(self.config.searcher_kind)
            .with_resolution(self.config.resolution)
            .with_grid_spacing(2.0 * max_search_radius)
            .build_with_points(self.positions.as_slice());
        log::debug!(
            "particle searcher rebuilt: {} over {} particles, radius {max_search_radius}",
            self.searcher.type_name(),
            self.number_of_particles()
        );
    }

    /// Recompute every particle's neighbor list by querying the current searcher.
    ///
    /// A list holds each index `j != i` whose point lies within `max_search_radius`
    /// of particle `i`. Order within a list is unspecified.
    pub fn build_neighbor_lists(&mut self, max_search_radius: f64) {
        let searcher = self.searcher.as_ref();
        self.neighbor_lists = self
            .positions
            .as_slice()
            .par_iter()
            .enumerate()
            .map(|(i, &origin)| {
                let mut list = Vec::new();
                searcher.for_each_nearby_point(origin, max_search_radius, &mut |j, _| {
                    if j != i {
                        list.push(j);
                    }
                });
                list
            })
            .collect();
        log::debug!(
            "neighbor lists built: {} particles, {} pairs",
            self.neighbor_lists.len(),
            self.neighbor_lists.iter().map(Vec::len).sum::<usize>()
        );
    }
}

impl<P: Point> fmt::Debug for ParticleSystemData<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSystemData")
            .field("particles", &self.number_of_particles())
            .field("radius", &self.radius)
            .field("mass", &self.mass)
            .field("scalar_channels", &self.scalar_channels.len())
            .field("vector_channels", &self.vector_channels.len())
            .field("searcher", &self.searcher.type_name())
            .finish_non_exhaustive()
    }
}

/// Particle system over 2D points.
pub type ParticleSystemData2 = ParticleSystemData<Point2>;

/// Particle system over 3D points.
pub type ParticleSystemData3 = ParticleSystemData<Point3>;
