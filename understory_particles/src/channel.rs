// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-particle attribute channels and the handles that address them.

/// Handle to a scalar channel returned by
/// [`ParticleSystemData::add_scalar_data`](crate::ParticleSystemData::add_scalar_data).
///
/// Handles are dense indices into the system's scalar channel list and stay valid
/// for the lifetime of that system (and its clones). Channels are never removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ScalarHandle(pub(crate) usize);

impl ScalarHandle {
    /// Position of this channel in registration order.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle to a vector channel returned by
/// [`ParticleSystemData::add_vector_data`](crate::ParticleSystemData::add_vector_data).
///
/// The first two vector channels exist from construction and hold velocities
/// and forces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VectorHandle(pub(crate) usize);

impl VectorHandle {
    /// Reserved velocity channel.
    pub const VELOCITY: Self = Self(0);
    /// Reserved force channel.
    pub const FORCE: Self = Self(1);

    /// Position of this channel in registration order.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A column of per-particle values plus the value new slots start with.
#[derive(Clone, Debug)]
pub(crate) struct Channel<T> {
    default: T,
    data: Vec<T>,
}

impl<T: Copy> Channel<T> {
    pub(crate) fn filled(default: T, len: usize) -> Self {
        Self {
            default,
            data: vec![default; len],
        }
    }

    /// Truncate or grow to `len`; grown slots take the channel default.
    pub(crate) fn resize(&mut self, len: usize) {
        self.data.resize(len, self.default);
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}
