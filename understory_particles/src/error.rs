// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by particle system operations.

use thiserror::Error;

/// Invalid input to a [`ParticleSystemData`](crate::ParticleSystemData) operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParticleError {
    /// An optional per-particle array was non-empty but its length differs from
    /// the number of positions.
    #[error("{channel} has {actual} entries but {expected} positions were given")]
    LengthMismatch {
        /// Name of the offending array.
        channel: &'static str,
        /// Number of positions.
        expected: usize,
        /// Length of the offending array.
        actual: usize,
    },
}
