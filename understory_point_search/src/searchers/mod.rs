// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Searcher implementations for different spatial strategies.
//!
//! - `naive`: flat list with linear scans (small, simple, reference results).
//! - `hash_grid`: uniform grid hash with one bucket vector per cell.
//! - `parallel_grid`: same grid semantics, built with a parallel sort into
//!   contiguous per-cell windows.
//! - `kdtree`: k-d tree with median splits and half-space pruning.
//!
//! Grid note
//! ---------
//! Both grid searchers only look at the cells overlapping the query interval on
//! each axis, limited to the origin's cell and its direct neighbors. That is
//! enough when the grid spacing is at least twice the query radius; with a
//! smaller spacing they can miss neighbors. The k-d tree and naive searchers have no
//! such constraint.

pub mod hash_grid;
pub mod kdtree;
pub mod naive;
pub mod parallel_grid;

pub use hash_grid::{HashGridSearcher, HashGridSearcher2, HashGridSearcher3};
pub use kdtree::{KdTreeSearcher, KdTreeSearcher2, KdTreeSearcher3};
pub use naive::{NaiveListSearcher, NaiveListSearcher2, NaiveListSearcher3};
pub use parallel_grid::{
    ParallelHashGridSearcher, ParallelHashGridSearcher2, ParallelHashGridSearcher3,
};
