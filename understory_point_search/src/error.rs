// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for searcher configuration.

use thiserror::Error;

/// Errors raised while configuring a searcher.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// A backend name did not match any [`SearcherKind`](crate::SearcherKind).
    #[error(
        "unknown searcher kind `{0}` (expected hash-grid, parallel-hash-grid, kdtree or naive-list)"
    )]
    UnknownSearcherKind(String),
}
