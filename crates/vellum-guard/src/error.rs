// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for vellum-guard.

use std::io;

use thiserror::Error;

/// Errors from [`LockRegistry`](crate::LockRegistry).
#[derive(Debug, Error)]
pub enum LockError {
    /// `mlockall(2)` failed. The registry stays unpinned.
    #[error("mlockall failed: {0}")]
    LockAll(#[source] io::Error),

    /// `munlockall(2)` failed. The registry stays pinned.
    #[error("munlockall failed: {0}")]
    UnlockAll(#[source] io::Error),

    /// Neither current nor future pages were requested.
    #[error("lock-all flags must select current or future pages")]
    EmptyFlags,

    /// The platform has no process-wide pinning.
    #[error("process-wide pinning is not supported on this platform")]
    Unsupported,
}
