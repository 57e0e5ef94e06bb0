// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for vellum.

use thiserror::Error;

use vellum_region::RegionError;

/// Coarse classification of a [`BufferError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A position or range lies outside the buffer.
    Index,
    /// A range is malformed (e.g. negative count).
    Range,
    /// A length change was attempted on a fixed-size buffer.
    Size,
    /// The operation is invalid in the buffer's current state.
    State,
    /// The operating system refused a request.
    Resource,
    /// Construction options are malformed.
    Option,
}

/// Errors from [`MappedBuffer`](crate::MappedBuffer) operations.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("index {index} out of bounds for length {len}")]
    Index { index: isize, len: usize },

    #[error("pattern not found")]
    NoMatch,

    #[error("negative count {0}")]
    NegativeCount(isize),

    #[error("cannot change the size of a fixed-size buffer")]
    FixedSize,

    #[error("buffer is read-only")]
    ReadOnly,

    #[error("buffer is not readable under its current protection")]
    Inaccessible,

    #[error("buffer is terminated")]
    Terminated,

    #[error("{0}")]
    Resource(#[source] RegionError),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl BufferError {
    /// Returns the error's classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Index { .. } | Self::NoMatch => ErrorKind::Index,
            Self::NegativeCount(_) => ErrorKind::Range,
            Self::FixedSize => ErrorKind::Size,
            Self::ReadOnly | Self::Inaccessible | Self::Terminated => ErrorKind::State,
            Self::Resource(_) => ErrorKind::Resource,
            Self::InvalidOption(_) => ErrorKind::Option,
        }
    }
}

impl From<RegionError> for BufferError {
    fn from(error: RegionError) -> Self {
        match error {
            RegionError::Unmapped => Self::Terminated,
            RegionError::ReadOnly => Self::ReadOnly,
            RegionError::Inaccessible => Self::Inaccessible,
            RegionError::FixedSize => Self::FixedSize,
            RegionError::InvalidOption(message) => Self::InvalidOption(message),
            out_of_file @ RegionError::OutOfFile { .. } => {
                Self::InvalidOption(out_of_file.to_string())
            }
            other => Self::Resource(other),
        }
    }
}
