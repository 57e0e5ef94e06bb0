// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for vellum-region.

use std::fmt;
use std::io;

use thiserror::Error;

/// Operating system call behind a [`RegionError::Os`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Syscall {
    /// `open(2)` on the backing file.
    Open,
    /// `fstat(2)` on the backing file.
    Stat,
    /// `mmap(2)`.
    Mmap,
    /// `munmap(2)`.
    Munmap,
    /// `mprotect(2)`.
    Mprotect,
    /// `madvise(2)`.
    Madvise,
    /// `mlock(2)`.
    Mlock,
    /// `munlock(2)`.
    Munlock,
    /// `msync(2)`.
    Msync,
    /// `ftruncate(2)` growing the backing file.
    Extend,
    /// `ftruncate(2)` shrinking the backing file.
    Truncate,
}

impl fmt::Display for Syscall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Stat => "fstat",
            Self::Mmap => "mmap",
            Self::Munmap => "munmap",
            Self::Mprotect => "mprotect",
            Self::Madvise => "madvise",
            Self::Mlock => "mlock",
            Self::Munlock => "munlock",
            Self::Msync => "msync",
            Self::Extend => "ftruncate(extend)",
            Self::Truncate => "ftruncate(truncate)",
        };

        f.write_str(name)
    }
}

/// Errors from region operations.
#[derive(Debug, Error)]
pub enum RegionError {
    /// A syscall failed.
    #[error("{syscall} failed: {source}")]
    Os {
        /// The call that failed.
        syscall: Syscall,
        /// The OS error.
        #[source]
        source: io::Error,
    },

    /// The region was terminated.
    #[error("region is unmapped")]
    Unmapped,

    /// Write access requested on a read-only or frozen region.
    #[error("region is read-only")]
    ReadOnly,

    /// The current protection forbids reading the region.
    #[error("region is not accessible under its current protection")]
    Inaccessible,

    /// The region was mapped with an explicit length or offset.
    #[error("region has a fixed size")]
    FixedSize,

    /// A requested length exceeds the mapped capacity.
    #[error("length {len} exceeds capacity {capacity}")]
    CapacityExceeded {
        /// Requested length.
        len: usize,
        /// Current capacity.
        capacity: usize,
    },

    /// The requested window does not fit in the backing file.
    #[error("length {length} at offset {offset} exceeds file size {file_size}")]
    OutOfFile {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        length: usize,
        /// Size of the file when it was opened.
        file_size: u64,
    },

    /// Construction options are malformed.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl RegionError {
    pub(crate) fn io(syscall: Syscall, source: io::Error) -> Self {
        Self::Os { syscall, source }
    }

    pub(crate) fn last_os(syscall: Syscall) -> Self {
        Self::io(syscall, io::Error::last_os_error())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }

    /// Returns the failing syscall, if this is an OS error.
    pub fn syscall(&self) -> Option<Syscall> {
        match self {
            Self::Os { syscall, .. } => Some(*syscall),
            _ => None,
        }
    }
}
