// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Mode, sharing, protection and advice settings for a region.

use std::fs::OpenOptions;
use std::str::FromStr;

use crate::error::RegionError;

/// How the backing file is opened.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum AccessMode {
    /// Read-only. The region is frozen and can never become writable.
    #[default]
    Read,
    /// Creates the file, truncating existing content.
    Write,
    /// Opens an existing file for reading and writing.
    ReadWrite,
    /// Creates the file if missing and keeps existing content.
    Append,
}

impl AccessMode {
    /// Returns true for every mode except [`AccessMode::Read`].
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Read)
    }

    pub(crate) fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(true);

        match self {
            Self::Read => {}
            Self::Write => {
                options.write(true).create(true).truncate(true);
            }
            Self::ReadWrite => {
                options.write(true);
            }
            Self::Append => {
                options.write(true).create(true);
            }
        }

        options
    }

    pub(crate) fn protection(self) -> Protection {
        match self {
            Self::Read => Protection::Read,
            Self::Write | Self::ReadWrite | Self::Append => Protection::ReadWrite,
        }
    }
}

impl FromStr for AccessMode {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "rw" | "wr" => Ok(Self::ReadWrite),
            "a" => Ok(Self::Append),
            other => Err(RegionError::invalid(format!("invalid mode {other:?}"))),
        }
    }
}

/// Visibility of writes to other mappers of the same file.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Sharing {
    /// `MAP_SHARED`: writes reach the file and other processes.
    #[default]
    Shared,
    /// `MAP_PRIVATE`: copy-on-write, never visible to others.
    Private,
}

impl Sharing {
    pub(crate) fn as_raw(self) -> libc::c_int {
        match self {
            Self::Shared => libc::MAP_SHARED,
            Self::Private => libc::MAP_PRIVATE,
        }
    }
}

impl FromStr for Sharing {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(Self::Shared),
            "private" => Ok(Self::Private),
            other => Err(RegionError::invalid(format!("invalid sharing {other:?}"))),
        }
    }
}

/// Page protection applied with `mprotect`.
///
/// Write access implies read access at the OS level: every supported
/// platform maps `PROT_WRITE` as readable, so `Write` and `ReadWrite`
/// are applied identically.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Protection {
    /// `PROT_NONE`
    None,
    /// `PROT_READ`
    Read,
    /// `PROT_WRITE`
    Write,
    /// `PROT_READ | PROT_WRITE`
    ReadWrite,
}

impl Protection {
    /// Returns true if bytes may be read.
    pub fn allows_read(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns true if bytes may be written.
    pub fn allows_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    pub(crate) fn as_raw(self) -> libc::c_int {
        match self {
            Self::None => libc::PROT_NONE,
            Self::Read => libc::PROT_READ,
            Self::Write | Self::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        }
    }
}

impl FromStr for Protection {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "r" | "read" | "read-only" | "readonly" => Ok(Self::Read),
            "w" | "write" => Ok(Self::Write),
            "rw" | "wr" | "read-write" => Ok(Self::ReadWrite),
            other => Err(RegionError::invalid(format!("invalid protection {other:?}"))),
        }
    }
}

/// Paging hint applied with `madvise`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Advice {
    /// `MADV_NORMAL`
    Normal,
    /// `MADV_RANDOM`
    Random,
    /// `MADV_SEQUENTIAL`
    Sequential,
    /// `MADV_WILLNEED`
    WillNeed,
    /// `MADV_DONTNEED`
    DontNeed,
}

impl Advice {
    pub(crate) fn as_raw(self) -> libc::c_int {
        match self {
            Self::Normal => libc::MADV_NORMAL,
            Self::Random => libc::MADV_RANDOM,
            Self::Sequential => libc::MADV_SEQUENTIAL,
            Self::WillNeed => libc::MADV_WILLNEED,
            Self::DontNeed => libc::MADV_DONTNEED,
        }
    }
}

impl FromStr for Advice {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            "willneed" | "will-need" => Ok(Self::WillNeed),
            "dontneed" | "dont-need" => Ok(Self::DontNeed),
            other => Err(RegionError::invalid(format!("invalid advice {other:?}"))),
        }
    }
}

/// Flush behavior for `msync`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SyncMode {
    /// `MS_SYNC`: block until written.
    #[default]
    Sync,
    /// `MS_ASYNC`: schedule the write and return.
    Async,
    /// `MS_SYNC | MS_INVALIDATE`: block until written, then invalidate other
    /// mappings of the same file so they see fresh contents.
    Invalidate,
}

impl SyncMode {
    pub(crate) fn as_raw(self) -> libc::c_int {
        match self {
            Self::Sync => libc::MS_SYNC,
            Self::Async => libc::MS_ASYNC,
            Self::Invalidate => libc::MS_SYNC | libc::MS_INVALIDATE,
        }
    }
}
