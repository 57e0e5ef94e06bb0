// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Construction options for a [`Region`](crate::Region).

use std::path::{Path, PathBuf};

use crate::enums::{AccessMode, Advice, Sharing};
use crate::error::RegionError;

/// Builder describing how a region is mapped.
///
/// A file source with an explicit `length` or `offset` produces a
/// fixed-size region. For anonymous regions `length` is required and is
/// only the initial size.
///
/// ```
/// use vellum_region::{AccessMode, Advice, MapOptions, Sharing};
///
/// let options = MapOptions::file("data.bin")
///     .mode(AccessMode::ReadWrite)
///     .sharing(Sharing::Shared)
///     .advice(Advice::Sequential);
///
/// assert!(!options.is_fixed());
/// assert!(options.clone().length(16).is_fixed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    path: Option<PathBuf>,
    mode: AccessMode,
    sharing: Sharing,
    length: Option<usize>,
    offset: Option<u64>,
    advice: Option<Advice>,
}

impl MapOptions {
    /// Options for a read-only shared mapping of `path`.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Options for a private read-write anonymous mapping of `length` bytes.
    pub fn anonymous(length: usize) -> Self {
        Self {
            mode: AccessMode::ReadWrite,
            sharing: Sharing::Private,
            length: Some(length),
            ..Self::default()
        }
    }

    /// Sets the backing file.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the sharing mode.
    #[must_use]
    pub fn sharing(mut self, sharing: Sharing) -> Self {
        self.sharing = sharing;
        self
    }

    /// Maps exactly `length` bytes.
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Starts the mapping `offset` bytes into the file.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies `advice` once the region is mapped.
    #[must_use]
    pub fn advice(mut self, advice: Advice) -> Self {
        self.advice = Some(advice);
        self
    }

    /// Backing file, or `None` for an anonymous mapping.
    pub fn source(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Access mode.
    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    /// Sharing mode.
    pub fn sharing_mode(&self) -> Sharing {
        self.sharing
    }

    /// Requested length.
    pub fn requested_length(&self) -> Option<usize> {
        self.length
    }

    /// Requested offset.
    pub fn requested_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Initial advice.
    pub fn initial_advice(&self) -> Option<Advice> {
        self.advice
    }

    /// True when the options pin the region's size.
    pub fn is_fixed(&self) -> bool {
        self.path.is_some() && (self.length.is_some() || self.offset.is_some())
    }

    pub(crate) fn validate(&self) -> Result<(), RegionError> {
        if self.length == Some(0) {
            return Err(RegionError::invalid("length must be greater than zero"));
        }

        if self.path.is_some() {
            return Ok(());
        }

        if self.length.is_none() {
            return Err(RegionError::invalid("anonymous mapping requires a length"));
        }

        if self.offset.is_some() {
            return Err(RegionError::invalid("anonymous mapping cannot have an offset"));
        }

        if !self.mode.is_writable() {
            return Err(RegionError::invalid("anonymous mapping must be writable"));
        }

        Ok(())
    }
}
