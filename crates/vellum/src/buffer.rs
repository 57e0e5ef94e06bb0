// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! MappedBuffer - a growable byte string over a live mapping.
//!
//! Reads return owned copies. Borrowed views (`Lines`, `Bytes`, `Scan`) are
//! tied to `&self`, so the borrow checker rejects any edit or remap while
//! one is alive.

use core::ops::RangeBounds;
use std::path::Path;

use tracing::{debug, warn};

use vellum_region::{
    AccessMode, Advice, MapOptions, Protection, Region, RegionError, Sharing, SyncMode, page_size,
};

use crate::error::BufferError;
use crate::index::{Span, resolve_position, resolve_range, resolve_start_count};

/// Outcome of [`MappedBuffer::advise`].
#[derive(Debug)]
pub enum AdviceStatus {
    /// The OS accepted the hint.
    Applied,
    /// The OS rejected the hint. The buffer is unchanged.
    Ignored(RegionError),
}

impl AdviceStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A mutable byte string backed by a file or anonymous mapping.
pub struct MappedBuffer {
    pub(crate) region: Region,
}

impl MappedBuffer {
    /// Opens a buffer as described by `options`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::InvalidOption`] for malformed options.
    /// - [`BufferError::Resource`] if the file cannot be opened or mapped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vellum::{MapOptions, MappedBuffer};
    ///
    /// let mut buffer = MappedBuffer::open(&MapOptions::anonymous(5)).unwrap();
    /// buffer.replace_slice(0, 5, b"hello").unwrap();
    /// buffer.concat(b", world").unwrap();
    ///
    /// assert_eq!(buffer.to_vec().unwrap(), b"hello, world");
    /// ```
    pub fn open(options: &MapOptions) -> Result<Self, BufferError> {
        let region = Region::open(options)?;

        debug!(?region, "opened buffer");

        Ok(Self { region })
    }

    /// Opens `path` with a mode name (`"r"`, `"w"`, `"rw"`, `"a"`) and a
    /// shared mapping.
    ///
    /// # Errors
    ///
    /// Same as [`MappedBuffer::open`], plus [`BufferError::InvalidOption`]
    /// for an unknown mode name.
    pub fn open_path(path: impl AsRef<Path>, mode: &str) -> Result<Self, BufferError> {
        let mode: AccessMode = mode.parse()?;

        Self::open(&MapOptions::file(path.as_ref()).mode(mode))
    }

    /// Creates a growable zero-filled buffer of `len` bytes not backed by a file.
    ///
    /// # Errors
    ///
    /// Same as [`MappedBuffer::open`].
    pub fn anonymous(len: usize) -> Result<Self, BufferError> {
        Self::open(&MapOptions::anonymous(len))
    }

    pub(crate) fn content(&self) -> Result<&[u8], BufferError> {
        Ok(self.region.as_slice()?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the byte at `pos` (negative counts from the end).
    ///
    /// # Errors
    ///
    /// [`BufferError::Index`] if `pos` is outside `[-len, len)`.
    pub fn get(&self, pos: isize) -> Result<u8, BufferError> {
        let content = self.content()?;
        let index = resolve_position(pos, content.len())?;

        Ok(content[index])
    }

    /// Returns up to `count` bytes starting at `start`.
    ///
    /// # Errors
    ///
    /// [`BufferError::NegativeCount`] or [`BufferError::Index`].
    pub fn slice(&self, start: isize, count: isize) -> Result<Vec<u8>, BufferError> {
        let content = self.content()?;
        let span = resolve_start_count(start, count, content.len())?;

        Ok(content[span.start..span.end()].to_vec())
    }

    /// Returns the bytes selected by `range`.
    ///
    /// # Errors
    ///
    /// [`BufferError::Index`] if the range start is out of bounds.
    pub fn slice_range<R>(&self, range: R) -> Result<Vec<u8>, BufferError>
    where
        R: RangeBounds<isize>,
    {
        let content = self.content()?;
        let span = resolve_range(range, content.len())?;

        Ok(content[span.start..span.end()].to_vec())
    }

    /// Copies the whole content.
    pub fn to_vec(&self) -> Result<Vec<u8>, BufferError> {
        Ok(self.content()?.to_vec())
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// Grows the mapping (and the file) by `count` bytes without changing
    /// the length. Returns the new capacity.
    ///
    /// # Errors
    ///
    /// [`BufferError::FixedSize`] for fixed-size buffers.
    pub fn extend(&mut self, count: usize) -> Result<usize, BufferError> {
        Ok(self.region.extend(count)?)
    }

    // Grows capacity to at least `required`, with 1.5x geometric slack,
    // rounded up to the page size.
    pub(crate) fn reserve(&mut self, required: usize) -> Result<(), BufferError> {
        let capacity = self.region.capacity();

        if required <= capacity {
            return Ok(());
        }

        if self.region.is_fixed() {
            return Err(BufferError::FixedSize);
        }

        let target = required
            .max(capacity.saturating_add(capacity / 2))
            .checked_next_multiple_of(page_size())
            .ok_or_else(|| BufferError::InvalidOption("capacity overflow".into()))?;

        debug!(capacity, required, target, "growing buffer");
        self.region.remap(target)?;

        Ok(())
    }

    // Replaces `span` with `replacement`, moving the tail and growing as
    // needed. Nothing is written unless every check passes.
    pub(crate) fn splice(&mut self, span: Span, replacement: &[u8]) -> Result<(), BufferError> {
        self.region.ensure_writable()?;

        let len = self.region.len();
        debug_assert!(span.end() <= len);

        if replacement.len() != span.len && self.region.is_fixed() {
            return Err(BufferError::FixedSize);
        }

        let new_len = len - span.len + replacement.len();
        self.reserve(new_len)?;

        let bytes = self.region.as_mut_capacity()?;
        let new_end = span.start + replacement.len();

        bytes.copy_within(span.end()..len, new_end);
        bytes[span.start..new_end].copy_from_slice(replacement);

        self.region.set_len(new_len)?;

        Ok(())
    }

    // =========================================================================
    // Paging controls
    // =========================================================================

    /// Applies a paging hint. OS refusal is reported, not raised.
    ///
    /// # Errors
    ///
    /// [`BufferError::Terminated`] only.
    pub fn advise(&mut self, advice: Advice) -> Result<AdviceStatus, BufferError> {
        match self.region.advise(advice) {
            Ok(()) => Ok(AdviceStatus::Applied),
            Err(RegionError::Unmapped) => Err(BufferError::Terminated),
            Err(error) => {
                warn!(?advice, %error, "advice ignored");
                Ok(AdviceStatus::Ignored(error))
            }
        }
    }

    /// Changes page protection.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ReadOnly`] when requesting write on a frozen buffer.
    /// - [`BufferError::Resource`] if `mprotect` fails.
    pub fn reprotect(&mut self, protection: Protection) -> Result<(), BufferError> {
        Ok(self.region.protect(protection)?)
    }

    /// Changes page protection from a name such as `"read-only"`, `"r"`,
    /// `"w"`, `"rw"` or `"none"`.
    ///
    /// # Errors
    ///
    /// Same as [`MappedBuffer::reprotect`], plus
    /// [`BufferError::InvalidOption`] for an unknown name.
    pub fn reprotect_named(&mut self, name: &str) -> Result<(), BufferError> {
        let protection: Protection = name.parse()?;

        self.reprotect(protection)
    }

    /// Pins this buffer's pages. Calls nest.
    ///
    /// # Errors
    ///
    /// [`BufferError::Resource`] if `mlock` fails.
    pub fn lock(&mut self) -> Result<(), BufferError> {
        Ok(self.region.lock()?)
    }

    /// Releases one pin. A no-op when nothing is pinned.
    ///
    /// # Errors
    ///
    /// [`BufferError::Resource`] if `munlock` fails.
    pub fn unlock(&mut self) -> Result<(), BufferError> {
        Ok(self.region.unlock()?)
    }

    /// Writes dirty pages back and trims the file to the logical length.
    ///
    /// # Errors
    ///
    /// [`BufferError::Resource`] if `msync` or the compaction fails.
    pub fn sync(&mut self, mode: SyncMode) -> Result<(), BufferError> {
        Ok(self.region.sync(mode)?)
    }

    /// Synchronous [`MappedBuffer::sync`].
    pub fn flush(&mut self) -> Result<(), BufferError> {
        self.sync(SyncMode::Sync)
    }

    /// Makes the buffer permanently read-only.
    pub fn freeze(&mut self) -> Result<(), BufferError> {
        Ok(self.region.freeze()?)
    }

    /// Ends the mapping. Idempotent.
    ///
    /// # Errors
    ///
    /// The first OS failure while flushing, unpinning, unmapping or
    /// truncating; cleanup continues past it.
    pub fn terminate(&mut self) -> Result<(), BufferError> {
        Ok(self.region.terminate()?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Mapped capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    pub fn is_fixed(&self) -> bool {
        self.region.is_fixed()
    }

    pub fn is_frozen(&self) -> bool {
        self.region.is_frozen()
    }

    pub fn is_dirty(&self) -> bool {
        self.region.is_dirty()
    }

    pub fn is_terminated(&self) -> bool {
        !self.region.is_mapped()
    }

    pub fn lock_count(&self) -> usize {
        self.region.lock_count()
    }

    pub fn mode(&self) -> AccessMode {
        self.region.mode()
    }

    pub fn sharing(&self) -> Sharing {
        self.region.sharing()
    }

    pub fn protection(&self) -> Protection {
        self.region.protection()
    }

    pub fn advice(&self) -> Option<Advice> {
        self.region.advice()
    }

    /// Backing file, `None` for anonymous or terminated buffers.
    pub fn path(&self) -> Option<&Path> {
        self.region.path()
    }
}

impl core::fmt::Debug for MappedBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MappedBuffer")
            .field("region", &self.region)
            .finish()
    }
}
