// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Region - a variable-length byte region over one OS mapping.
//!
//! The region owns the mapping and the backing file. It tracks the logical
//! length separately from the mapped capacity, so callers can grow and
//! shrink content while the mapping itself is only replaced when capacity
//! has to change.
//!
//! # Remap Strategy
//!
//! - Shared file mappings: extend the file, map the new range, then unmap
//!   the old range. Both mappings alias the same page cache, so no copy
//!   is needed. On failure the file size is restored and the old mapping
//!   stays installed.
//! - Anonymous and private mappings: map fresh anonymous memory, copy the
//!   live bytes, then unmap the old range.
//!
//! Slices handed out by [`Region::as_slice`] and friends borrow the region,
//! so the borrow checker rules out any view surviving a remap.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::enums::{AccessMode, Advice, Protection, Sharing, SyncMode};
use crate::error::{RegionError, Syscall};
use crate::mapping::{Mapping, page_size};
use crate::options::MapOptions;

#[derive(Debug)]
struct Backing {
    file: File,
    path: PathBuf,
    offset: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
    Mapped,
    Unmapped,
}

/// A mapped byte region with a logical length and a mapped capacity.
pub struct Region {
    mapping: Option<Mapping>,
    // In-page offset of byte 0 inside `mapping` (non-zero only for fixed
    // regions opened at an unaligned offset).
    delta: usize,
    len: usize,
    capacity: usize,
    backing: Option<Backing>,
    mode: AccessMode,
    sharing: Sharing,
    protection: Protection,
    advice: Option<Advice>,
    lock_count: usize,
    dirty: bool,
    fixed: bool,
    frozen: bool,
    state: State,
}

// Safety: Region exclusively owns its mapping. Shared references only
// produce read-only slices; every mutation requires &mut.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Opens the source described by `options` and maps it.
    ///
    /// # Errors
    ///
    /// - [`RegionError::InvalidOption`] for malformed options.
    /// - [`RegionError::OutOfFile`] if `offset + length` exceeds the file.
    /// - [`RegionError::Os`] if the file cannot be opened or mapped.
    pub fn open(options: &MapOptions) -> Result<Self, RegionError> {
        options.validate()?;

        let mut region = match options.source() {
            Some(path) => Self::open_file(path, options)?,
            None => Self::open_anonymous(options)?,
        };

        if let Some(advice) = options.initial_advice() {
            if let Err(error) = region.advise(advice) {
                warn!(?advice, %error, "initial advice ignored");
            }
        }

        Ok(region)
    }

    fn open_file(path: &Path, options: &MapOptions) -> Result<Self, RegionError> {
        let mode = options.access_mode();
        let sharing = options.sharing_mode();
        let file = mode
            .open_options()
            .open(path)
            .map_err(|e| RegionError::io(Syscall::Open, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| RegionError::io(Syscall::Stat, e))?
            .len();

        let offset = options.requested_offset().unwrap_or(0);
        let length = match options.requested_length() {
            Some(length) => length,
            None => usize::try_from(file_size.saturating_sub(offset))
                .map_err(|_| RegionError::invalid("file too large to map"))?,
        };

        let end = offset.checked_add(length as u64);
        if end.is_none_or(|end| end > file_size) {
            return Err(RegionError::OutOfFile {
                offset,
                length,
                file_size,
            });
        }

        let page = page_size() as u64;
        let aligned = offset - offset % page;
        let delta = usize::try_from(offset - aligned)
            .map_err(|_| RegionError::invalid("offset delta overflow"))?;

        let protection = mode.protection();
        let mapping = if length == 0 {
            None
        } else {
            Some(Mapping::file(&file, delta + length, protection, sharing, aligned)?)
        };

        debug!(path = %path.display(), ?mode, ?sharing, length, offset, "mapped file region");

        Ok(Self {
            mapping,
            delta,
            len: length,
            capacity: length,
            backing: Some(Backing {
                file,
                path: path.to_path_buf(),
                offset,
            }),
            mode,
            sharing,
            protection,
            advice: None,
            lock_count: 0,
            dirty: false,
            fixed: options.is_fixed(),
            frozen: !mode.is_writable(),
            state: State::Mapped,
        })
    }

    fn open_anonymous(options: &MapOptions) -> Result<Self, RegionError> {
        let length = options
            .requested_length()
            .ok_or_else(|| RegionError::invalid("anonymous mapping requires a length"))?;
        let mode = options.access_mode();
        let sharing = options.sharing_mode();
        let protection = mode.protection();
        let mapping = Mapping::anonymous(length, protection, sharing)?;

        debug!(?sharing, length, "mapped anonymous region");

        Ok(Self {
            mapping: Some(mapping),
            delta: 0,
            len: length,
            capacity: length,
            backing: None,
            mode,
            sharing,
            protection,
            advice: None,
            lock_count: 0,
            dirty: false,
            fixed: false,
            frozen: false,
            state: State::Mapped,
        })
    }

    fn ensure_mapped(&self) -> Result<(), RegionError> {
        match self.state {
            State::Mapped => Ok(()),
            State::Unmapped => Err(RegionError::Unmapped),
        }
    }

    fn ensure_readable(&self) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if !self.protection.allows_read() {
            return Err(RegionError::Inaccessible);
        }

        Ok(())
    }

    /// Checks that the region is mapped and currently writable.
    ///
    /// # Errors
    ///
    /// [`RegionError::Unmapped`] or [`RegionError::ReadOnly`].
    pub fn ensure_writable(&self) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if self.frozen || !self.protection.allows_write() {
            return Err(RegionError::ReadOnly);
        }

        Ok(())
    }

    fn is_shared_file(&self) -> bool {
        self.backing.is_some() && self.sharing == Sharing::Shared
    }

    fn data_ptr(&self) -> Option<*mut u8> {
        self.mapping
            .as_ref()
            .map(|mapping| unsafe { mapping.as_ptr().add(self.delta) })
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Returns the live bytes `[0, len)`.
    ///
    /// # Errors
    ///
    /// [`RegionError::Unmapped`] or [`RegionError::Inaccessible`].
    pub fn as_slice(&self) -> Result<&[u8], RegionError> {
        self.ensure_readable()?;

        match self.data_ptr() {
            // SAFETY: `len <= capacity` and the mapping covers `delta + capacity` bytes.
            Some(ptr) => Ok(unsafe { core::slice::from_raw_parts(ptr, self.len) }),
            None => Ok(&[]),
        }
    }

    /// Returns the live bytes `[0, len)` for in-place writes. Marks the region dirty.
    ///
    /// # Errors
    ///
    /// [`RegionError::Unmapped`] or [`RegionError::ReadOnly`].
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8], RegionError> {
        let len = self.len;
        let slice = self.as_mut_capacity()?;

        Ok(&mut slice[..len])
    }

    /// Returns the whole mapped capacity `[0, capacity)`. Marks the region dirty.
    ///
    /// Bytes past `len` are slack: zero or stale content from earlier edits.
    ///
    /// # Errors
    ///
    /// [`RegionError::Unmapped`] or [`RegionError::ReadOnly`].
    pub fn as_mut_capacity(&mut self) -> Result<&mut [u8], RegionError> {
        self.ensure_writable()?;
        self.dirty = true;

        match self.data_ptr() {
            // SAFETY: the mapping covers `delta + capacity` writable bytes.
            Some(ptr) => Ok(unsafe { core::slice::from_raw_parts_mut(ptr, self.capacity) }),
            None => Ok(&mut []),
        }
    }

    /// Sets the logical length.
    ///
    /// # Errors
    ///
    /// [`RegionError::CapacityExceeded`] if `len > capacity`, or any error
    /// from [`Region::ensure_writable`].
    pub fn set_len(&mut self, len: usize) -> Result<(), RegionError> {
        self.ensure_writable()?;

        if len > self.capacity {
            return Err(RegionError::CapacityExceeded {
                len,
                capacity: self.capacity,
            });
        }

        self.len = len;
        self.dirty = true;

        Ok(())
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// Grows or shrinks the mapping to `new_capacity` bytes.
    ///
    /// Content in `[0, min(len, new_capacity))` is preserved and the
    /// logical length is truncated to `new_capacity`. Pinning, protection
    /// and advice carry over. On error the previous mapping is untouched.
    ///
    /// # Errors
    ///
    /// - [`RegionError::FixedSize`] for fixed regions.
    /// - [`RegionError::ReadOnly`] for frozen regions.
    /// - [`RegionError::Os`] if the file cannot be resized or the new
    ///   range cannot be mapped or pinned.
    pub fn remap(&mut self, new_capacity: usize) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if self.fixed {
            return Err(RegionError::FixedSize);
        }

        if self.frozen {
            return Err(RegionError::ReadOnly);
        }

        self.replace_mapping(new_capacity)
    }

    // Installs a mapping of `new_capacity` bytes. Callers own the fixed and
    // frozen checks; compaction of a frozen region goes through here directly.
    fn replace_mapping(&mut self, new_capacity: usize) -> Result<(), RegionError> {
        if new_capacity == self.capacity {
            return Ok(());
        }

        let old_capacity = self.capacity;
        let mapping = if self.is_shared_file() {
            self.map_shared_file(new_capacity)?
        } else {
            self.map_relocated(new_capacity)?
        };

        let old = core::mem::replace(&mut self.mapping, mapping);
        self.delta = 0;
        self.capacity = new_capacity;
        self.len = self.len.min(new_capacity);

        if let Some(old) = old {
            if let Err(error) = old.unmap() {
                warn!(%error, "failed to unmap previous mapping");
            }
        }

        if new_capacity < old_capacity && self.is_shared_file() {
            if let Err(error) = self.resize_file(new_capacity as u64, Syscall::Truncate) {
                warn!(%error, "failed to truncate backing file after shrink");
            }
        }

        if let Some(advice) = self.advice {
            if let Some(mapping) = &self.mapping {
                if let Err(error) = mapping.advise(advice) {
                    warn!(?advice, %error, "advice not reapplied after remap");
                }
            }
        }

        debug!(old_capacity, new_capacity, len = self.len, "remapped region");

        Ok(())
    }

    fn map_shared_file(&self, new_capacity: usize) -> Result<Option<Mapping>, RegionError> {
        let Some(backing) = &self.backing else {
            return Err(RegionError::Unmapped);
        };

        let grows = new_capacity > self.capacity;
        if grows {
            self.resize_file(new_capacity as u64, Syscall::Extend)?;
        }

        if new_capacity == 0 {
            return Ok(None);
        }

        let mapped = Mapping::file(
            &backing.file,
            new_capacity,
            self.protection,
            self.sharing,
            0,
        )
        .and_then(|mapping| self.pin_if_locked(mapping));

        match mapped {
            Ok(mapping) => Ok(Some(mapping)),
            Err(error) => {
                if grows {
                    let _ = self.resize_file(self.capacity as u64, Syscall::Truncate);
                }

                Err(error)
            }
        }
    }

    fn map_relocated(&self, new_capacity: usize) -> Result<Option<Mapping>, RegionError> {
        if new_capacity == 0 {
            return Ok(None);
        }

        if !self.protection.allows_read() {
            return Err(RegionError::Inaccessible);
        }

        let mapping = Mapping::anonymous(new_capacity, Protection::ReadWrite, self.sharing)?;
        let keep = self.len.min(new_capacity);

        if let Some(src) = self.data_ptr() {
            // SAFETY: both ranges are live mappings of at least `keep` bytes
            // and belong to distinct mmap calls, so they do not overlap.
            unsafe { core::ptr::copy_nonoverlapping(src, mapping.as_ptr(), keep) };
        }

        if self.protection != Protection::ReadWrite {
            mapping.protect(self.protection)?;
        }

        self.pin_if_locked(mapping).map(Some)
    }

    fn pin_if_locked(&self, mapping: Mapping) -> Result<Mapping, RegionError> {
        if self.lock_count > 0 {
            mapping.lock()?;
        }

        Ok(mapping)
    }

    fn resize_file(&self, size: u64, syscall: Syscall) -> Result<(), RegionError> {
        let Some(backing) = &self.backing else {
            return Ok(());
        };

        backing
            .file
            .set_len(backing.offset + size)
            .map_err(|e| RegionError::io(syscall, e))
    }

    /// Grows the mapping by `count` bytes, pre-extending the backing file.
    ///
    /// Returns the new capacity.
    ///
    /// # Errors
    ///
    /// Same as [`Region::remap`].
    pub fn extend(&mut self, count: usize) -> Result<usize, RegionError> {
        let new_capacity = self
            .capacity
            .checked_add(count)
            .ok_or_else(|| RegionError::invalid("capacity overflow"))?;

        self.remap(new_capacity)?;

        Ok(self.capacity)
    }

    // =========================================================================
    // Paging controls
    // =========================================================================

    /// Changes page protection.
    ///
    /// # Errors
    ///
    /// - [`RegionError::ReadOnly`] when requesting write on a frozen region.
    /// - [`RegionError::Os`] if `mprotect` fails.
    pub fn protect(&mut self, protection: Protection) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if protection.allows_write() && self.frozen {
            return Err(RegionError::ReadOnly);
        }

        if let Some(mapping) = &self.mapping {
            mapping.protect(protection)?;
        }

        debug!(from = ?self.protection, to = ?protection, "changed protection");
        self.protection = protection;

        Ok(())
    }

    /// Applies a paging hint.
    ///
    /// The advice is only recorded once the OS accepts it.
    ///
    /// # Errors
    ///
    /// [`RegionError::Os`] if `madvise` fails.
    pub fn advise(&mut self, advice: Advice) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if let Some(mapping) = &self.mapping {
            mapping.advise(advice)?;
        }

        self.advice = Some(advice);

        Ok(())
    }

    /// Pins the region's pages. Only the first call reaches `mlock`.
    ///
    /// # Errors
    ///
    /// [`RegionError::Os`] if `mlock` fails.
    pub fn lock(&mut self) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if self.lock_count == 0 {
            if let Some(mapping) = &self.mapping {
                mapping.lock()?;
            }

            debug!(capacity = self.capacity, "pinned region");
        }

        self.lock_count += 1;

        Ok(())
    }

    /// Releases one pin. Pages are unpinned when the count reaches zero.
    /// Unlocking an unpinned region is a no-op.
    ///
    /// # Errors
    ///
    /// [`RegionError::Os`] if `munlock` fails.
    pub fn unlock(&mut self) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        match self.lock_count {
            0 => {}
            1 => {
                if let Some(mapping) = &self.mapping {
                    mapping.unlock()?;
                }

                self.lock_count = 0;
                debug!("unpinned region");
            }
            _ => self.lock_count -= 1,
        }

        Ok(())
    }

    /// Writes dirty pages back to the file and compacts slack capacity.
    ///
    /// No-op for anonymous and private regions apart from clearing the
    /// dirty flag.
    ///
    /// # Errors
    ///
    /// [`RegionError::Os`] if `msync` or the compacting remap fails.
    pub fn sync(&mut self, mode: SyncMode) -> Result<(), RegionError> {
        self.ensure_mapped()?;

        if !self.is_shared_file() {
            self.dirty = false;
            return Ok(());
        }

        if let Some(mapping) = &self.mapping {
            mapping.sync(mode)?;
        }

        self.dirty = false;

        if !self.fixed && self.len < self.capacity {
            self.replace_mapping(self.len)?;
            self.dirty = false;
        }

        Ok(())
    }

    /// Makes the region permanently read-only.
    ///
    /// # Errors
    ///
    /// [`RegionError::Unmapped`].
    pub fn freeze(&mut self) -> Result<(), RegionError> {
        self.ensure_mapped()?;
        self.frozen = true;

        Ok(())
    }

    /// Ends the mapping.
    ///
    /// Flushes dirty shared writable regions, unpins, unmaps and truncates
    /// a growable shared file to the logical length. Every step runs even if
    /// an earlier one fails; the first error is returned. Calling it again
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// The first [`RegionError::Os`] encountered.
    pub fn terminate(&mut self) -> Result<(), RegionError> {
        if self.state == State::Unmapped {
            return Ok(());
        }

        let mut first_error = None;
        let shared_file = self.is_shared_file();

        if self.dirty && shared_file && self.protection.allows_write() {
            if let Some(Err(error)) = self.mapping.as_ref().map(|m| m.sync(SyncMode::Sync)) {
                first_error.get_or_insert(error);
            }
        }

        if self.lock_count > 0 {
            if let Some(Err(error)) = self.mapping.as_ref().map(Mapping::unlock) {
                first_error.get_or_insert(error);
            }

            self.lock_count = 0;
        }

        if let Some(mapping) = self.mapping.take() {
            if let Err(error) = mapping.unmap() {
                first_error.get_or_insert(error);
            }
        }

        if shared_file && !self.fixed && self.len < self.capacity {
            if let Err(error) = self.resize_file(self.len as u64, Syscall::Truncate) {
                first_error.get_or_insert(error);
            }
        }

        debug!(len = self.len, path = ?self.path(), "terminated region");

        self.backing = None;
        self.state = State::Unmapped;
        self.dirty = false;

        first_error.map_or(Ok(()), Err)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mapped capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true until [`Region::terminate`] runs.
    pub fn is_mapped(&self) -> bool {
        self.state == State::Mapped
    }

    /// Returns true for regions opened with an explicit length or offset.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Returns true for regions opened read-only or frozen explicitly.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns true if writes happened since the last sync.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of outstanding [`Region::lock`] calls.
    pub fn lock_count(&self) -> usize {
        self.lock_count
    }

    /// Access mode used at open.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Sharing mode.
    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    /// Current protection.
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Last advice accepted by the OS.
    pub fn advice(&self) -> Option<Advice> {
        self.advice
    }

    /// Backing file path, `None` for anonymous or terminated regions.
    pub fn path(&self) -> Option<&Path> {
        self.backing.as_ref().map(|backing| backing.path.as_path())
    }

    /// Returns true for regions not backed by a file.
    pub fn is_anonymous(&self) -> bool {
        self.backing.is_none() && self.state == State::Mapped
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if let Err(error) = self.terminate() {
            warn!(%error, "failed to terminate region on drop");
        }
    }
}

impl core::fmt::Debug for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Region")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("path", &self.path())
            .field("sharing", &self.sharing)
            .field("protection", &self.protection)
            .field("fixed", &self.fixed)
            .field("frozen", &self.frozen)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
