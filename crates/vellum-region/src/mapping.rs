// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Mapping - one raw OS mapping with its control syscalls.
//!
//! Each syscall is exposed separately so `Region` can sequence them and
//! tests can fail them one at a time.

use std::fs::File;
use std::mem::ManuallyDrop;
use std::os::fd::AsRawFd;
use std::ptr::{self, NonNull};
use std::sync::OnceLock;

use crate::enums::{Advice, Protection, Sharing, SyncMode};
use crate::error::{RegionError, Syscall};

/// Returns the system page size.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        usize::try_from(size).unwrap_or(4096)
    })
}

/// A live `mmap` result. Unmapped on drop.
#[derive(Debug)]
pub(crate) struct Mapping {
    ptr: NonNull<u8>,
    len: usize,
}

impl Mapping {
    /// Maps `len` bytes of `file` starting at the page-aligned `offset`.
    pub(crate) fn file(
        file: &File,
        len: usize,
        protection: Protection,
        sharing: Sharing,
        offset: u64,
    ) -> Result<Self, RegionError> {
        let offset = libc::off_t::try_from(offset)
            .map_err(|_| RegionError::invalid("offset does not fit in off_t"))?;

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                protection.as_raw(),
                sharing.as_raw(),
                file.as_raw_fd(),
                offset,
            )
        };

        Self::from_raw(ptr, len)
    }

    /// Maps `len` zeroed bytes not backed by any file.
    pub(crate) fn anonymous(
        len: usize,
        protection: Protection,
        sharing: Sharing,
    ) -> Result<Self, RegionError> {
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                protection.as_raw(),
                sharing.as_raw() | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        Self::from_raw(ptr, len)
    }

    fn from_raw(ptr: *mut libc::c_void, len: usize) -> Result<Self, RegionError> {
        if ptr == libc::MAP_FAILED {
            return Err(RegionError::last_os(Syscall::Mmap));
        }

        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or_else(|| RegionError::last_os(Syscall::Mmap))?;

        Ok(Self { ptr, len })
    }

    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub(crate) fn protect(&self, protection: Protection) -> Result<(), RegionError> {
        let failed =
            unsafe { libc::mprotect(self.ptr.as_ptr().cast(), self.len, protection.as_raw()) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Mprotect));
        }

        Ok(())
    }

    pub(crate) fn advise(&self, advice: Advice) -> Result<(), RegionError> {
        let failed =
            unsafe { libc::madvise(self.ptr.as_ptr().cast(), self.len, advice.as_raw()) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Madvise));
        }

        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<(), RegionError> {
        let failed = unsafe { libc::mlock(self.ptr.as_ptr().cast_const().cast(), self.len) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Mlock));
        }

        Ok(())
    }

    pub(crate) fn unlock(&self) -> Result<(), RegionError> {
        let failed = unsafe { libc::munlock(self.ptr.as_ptr().cast_const().cast(), self.len) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Munlock));
        }

        Ok(())
    }

    pub(crate) fn sync(&self, mode: SyncMode) -> Result<(), RegionError> {
        let failed =
            unsafe { libc::msync(self.ptr.as_ptr().cast(), self.len, mode.as_raw()) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Msync));
        }

        Ok(())
    }

    /// Unmaps explicitly, reporting failure instead of ignoring it.
    pub(crate) fn unmap(self) -> Result<(), RegionError> {
        let this = ManuallyDrop::new(self);
        let failed = unsafe { libc::munmap(this.ptr.as_ptr().cast(), this.len) } != 0;

        if failed {
            return Err(RegionError::last_os(Syscall::Munmap));
        }

        Ok(())
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) };
    }
}
