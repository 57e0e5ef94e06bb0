// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! vellum_guard - Process-wide page pinning via mlockall and munlockall
//!
//! [`LockRegistry`] is the one piece of global state in Vellum. It pins
//! every current and/or future mapping of the process, independent of any
//! single buffer. It is not reference counted: one [`LockRegistry::shutdown`]
//! undoes any number of [`LockRegistry::initialize`] calls, and it does not
//! compose with per-buffer `lock()`/`unlock()` (a process-wide `munlockall`
//! also releases per-buffer pins).
//!
//! Concurrent callers are serialized with a spin lock: one thread performs
//! the syscall while the others wait for it to finish.

#![warn(missing_docs)]


mod error;

use core::ops::BitOr;
use core::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

pub use error::LockError;

/// Which pages `mlockall` pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockAllFlags(u8);

impl LockAllFlags {
    /// Pages mapped right now (`MCL_CURRENT`).
    pub const CURRENT: Self = Self(0b01);
    /// Pages mapped from now on (`MCL_FUTURE`).
    pub const FUTURE: Self = Self(0b10);
    /// Both current and future pages.
    pub const ALL: Self = Self(0b11);

    /// Returns true if `other` is fully contained in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[cfg(target_os = "linux")]
    fn as_raw(self) -> libc::c_int {
        let mut raw = 0;

        if self.contains(Self::CURRENT) {
            raw |= libc::MCL_CURRENT;
        }

        if self.contains(Self::FUTURE) {
            raw |= libc::MCL_FUTURE;
        }

        raw
    }
}

impl BitOr for LockAllFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Snapshot returned by [`LockRegistry::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    /// Whether `mlockall` is in effect.
    pub pinned: bool,
    /// Flags used by the `mlockall` in effect, if any.
    pub flags: Option<LockAllFlags>,
}

/// Registry state: nothing pinned
const STATE_UNPINNED: u8 = 0;
/// Registry state: a syscall is in flight on another thread
const STATE_IN_PROGRESS: u8 = 1;
/// Registry state: mlockall in effect
const STATE_PINNED: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(STATE_UNPINNED);
static FLAGS: AtomicU8 = AtomicU8::new(0);

/// Process-wide pin-all / unpin-all.
///
/// # Example
///
/// ```no_run
/// use vellum_guard::{LockAllFlags, LockRegistry};
///
/// let status = LockRegistry::initialize(LockAllFlags::CURRENT | LockAllFlags::FUTURE)
///     .expect("Failed to initialize(..)");
/// assert!(status.pinned);
///
/// LockRegistry::shutdown().expect("Failed to shutdown()");
/// assert!(!LockRegistry::status().pinned);
/// ```
#[derive(Debug)]
pub struct LockRegistry;

impl LockRegistry {
    /// Pins all pages selected by `flags`.
    ///
    /// A no-op returning the current status if the registry is already
    /// pinned, even with different flags.
    ///
    /// # Errors
    ///
    /// - [`LockError::EmptyFlags`] if `flags` selects nothing.
    /// - [`LockError::LockAll`] if the OS refuses (e.g. `RLIMIT_MEMLOCK`).
    /// - [`LockError::Unsupported`] outside Linux.
    pub fn initialize(flags: LockAllFlags) -> Result<LockStatus, LockError> {
        if flags.is_empty() {
            return Err(LockError::EmptyFlags);
        }

        loop {
            match STATE.compare_exchange(
                STATE_UNPINNED,
                STATE_IN_PROGRESS,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return match lock_all(flags) {
                        Ok(()) => {
                            FLAGS.store(flags.0, Ordering::Relaxed);
                            STATE.store(STATE_PINNED, Ordering::Release);
                            debug!(?flags, "pinned all pages");

                            Ok(Self::status())
                        }
                        Err(error) => {
                            STATE.store(STATE_UNPINNED, Ordering::Release);
                            Err(error)
                        }
                    };
                }
                Err(STATE_PINNED) => return Ok(Self::status()),
                Err(_) => wait_while_in_progress(),
            }
        }
    }

    /// Releases every pinned page in the process.
    ///
    /// A no-op if the registry is not pinned.
    ///
    /// # Errors
    ///
    /// - [`LockError::UnlockAll`] if the OS refuses.
    /// - [`LockError::Unsupported`] outside Linux.
    pub fn shutdown() -> Result<LockStatus, LockError> {
        loop {
            match STATE.compare_exchange(
                STATE_PINNED,
                STATE_IN_PROGRESS,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return match unlock_all() {
                        Ok(()) => {
                            FLAGS.store(0, Ordering::Relaxed);
                            STATE.store(STATE_UNPINNED, Ordering::Release);
                            debug!("unpinned all pages");

                            Ok(Self::status())
                        }
                        Err(error) => {
                            STATE.store(STATE_PINNED, Ordering::Release);
                            Err(error)
                        }
                    };
                }
                Err(STATE_UNPINNED) => return Ok(Self::status()),
                Err(_) => wait_while_in_progress(),
            }
        }
    }

    /// Returns the current registry status without side effects.
    ///
    /// Waits for an in-flight `initialize`/`shutdown` on another thread.
    pub fn status() -> LockStatus {
        loop {
            match STATE.load(Ordering::Acquire) {
                STATE_PINNED => {
                    return LockStatus {
                        pinned: true,
                        flags: Some(LockAllFlags(FLAGS.load(Ordering::Relaxed))),
                    };
                }
                STATE_UNPINNED => {
                    return LockStatus {
                        pinned: false,
                        flags: None,
                    };
                }
                _ => wait_while_in_progress(),
            }
        }
    }
}

#[cold]
#[inline(never)]
fn wait_while_in_progress() {
    while STATE.load(Ordering::Acquire) == STATE_IN_PROGRESS {
        core::hint::spin_loop();
    }
}

#[cfg(target_os = "linux")]
fn lock_all(flags: LockAllFlags) -> Result<(), LockError> {
    if unsafe { libc::mlockall(flags.as_raw()) } != 0 {
        return Err(LockError::LockAll(std::io::Error::last_os_error()));
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn lock_all(_flags: LockAllFlags) -> Result<(), LockError> {
    Err(LockError::Unsupported)
}

#[cfg(target_os = "linux")]
fn unlock_all() -> Result<(), LockError> {
    if unsafe { libc::munlockall() } != 0 {
        return Err(LockError::UnlockAll(std::io::Error::last_os_error()));
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn unlock_all() -> Result<(), LockError> {
    Err(LockError::Unsupported)
}
