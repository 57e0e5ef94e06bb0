// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Growable memory-mapped regions.
//!
//! A [`Region`] owns exactly one OS mapping (file-backed or anonymous) and
//! exposes it as a byte range with a logical length and a mapped capacity.
//! Capacity changes go through [`Region::remap`], which either installs a
//! new mapping or leaves the old one untouched.
//!
//! # Controls
//!
//! - `mprotect` via [`Region::protect`]
//! - `madvise` via [`Region::advise`]
//! - `mlock` / `munlock` via [`Region::lock`] / [`Region::unlock`] (counted)
//! - `msync` via [`Region::sync`]
//! - `munmap` via [`Region::terminate`] (idempotent, also run on drop)
//!
//! # Example
//!
//! ```rust
//! use vellum_region::{MapOptions, Region, RegionError};
//!
//! fn example() -> Result<(), RegionError> {
//!     let mut region = Region::open(&MapOptions::anonymous(4))?;
//!
//!     region.as_mut_slice()?.copy_from_slice(b"abcd");
//!     region.remap(8)?;
//!
//!     assert_eq!(region.as_slice()?, b"abcd");
//!     assert_eq!(region.capacity(), 8);
//!
//!     region.terminate()?;
//!     assert!(region.as_slice().is_err());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![cfg(unix)]

#[cfg(test)]
mod tests;

mod enums;
mod error;
mod mapping;
mod options;
mod region;

pub use enums::{AccessMode, Advice, Protection, Sharing, SyncMode};
pub use error::{RegionError, Syscall};
pub use mapping::page_size;
pub use options::MapOptions;
pub use region::Region;
