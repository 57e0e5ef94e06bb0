// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! vellum - a mutable byte string backed by a memory mapping
//!
//! [`MappedBuffer`] behaves like a growable, indexable, searchable string
//! whose storage is a live `mmap` of a file (or anonymous memory). Edits
//! that change the length grow the mapping, and the file behind it, on
//! demand; `sync` and `terminate` trim the file back to the logical length.
//!
//! # Indexing
//!
//! Positions are `isize`. A negative position counts from the end. A
//! position equal to the length means "at the end" (valid for inserts and
//! range starts). `(start, count)` pairs clamp `count`; ranges clamp their
//! end. See [`index`].
//!
//! # Views
//!
//! Every read returns an owned copy. The lazy iterators ([`Lines`],
//! [`Bytes`], [`Scan`]) borrow the buffer, so no edit can remap the
//! storage under them.
//!
//! # Example
//!
//! ```rust
//! use vellum::{MappedBuffer, Protection};
//!
//! let mut buffer = MappedBuffer::anonymous(11).unwrap();
//! buffer.replace_slice(0, 11, b"hello world").unwrap();
//!
//! buffer.replace_range(0..5, b"goodbye").unwrap();
//! assert_eq!(buffer.slice(-5, 5).unwrap(), b"world");
//! assert_eq!(buffer.index("world", None).unwrap(), Some(8));
//!
//! buffer.reprotect(Protection::Read).unwrap();
//! assert!(buffer.push(b'!').is_err());
//! ```
//!
//! ## License
//!
//! GPL-3.0-only

#[cfg(test)]
mod tests;

mod buffer;
mod compare;
mod enumerate;
mod error;
mod mutation;
mod pattern;
mod search;
mod traits;
mod transform;

pub mod index;

pub use buffer::{AdviceStatus, MappedBuffer};
pub use enumerate::{Bytes, Lines};
pub use error::{BufferError, ErrorKind};
pub use index::Span;
pub use mutation::{Replacement, Substitution};
pub use pattern::Matcher;
pub use search::Scan;
pub use traits::{Ordered, Sequenceable};
pub use transform::ByteSet;

pub use vellum_guard::{LockAllFlags, LockError, LockRegistry, LockStatus};
pub use vellum_region::{
    AccessMode, Advice, MapOptions, Protection, RegionError, Sharing, SyncMode, page_size,
};
