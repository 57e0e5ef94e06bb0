// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Position and range resolution against the current length.
//!
//! A negative position `p` counts from the end and resolves to `len + p`.
//! A position equal to `len` denotes "at the end": valid for inserts and as
//! the start of a range, invalid for single-byte access.

use core::ops::{Bound, RangeBounds};

use crate::error::BufferError;

/// A resolved `[start, start + len)` selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last selected byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn absolute(p: isize, len: usize) -> Option<usize> {
    if p < 0 {
        len.checked_sub(p.unsigned_abs())
    } else {
        Some(p.unsigned_abs())
    }
}

/// Resolves a single-byte position. Valid results lie in `[0, len)`.
///
/// # Errors
///
/// [`BufferError::Index`] if `p < -len` or `p >= len`.
pub fn resolve_position(p: isize, len: usize) -> Result<usize, BufferError> {
    absolute(p, len)
        .filter(|&index| index < len)
        .ok_or(BufferError::Index { index: p, len })
}

/// Resolves an insertion point. Valid results lie in `[0, len]`.
///
/// # Errors
///
/// [`BufferError::Index`] if `p < -len` or `p > len`.
pub fn resolve_insert_position(p: isize, len: usize) -> Result<usize, BufferError> {
    absolute(p, len)
        .filter(|&index| index <= len)
        .ok_or(BufferError::Index { index: p, len })
}

/// Resolves a `(start, count)` pair, clamping `count` to the end.
///
/// # Errors
///
/// - [`BufferError::NegativeCount`] if `count < 0`.
/// - [`BufferError::Index`] if `start` does not resolve into `[0, len]`.
pub fn resolve_start_count(start: isize, count: isize, len: usize) -> Result<Span, BufferError> {
    if count < 0 {
        return Err(BufferError::NegativeCount(count));
    }

    let start = resolve_insert_position(start, len)?;
    let count = count.unsigned_abs().min(len - start);

    Ok(Span::new(start, count))
}

/// Resolves any `RangeBounds<isize>` (`a..b`, `a..=b`, `a..`, `..b`, `..`).
///
/// Both ends follow the negative-position rule. The start must land in
/// `[0, len]`; the end is clamped to `[0, len]`. An end before the start
/// selects nothing.
///
/// # Errors
///
/// [`BufferError::Index`] if the start is out of bounds.
pub fn resolve_range<R>(range: R, len: usize) -> Result<Span, BufferError>
where
    R: RangeBounds<isize>,
{
    let start = match range.start_bound() {
        Bound::Included(&s) => resolve_insert_position(s, len)?,
        Bound::Excluded(&s) => {
            let index = resolve_insert_position(s, len)? + 1;
            if index > len {
                return Err(BufferError::Index { index: s, len });
            }
            index
        }
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&e) => clamp_end(e, len).map_or(0, |end| (end + 1).min(len)),
        Bound::Excluded(&e) => clamp_end(e, len).unwrap_or(0),
        Bound::Unbounded => len,
    };

    Ok(Span::new(start, end.saturating_sub(start)))
}

// `None` when the end falls before the start of the buffer.
fn clamp_end(e: isize, len: usize) -> Option<usize> {
    absolute(e, len).map(|end| end.min(len))
}
