// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::cmp::Ordering;

use crate::buffer::MappedBuffer;
use crate::enumerate::Lines;
use crate::error::BufferError;

/// Fallible total order against byte strings.
pub trait Ordered {
    fn compare_bytes(&self, other: &[u8]) -> Result<Ordering, BufferError>;

    /// Returns true if `low <= self <= high`.
    fn between(&self, low: &[u8], high: &[u8]) -> Result<bool, BufferError> {
        Ok(self.compare_bytes(low)? != Ordering::Less
            && self.compare_bytes(high)? != Ordering::Greater)
    }

    /// Returns `self` clamped into `[low, high]` as an owned copy.
    fn clamp_bytes(&self, low: &[u8], high: &[u8]) -> Result<Option<Vec<u8>>, BufferError> {
        if self.compare_bytes(low)? == Ordering::Less {
            return Ok(Some(low.to_vec()));
        }

        if self.compare_bytes(high)? == Ordering::Greater {
            return Ok(Some(high.to_vec()));
        }

        Ok(None)
    }
}

/// Restartable traversal over records.
pub trait Sequenceable {
    type Item;
    type Iter<'a>: Iterator<Item = Self::Item>
    where
        Self: 'a;

    /// Starts a fresh traversal.
    fn sequence(&self) -> Result<Self::Iter<'_>, BufferError>;

    fn count_items(&self) -> Result<usize, BufferError> {
        Ok(self.sequence()?.count())
    }

    fn find_item<P>(&self, mut predicate: P) -> Result<Option<Self::Item>, BufferError>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Ok(self.sequence()?.find(|item| predicate(item)))
    }

    fn collect_items(&self) -> Result<Vec<Self::Item>, BufferError> {
        Ok(self.sequence()?.collect())
    }
}

impl Ordered for MappedBuffer {
    fn compare_bytes(&self, other: &[u8]) -> Result<Ordering, BufferError> {
        self.try_cmp(other)
    }
}

impl Sequenceable for MappedBuffer {
    type Item = Vec<u8>;
    type Iter<'a> = Lines<'a>;

    /// Newline-separated lines.
    fn sequence(&self) -> Result<Lines<'_>, BufferError> {
        self.lines(b"\n")
    }
}
