// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Byte-wise comparison.
//!
//! Ordering is unsigned and lexicographic; a strict prefix sorts first.
//! The operator impls treat a terminated buffer as incomparable
//! (`partial_cmp` returns `None`, `eq` returns `false`), so `MappedBuffer`
//! is `PartialOrd` but not `Ord`.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

use crate::buffer::MappedBuffer;
use crate::error::BufferError;
use crate::pattern::Matcher;

impl MappedBuffer {
    pub fn try_cmp(&self, other: &[u8]) -> Result<Ordering, BufferError> {
        Ok(self.content()?.cmp(other))
    }

    pub fn try_eq(&self, other: &[u8]) -> Result<bool, BufferError> {
        Ok(self.content()? == other)
    }

    /// ASCII case-insensitive [`MappedBuffer::try_cmp`].
    pub fn casecmp(&self, other: &[u8]) -> Result<Ordering, BufferError> {
        let folded = |bytes: &[u8]| bytes.iter().map(u8::to_ascii_lowercase).collect::<Vec<_>>();

        Ok(folded(self.content()?).cmp(&folded(other)))
    }

    /// Returns true if the first match of `pattern` spans the whole content.
    pub fn matches_whole<M>(&self, pattern: &M) -> Result<bool, BufferError>
    where
        M: Matcher + ?Sized,
    {
        let content = self.content()?;

        Ok(pattern.find_at(content, 0) == Some(0..content.len()))
    }

    /// Sum of all bytes modulo `2^bits` (`bits` is capped at 64).
    pub fn checksum(&self, bits: u32) -> Result<u64, BufferError> {
        let sum = self
            .content()?
            .iter()
            .fold(0u64, |sum, &byte| sum.wrapping_add(u64::from(byte)));

        Ok(match bits {
            0 => 0,
            64.. => sum,
            bits => sum & ((1u64 << bits) - 1),
        })
    }

    /// Hash of the content. Equal contents hash equally within a process.
    pub fn content_hash(&self) -> Result<u64, BufferError> {
        let mut hasher = DefaultHasher::new();
        self.content()?.hash(&mut hasher);

        Ok(hasher.finish())
    }
}

impl PartialEq for MappedBuffer {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.content(), other.content()), (Ok(a), Ok(b)) if a == b)
    }
}

impl PartialEq<[u8]> for MappedBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialEq<&[u8]> for MappedBuffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for MappedBuffer {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.try_eq(other.as_slice()).unwrap_or(false)
    }
}

impl PartialEq<Vec<u8>> for MappedBuffer {
    fn eq(&self, other: &Vec<u8>) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialEq<str> for MappedBuffer {
    fn eq(&self, other: &str) -> bool {
        self.try_eq(other.as_bytes()).unwrap_or(false)
    }
}

impl PartialEq<&str> for MappedBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.try_eq(other.as_bytes()).unwrap_or(false)
    }
}

impl PartialOrd for MappedBuffer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.content().ok()?.cmp(other.content().ok()?))
    }
}

impl PartialOrd<[u8]> for MappedBuffer {
    fn partial_cmp(&self, other: &[u8]) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl PartialOrd<Vec<u8>> for MappedBuffer {
    fn partial_cmp(&self, other: &Vec<u8>) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl PartialOrd<str> for MappedBuffer {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        self.try_cmp(other.as_bytes()).ok()
    }
}
