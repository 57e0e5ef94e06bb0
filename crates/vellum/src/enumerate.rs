// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Lazy line and byte traversal.
//!
//! Each call starts a fresh traversal over the current content. The
//! iterators borrow the buffer, so it cannot change while one is alive.

use core::iter::{Copied, FusedIterator};
use core::slice;

use crate::buffer::MappedBuffer;
use crate::error::BufferError;
use crate::pattern::Matcher;

/// Lines ending in a separator, which is kept. The last line may lack it.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a [u8],
    separator: &'a [u8],
}

impl<'a> Lines<'a> {
    // Paragraph mode: a run of two or more newlines ends a record.
    // Leading newlines separate nothing and are skipped.
    fn next_paragraph(&mut self) -> Option<&'a [u8]> {
        let leading = self.rest.iter().take_while(|&&byte| byte == b'\n').count();
        self.rest = &self.rest[leading..];

        if self.rest.is_empty() {
            return None;
        }

        let end = match b"\n\n".find_at(self.rest, 0) {
            Some(found) => {
                let extra = self.rest[found.end..]
                    .iter()
                    .take_while(|&&byte| byte == b'\n')
                    .count();
                found.end + extra
            }
            None => self.rest.len(),
        };

        Some(self.take(end))
    }

    fn take(&mut self, end: usize) -> &'a [u8] {
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;

        line
    }
}

impl Iterator for Lines<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let line = if self.separator.is_empty() {
            self.next_paragraph()?
        } else {
            let end = self
                .separator
                .find_at(self.rest, 0)
                .map_or(self.rest.len(), |found| found.end);

            self.take(end)
        };

        Some(line.to_vec())
    }
}

impl FusedIterator for Lines<'_> {}

/// Bytes of the buffer, front to back.
#[derive(Debug, Clone)]
pub struct Bytes<'a>(Copied<slice::Iter<'a, u8>>);

impl Iterator for Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl DoubleEndedIterator for Bytes<'_> {
    fn next_back(&mut self) -> Option<u8> {
        self.0.next_back()
    }
}

impl ExactSizeIterator for Bytes<'_> {}

impl FusedIterator for Bytes<'_> {}

impl MappedBuffer {
    /// Lines split after each `separator`. An empty separator selects
    /// paragraph mode.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vellum::MappedBuffer;
    ///
    /// let mut buffer = MappedBuffer::anonymous(1).unwrap();
    /// buffer.replace_slice(0, 1, b"one\ntwo\nthree").unwrap();
    ///
    /// let lines: Vec<Vec<u8>> = buffer.lines(b"\n").unwrap().collect();
    /// assert_eq!(lines, [b"one\n".to_vec(), b"two\n".to_vec(), b"three".to_vec()]);
    /// ```
    pub fn lines<'a>(&'a self, separator: &'a [u8]) -> Result<Lines<'a>, BufferError> {
        Ok(Lines {
            rest: self.content()?,
            separator,
        })
    }

    pub fn bytes(&self) -> Result<Bytes<'_>, BufferError> {
        Ok(Bytes(self.content()?.iter().copied()))
    }
}
