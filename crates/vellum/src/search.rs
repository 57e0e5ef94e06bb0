// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Search over the live content. Results are owned copies.

use crate::buffer::MappedBuffer;
use crate::error::BufferError;
use crate::index::resolve_insert_position;
use crate::pattern::Matcher;

/// Lazy iterator over non-overlapping matches, see [`MappedBuffer::scan`].
#[derive(Debug)]
pub struct Scan<'a, M: ?Sized> {
    haystack: &'a [u8],
    pattern: &'a M,
    from: usize,
}

impl<M: Matcher + ?Sized> Iterator for Scan<'_, M> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.pattern.find_at(self.haystack, self.from)?;

        self.from = if found.is_empty() {
            found.end + 1
        } else {
            found.end
        };

        Some(self.haystack[found].to_vec())
    }
}

impl MappedBuffer {
    /// Position of the first match at or after `from` (default 0).
    ///
    /// A `from` outside `[-len, len]` finds nothing.
    pub fn index<M>(&self, pattern: &M, from: Option<isize>) -> Result<Option<usize>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        let haystack = self.content()?;

        let Ok(from) = resolve_insert_position(from.unwrap_or(0), haystack.len()) else {
            return Ok(None);
        };

        Ok(pattern.find_at(haystack, from).map(|found| found.start))
    }

    /// Position of the last match starting at or before `before`
    /// (default `len`).
    pub fn rindex<M>(&self, pattern: &M, before: Option<isize>) -> Result<Option<usize>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        let haystack = self.content()?;
        let len = haystack.len();

        let before = match before {
            None => len,
            Some(p) if p >= 0 => p.unsigned_abs().min(len),
            Some(p) => match resolve_insert_position(p, len) {
                Ok(before) => before,
                Err(_) => return Ok(None),
            },
        };

        Ok(pattern.rfind_at(haystack, before).map(|found| found.start))
    }

    /// Lazily yields every non-overlapping match, left to right.
    ///
    /// The iterator borrows the buffer; edits must wait until it is dropped.
    pub fn scan<'a, M>(&'a self, pattern: &'a M) -> Result<Scan<'a, M>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        Ok(Scan {
            haystack: self.content()?,
            pattern,
            from: 0,
        })
    }

    /// Splits on `pattern`.
    ///
    /// - `limit == 0`: split everywhere, drop trailing empty fields.
    /// - `limit > 0`: at most `limit` fields; the last holds the remainder.
    /// - `limit < 0`: split everywhere, keep trailing empty fields.
    ///
    /// An empty pattern splits between bytes. An empty buffer yields no fields.
    pub fn split<M>(&self, pattern: &M, limit: isize) -> Result<Vec<Vec<u8>>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        let haystack = self.content()?;
        let mut fields = Vec::new();

        if haystack.is_empty() {
            return Ok(fields);
        }

        let max_fields = usize::try_from(limit).ok().filter(|&limit| limit > 0);
        let mut field_start = 0;
        let mut from = 0;

        while max_fields.is_none_or(|max| fields.len() + 1 < max) {
            let Some(found) = pattern.find_at(haystack, from) else {
                break;
            };

            if found.is_empty() {
                if found.start >= haystack.len() {
                    break;
                }

                if found.start == field_start {
                    from = found.start + 1;
                    continue;
                }
            }

            fields.push(haystack[field_start..found.start].to_vec());
            field_start = found.end;
            from = found.end;
        }

        fields.push(haystack[field_start..].to_vec());

        if limit == 0 {
            while fields.last().is_some_and(Vec::is_empty) {
                fields.pop();
            }
        }

        Ok(fields)
    }

    /// Bytes of the first match.
    pub fn first_match<M>(&self, pattern: &M) -> Result<Option<Vec<u8>>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        let haystack = self.content()?;

        Ok(pattern
            .find_at(haystack, 0)
            .map(|found| haystack[found].to_vec()))
    }

    /// Position of the first match (`=~`).
    pub fn match_position<M>(&self, pattern: &M) -> Result<Option<usize>, BufferError>
    where
        M: Matcher + ?Sized,
    {
        self.index(pattern, None)
    }

    pub fn contains<M>(&self, pattern: &M) -> Result<bool, BufferError>
    where
        M: Matcher + ?Sized,
    {
        Ok(self.match_position(pattern)?.is_some())
    }
}
