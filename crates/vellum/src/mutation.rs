// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Length-changing edits.
//!
//! Every edit resolves its positions first, then goes through
//! `MappedBuffer::splice`, which grows the mapping if needed, moves the
//! tail and writes the replacement. A failed check leaves length and
//! content untouched.

use core::ops::{Range, RangeBounds};

use crate::buffer::MappedBuffer;
use crate::error::BufferError;
use crate::index::{Span, resolve_insert_position, resolve_position, resolve_range, resolve_start_count};
use crate::pattern::Matcher;

/// What a matched segment is replaced with.
pub enum Replacement<'a> {
    /// The bytes as given.
    Literal(&'a [u8]),
    /// Expanded per match by the matcher (`$1`, `${name}` for regexes).
    Template(&'a [u8]),
    /// Computed from the matched bytes.
    Computed(Box<dyn FnMut(&[u8]) -> Vec<u8> + 'a>),
}

impl<'a> Replacement<'a> {
    /// Wraps a closure as [`Replacement::Computed`].
    pub fn computed(f: impl FnMut(&[u8]) -> Vec<u8> + 'a) -> Self {
        Self::Computed(Box::new(f))
    }

    fn render<M: Matcher + ?Sized>(
        &mut self,
        matcher: &M,
        haystack: &[u8],
        found: Range<usize>,
        dst: &mut Vec<u8>,
    ) {
        match self {
            Self::Literal(bytes) => dst.extend_from_slice(bytes),
            Self::Template(template) => matcher.expand(haystack, found, template, dst),
            Self::Computed(f) => dst.extend_from_slice(&f(&haystack[found])),
        }
    }
}

impl<'a> From<&'a [u8]> for Replacement<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Literal(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Replacement<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Literal(bytes)
    }
}

impl<'a> From<&'a str> for Replacement<'a> {
    fn from(text: &'a str) -> Self {
        Self::Literal(text.as_bytes())
    }
}

impl core::fmt::Debug for Replacement<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Literal(bytes) => f.debug_tuple("Literal").field(bytes).finish(),
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Result of a substitution.
///
/// `count == 0` means nothing matched; `count > 0 && !changed` means every
/// match was replaced by identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Substitution {
    pub count: usize,
    pub changed: bool,
}

impl Substitution {
    pub fn matched(&self) -> bool {
        self.count > 0
    }
}

impl MappedBuffer {
    /// Overwrites the byte at `pos` in place.
    ///
    /// # Errors
    ///
    /// [`BufferError::ReadOnly`] or [`BufferError::Index`].
    pub fn set_byte(&mut self, pos: isize, byte: u8) -> Result<(), BufferError> {
        self.region.ensure_writable()?;

        let index = resolve_position(pos, self.len())?;
        self.region.as_mut_slice()?[index] = byte;

        Ok(())
    }

    /// Replaces up to `count` bytes at `start` with `bytes`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ReadOnly`] / [`BufferError::Terminated`].
    /// - [`BufferError::NegativeCount`] or [`BufferError::Index`].
    /// - [`BufferError::FixedSize`] if the length would change.
    pub fn replace_slice(&mut self, start: isize, count: isize, bytes: &[u8]) -> Result<(), BufferError> {
        self.region.ensure_writable()?;

        let span = resolve_start_count(start, count, self.len())?;
        self.splice(span, bytes)
    }

    /// Replaces the bytes selected by `range` with `bytes`.
    ///
    /// # Errors
    ///
    /// Same as [`MappedBuffer::replace_slice`].
    pub fn replace_range<R>(&mut self, range: R, bytes: &[u8]) -> Result<(), BufferError>
    where
        R: RangeBounds<isize>,
    {
        self.region.ensure_writable()?;

        let span = resolve_range(range, self.len())?;
        self.splice(span, bytes)
    }

    /// Replaces the single byte at `pos` with `bytes`.
    pub fn replace_at(&mut self, pos: isize, bytes: &[u8]) -> Result<(), BufferError> {
        self.region.ensure_writable()?;

        let index = resolve_position(pos, self.len())?;
        self.splice(Span::new(index, 1), bytes)
    }

    /// Replaces the first occurrence of `pattern` with `bytes`.
    ///
    /// # Errors
    ///
    /// [`BufferError::NoMatch`] if `pattern` does not occur.
    pub fn replace_first<M>(&mut self, pattern: &M, bytes: &[u8]) -> Result<(), BufferError>
    where
        M: Matcher + ?Sized,
    {
        self.region.ensure_writable()?;

        let found = pattern
            .find_at(self.content()?, 0)
            .ok_or(BufferError::NoMatch)?;

        self.splice(Span::new(found.start, found.len()), bytes)
    }

    /// Inserts `bytes` before `pos`; `pos == len` appends.
    ///
    /// # Errors
    ///
    /// [`BufferError::Index`] if `pos` is outside `[-len, len]`.
    pub fn insert(&mut self, pos: isize, bytes: &[u8]) -> Result<(), BufferError> {
        self.region.ensure_writable()?;

        let index = resolve_insert_position(pos, self.len())?;
        self.splice(Span::new(index, 0), bytes)
    }

    /// Appends one byte.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.concat(&[byte])
    }

    /// Appends `bytes`.
    pub fn concat(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        let len = self.len();
        self.splice(Span::new(len, 0), bytes)
    }

    /// Removes up to `count` bytes at `start` and returns them.
    pub fn delete_slice(&mut self, start: isize, count: isize) -> Result<Vec<u8>, BufferError> {
        self.region.ensure_writable()?;

        let span = resolve_start_count(start, count, self.len())?;
        self.take_span(span)
    }

    /// Removes the bytes selected by `range` and returns them.
    pub fn delete_range<R>(&mut self, range: R) -> Result<Vec<u8>, BufferError>
    where
        R: RangeBounds<isize>,
    {
        self.region.ensure_writable()?;

        let span = resolve_range(range, self.len())?;
        self.take_span(span)
    }

    /// Removes and returns the byte at `pos`.
    pub fn remove(&mut self, pos: isize) -> Result<u8, BufferError> {
        self.region.ensure_writable()?;

        let index = resolve_position(pos, self.len())?;
        let byte = self.content()?[index];
        self.splice(Span::new(index, 1), &[])?;

        Ok(byte)
    }

    fn take_span(&mut self, span: Span) -> Result<Vec<u8>, BufferError> {
        let removed = self.content()?[span.start..span.end()].to_vec();
        self.splice(span, &[])?;

        Ok(removed)
    }

    /// Shortens the buffer to `len` bytes. A no-op if already shorter.
    pub fn truncate(&mut self, len: usize) -> Result<(), BufferError> {
        let current = self.len();

        if len >= current {
            return self.region.ensure_writable().map_err(Into::into);
        }

        self.splice(Span::new(len, current - len), &[])
    }

    /// Removes all content. Capacity is kept until the next sync.
    pub fn clear(&mut self) -> Result<(), BufferError> {
        self.truncate(0)
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    /// Replaces the first match of `pattern`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ReadOnly`] / [`BufferError::Terminated`].
    /// - [`BufferError::FixedSize`] if the replacement changes the length.
    pub fn substitute<'r, M>(
        &mut self,
        pattern: &M,
        replacement: impl Into<Replacement<'r>>,
    ) -> Result<Substitution, BufferError>
    where
        M: Matcher + ?Sized,
    {
        self.substitute_n(pattern, replacement.into(), Some(1))
    }

    /// Replaces every non-overlapping match of `pattern`, left to right.
    ///
    /// Matches are found against the content as it was before the call.
    /// An empty match advances the search by one byte.
    ///
    /// # Errors
    ///
    /// Same as [`MappedBuffer::substitute`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use vellum::MappedBuffer;
    ///
    /// let mut buffer = MappedBuffer::anonymous(6).unwrap();
    /// buffer.replace_slice(0, 6, b"ababab").unwrap();
    ///
    /// let result = buffer.substitute_all("ab", "xyz").unwrap();
    ///
    /// assert_eq!(result.count, 3);
    /// assert_eq!(buffer.to_vec().unwrap(), b"xyzxyzxyz");
    /// ```
    pub fn substitute_all<'r, M>(
        &mut self,
        pattern: &M,
        replacement: impl Into<Replacement<'r>>,
    ) -> Result<Substitution, BufferError>
    where
        M: Matcher + ?Sized,
    {
        self.substitute_n(pattern, replacement.into(), None)
    }

    fn substitute_n<M>(
        &mut self,
        pattern: &M,
        mut replacement: Replacement<'_>,
        limit: Option<usize>,
    ) -> Result<Substitution, BufferError>
    where
        M: Matcher + ?Sized,
    {
        self.region.ensure_writable()?;

        let fixed = self.is_fixed();
        let haystack = self.content()?;
        let mut result = Substitution::default();
        let mut rewritten = Vec::new();
        let mut first_start = None;
        let mut copied_to = 0;
        let mut from = 0;

        while limit.is_none_or(|limit| result.count < limit) {
            let Some(found) = pattern.find_at(haystack, from) else {
                break;
            };

            let start = *first_start.get_or_insert(found.start);
            rewritten.extend_from_slice(&haystack[copied_to.max(start)..found.start]);

            let before = rewritten.len();
            replacement.render(pattern, haystack, found.clone(), &mut rewritten);
            let produced = &rewritten[before..];

            if fixed && produced.len() != found.len() {
                return Err(BufferError::FixedSize);
            }

            result.changed |= produced != &haystack[found.clone()];
            result.count += 1;
            copied_to = found.end;
            from = if found.is_empty() { found.end + 1 } else { found.end };
        }

        let Some(start) = first_start else {
            return Ok(result);
        };

        let len = haystack.len();
        rewritten.extend_from_slice(&haystack[copied_to..]);

        if result.changed {
            self.splice(Span::new(start, len - start), &rewritten)?;
        }

        Ok(result)
    }
}
