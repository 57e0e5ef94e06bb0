// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Matcher - the narrow pattern interface used by search and substitution.
//!
//! Implemented for literal bytes (`[u8]`, `[u8; N]`, `Vec<u8>`, `str`,
//! `String`) and single bytes, both searched with `memchr`. With the `regex`
//! feature, also for `regex::bytes::Regex`.

use core::ops::Range;

use memchr::memmem;

/// Finds matches inside a byte haystack.
pub trait Matcher {
    /// Returns the leftmost match starting at or after `from`.
    ///
    /// Must return `None` when `from > haystack.len()`.
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>>;

    /// Returns the rightmost match starting at or before `before`.
    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        let mut last = None;
        let mut from = 0;

        while let Some(found) = self.find_at(haystack, from) {
            if found.start > before {
                break;
            }

            from = found.start + 1;
            last = Some(found);
        }

        last
    }

    /// Appends the expansion of `template` for the match `found` to `dst`.
    ///
    /// Literal matchers have no groups and append the template verbatim.
    fn expand(&self, haystack: &[u8], found: Range<usize>, template: &[u8], dst: &mut Vec<u8>) {
        let _ = (haystack, found);
        dst.extend_from_slice(template);
    }
}

impl Matcher for [u8] {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        let rest = haystack.get(from..)?;

        memmem::find(rest, self).map(|offset| from + offset..from + offset + self.len())
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        let end = haystack.len().min(before.saturating_add(self.len()));

        memmem::rfind(&haystack[..end], self).map(|start| start..start + self.len())
    }
}

impl<const N: usize> Matcher for [u8; N] {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        self.as_slice().find_at(haystack, from)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        self.as_slice().rfind_at(haystack, before)
    }
}

impl Matcher for Vec<u8> {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        self.as_slice().find_at(haystack, from)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        self.as_slice().rfind_at(haystack, before)
    }
}

impl Matcher for str {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        self.as_bytes().find_at(haystack, from)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        self.as_bytes().rfind_at(haystack, before)
    }
}

impl Matcher for String {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        self.as_bytes().find_at(haystack, from)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        self.as_bytes().rfind_at(haystack, before)
    }
}

impl Matcher for u8 {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        let rest = haystack.get(from..)?;

        memchr::memchr(*self, rest).map(|offset| from + offset..from + offset + 1)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        let end = haystack.len().min(before.saturating_add(1));

        memchr::memrchr(*self, &haystack[..end]).map(|start| start..start + 1)
    }
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        (**self).find_at(haystack, from)
    }

    fn rfind_at(&self, haystack: &[u8], before: usize) -> Option<Range<usize>> {
        (**self).rfind_at(haystack, before)
    }

    fn expand(&self, haystack: &[u8], found: Range<usize>, template: &[u8], dst: &mut Vec<u8>) {
        (**self).expand(haystack, found, template, dst);
    }
}

#[cfg(feature = "regex")]
impl Matcher for regex::bytes::Regex {
    fn find_at(&self, haystack: &[u8], from: usize) -> Option<Range<usize>> {
        if from > haystack.len() {
            return None;
        }

        regex::bytes::Regex::find_at(self, haystack, from).map(|found| found.range())
    }

    /// Expands `$1`, `${name}` and `$$` from the captures of `found`.
    fn expand(&self, haystack: &[u8], found: Range<usize>, template: &[u8], dst: &mut Vec<u8>) {
        match self.captures_at(haystack, found.start) {
            Some(captures) => captures.expand(template, dst),
            None => dst.extend_from_slice(template),
        }
    }
}
