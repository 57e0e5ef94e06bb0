// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Byte transforms: case folding, reversal, `tr`-style translation,
//! trimming, squeezing and deletion.
//!
//! Each transform reports whether it changed anything.

use crate::buffer::MappedBuffer;
use crate::error::BufferError;
use crate::index::Span;

const WHITESPACE: &[u8] = b" \t\n\x0b\x0c\r\0";

/// A `tr`-style byte set: literal bytes, `a-z` ranges, a leading `^`
/// negates, `\` escapes the next byte.
#[derive(Debug, Clone)]
pub struct ByteSet {
    sequence: Vec<u8>,
    negated: bool,
}

impl ByteSet {
    /// Parses a set description.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidOption`] for a range whose end sorts before its
    /// start, such as `z-a`.
    pub fn parse(spec: &[u8]) -> Result<Self, BufferError> {
        let (negated, body) = match spec {
            [b'^', rest @ ..] if !rest.is_empty() => (true, rest),
            _ => (false, spec),
        };

        let mut sequence = Vec::with_capacity(body.len());
        let mut i = 0;

        while i < body.len() {
            let (first, next) = match body[i] {
                b'\\' if i + 1 < body.len() => (body[i + 1], i + 2),
                byte => (byte, i + 1),
            };

            match body.get(next..next + 2) {
                Some([b'-', last]) if *last >= first => {
                    sequence.extend(first..=*last);
                    i = next + 2;
                }
                Some([b'-', last]) => {
                    return Err(BufferError::InvalidOption(format!(
                        "invalid range \"{}-{}\" in byte set",
                        first.escape_ascii(),
                        last.escape_ascii()
                    )));
                }
                _ => {
                    sequence.push(first);
                    i = next;
                }
            }
        }

        Ok(Self { sequence, negated })
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.sequence.contains(&byte) != self.negated
    }

    fn membership(&self) -> [bool; 256] {
        let mut table = [self.negated; 256];

        for &byte in &self.sequence {
            table[usize::from(byte)] = !self.negated;
        }

        table
    }
}

// Maps each byte through `from` -> `to`. `None` means unmapped.
fn translation_table(from: &ByteSet, to: &ByteSet) -> [Option<u8>; 256] {
    let mut table = [None; 256];
    let last = to.sequence.last().copied();

    if from.negated {
        let members = from.membership();
        for byte in 0..=u8::MAX {
            if members[usize::from(byte)] {
                table[usize::from(byte)] = last;
            }
        }
    } else {
        for (i, &byte) in from.sequence.iter().enumerate() {
            if table[usize::from(byte)].is_none() {
                table[usize::from(byte)] = to.sequence.get(i).copied().or(last);
            }
        }
    }

    table
}

impl MappedBuffer {
    fn map_in_place(&mut self, mut f: impl FnMut(usize, u8) -> u8) -> Result<bool, BufferError> {
        let bytes = self.region.as_mut_slice()?;
        let mut changed = false;

        for (i, byte) in bytes.iter_mut().enumerate() {
            let mapped = f(i, *byte);
            changed |= mapped != *byte;
            *byte = mapped;
        }

        Ok(changed)
    }

    // Replaces the whole content with `content`, splicing only from the
    // first differing byte.
    fn rewrite(&mut self, content: &[u8]) -> Result<bool, BufferError> {
        let current = self.content()?;
        let len = current.len();
        let common = current
            .iter()
            .zip(content)
            .take_while(|(a, b)| a == b)
            .count();

        if common == len && common == content.len() {
            return Ok(false);
        }

        self.splice(Span::new(common, len - common), &content[common..])?;

        Ok(true)
    }

    fn retain(&mut self, mut keep: impl FnMut(&[u8], usize) -> bool) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let current = self.content()?;
        let kept: Vec<u8> = (0..current.len())
            .filter(|&i| keep(current, i))
            .map(|i| current[i])
            .collect();

        self.rewrite(&kept)
    }

    // =========================================================================
    // Fixed-length transforms
    // =========================================================================

    pub fn upcase(&mut self) -> Result<bool, BufferError> {
        self.map_in_place(|_, byte| byte.to_ascii_uppercase())
    }

    pub fn downcase(&mut self) -> Result<bool, BufferError> {
        self.map_in_place(|_, byte| byte.to_ascii_lowercase())
    }

    /// Uppercases the first byte and lowercases the rest.
    pub fn capitalize(&mut self) -> Result<bool, BufferError> {
        self.map_in_place(|i, byte| match i {
            0 => byte.to_ascii_uppercase(),
            _ => byte.to_ascii_lowercase(),
        })
    }

    pub fn swapcase(&mut self) -> Result<bool, BufferError> {
        self.map_in_place(|_, byte| match byte {
            b'a'..=b'z' => byte.to_ascii_uppercase(),
            b'A'..=b'Z' => byte.to_ascii_lowercase(),
            _ => byte,
        })
    }

    pub fn reverse(&mut self) -> Result<bool, BufferError> {
        let bytes = self.region.as_mut_slice()?;
        let changed = bytes.iter().ne(bytes.iter().rev());
        bytes.reverse();

        Ok(changed)
    }

    /// Translates bytes in `from` to the byte at the same position in `to`
    /// (`tr`). A shorter `to` is padded with its last byte. An empty `to`
    /// deletes the bytes in `from`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidOption`] for a malformed set.
    pub fn translate(&mut self, from: &[u8], to: &[u8]) -> Result<bool, BufferError> {
        if to.is_empty() {
            return self.delete(from);
        }

        let table = translation_table(&ByteSet::parse(from)?, &ByteSet::parse(to)?);
        self.map_in_place(|_, byte| table[usize::from(byte)].unwrap_or(byte))
    }

    // =========================================================================
    // Length-changing transforms
    // =========================================================================

    /// Removes leading and trailing whitespace and NUL bytes.
    pub fn strip(&mut self) -> Result<bool, BufferError> {
        let right = self.rstrip()?;
        let left = self.lstrip()?;

        Ok(left || right)
    }

    pub fn lstrip(&mut self) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let leading = self
            .content()?
            .iter()
            .take_while(|byte| WHITESPACE.contains(byte))
            .count();

        if leading == 0 {
            return Ok(false);
        }

        self.splice(Span::new(0, leading), &[])?;

        Ok(true)
    }

    pub fn rstrip(&mut self) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let content = self.content()?;
        let kept = content
            .iter()
            .rposition(|byte| !WHITESPACE.contains(byte))
            .map_or(0, |last| last + 1);

        self.shorten_to(kept)
    }

    fn shorten_to(&mut self, len: usize) -> Result<bool, BufferError> {
        if len == self.len() {
            return Ok(false);
        }

        self.truncate(len)?;

        Ok(true)
    }

    /// Removes the last byte, or a trailing `\r\n` pair.
    pub fn chop(&mut self) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let content = self.content()?;
        let kept = match content {
            [] => 0,
            [rest @ .., b'\r', b'\n'] => rest.len(),
            [rest @ .., _] => rest.len(),
        };

        self.shorten_to(kept)
    }

    /// Removes a trailing record separator.
    ///
    /// - `None` or `Some(b"\n")`: one trailing `\r\n`, `\n` or `\r`.
    /// - `Some(b"")`: every trailing `\n` / `\r\n` (paragraph mode).
    /// - `Some(separator)`: `separator` if the content ends with it.
    pub fn chomp(&mut self, separator: Option<&[u8]>) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let content = self.content()?;
        let mut kept = content.len();

        match separator {
            None | Some(b"\n") => {
                if content.ends_with(b"\r\n") {
                    kept -= 2;
                } else if content.ends_with(b"\n") || content.ends_with(b"\r") {
                    kept -= 1;
                }
            }
            Some([]) => {
                while content[..kept].ends_with(b"\n") {
                    kept -= 1;
                    if content[..kept].ends_with(b"\r") {
                        kept -= 1;
                    }
                }
            }
            Some(separator) => {
                if content.ends_with(separator) {
                    kept -= separator.len();
                }
            }
        }

        self.shorten_to(kept)
    }

    /// Collapses runs of identical bytes to one byte. With a set, only runs
    /// of bytes in the set collapse.
    pub fn squeeze(&mut self, set: Option<&[u8]>) -> Result<bool, BufferError> {
        let members = set
            .map(ByteSet::parse)
            .transpose()?
            .map(|set| set.membership());

        self.retain(|content, i| {
            let byte = content[i];
            let squeezable = members.is_none_or(|members| members[usize::from(byte)]);

            !(i > 0 && content[i - 1] == byte && squeezable)
        })
    }

    /// Removes every byte in `set`.
    pub fn delete(&mut self, set: &[u8]) -> Result<bool, BufferError> {
        let members = ByteSet::parse(set)?.membership();

        self.retain(|content, i| !members[usize::from(content[i])])
    }

    /// Translates like [`MappedBuffer::translate`], then collapses runs of
    /// identical translated bytes (`tr_s`).
    pub fn translate_squeeze(&mut self, from: &[u8], to: &[u8]) -> Result<bool, BufferError> {
        self.region.ensure_writable()?;

        let from = ByteSet::parse(from)?;
        let to = ByteSet::parse(to)?;
        let table = translation_table(&from, &to);
        let members = from.membership();

        let content = self.content()?;
        let mut output = Vec::with_capacity(content.len());
        let mut last_translated = None;

        for &byte in content {
            if !members[usize::from(byte)] {
                output.push(byte);
                last_translated = None;
                continue;
            }

            let Some(mapped) = table[usize::from(byte)] else {
                last_translated = None;
                continue;
            };

            if last_translated != Some(mapped) {
                output.push(mapped);
            }

            last_translated = Some(mapped);
        }

        self.rewrite(&output)
    }
}
