// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

mod properties;

use crate::buffer::MappedBuffer;

/// Anonymous buffer holding `content`.
pub(crate) fn buffer_with(content: &[u8]) -> MappedBuffer {
    let mut buffer = MappedBuffer::anonymous(content.len().max(1)).expect("Failed to anonymous(..)");
    buffer
        .replace_range(.., content)
        .expect("Failed to replace_range(..)");

    buffer
}
