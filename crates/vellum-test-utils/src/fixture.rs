// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A file inside a private temporary directory, removed on drop.
#[derive(Debug)]
pub struct FileFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl FileFixture {
    /// Creates `fixture.bin` holding `content`.
    pub fn with_content(content: &[u8]) -> Self {
        let fixture = Self::missing();
        fs::write(&fixture.path, content).expect("Failed to write fixture");

        fixture
    }

    /// Creates a fixture of `len` bytes cycling through `0..=255`.
    pub fn with_pattern(len: usize) -> Self {
        let content: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();

        Self::with_content(&content)
    }

    /// Reserves a path whose file does not exist yet.
    pub fn missing() -> Self {
        let dir = tempfile::tempdir().expect("Failed to tempdir()");
        let path = dir.path().join("fixture.bin");

        Self { _dir: dir, path }
    }

    /// Path of the fixture file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file as it is on disk.
    pub fn read(&self) -> Vec<u8> {
        fs::read(&self.path).expect("Failed to read fixture")
    }

    /// Size of the file on disk.
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path)
            .expect("Failed to metadata()")
            .len()
    }
}
