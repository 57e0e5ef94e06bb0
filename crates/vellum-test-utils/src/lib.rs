// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for Vellum crates.
//!
//! - [`FileFixture`]: a temporary file with known content
//! - [`init_test_logging`]: tracing output for tests
//! - [`run_test_as_subprocess`] and the `block_*` helpers: run an ignored
//!   test in a child process under a seccomp filter
//!
//! ## License
//!
//! GPL-3.0-only

mod fixture;
mod logging;
mod subprocess;

pub use fixture::FileFixture;
pub use logging::init_test_logging;
pub use subprocess::run_test_as_subprocess;

#[cfg(target_os = "linux")]
pub use subprocess::{block_madvise, block_mlock, block_mlockall, block_mprotect, block_msync};
