// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for Region.

use serial_test::serial;
use vellum_test_utils::{FileFixture, init_test_logging};

use crate::enums::{AccessMode, Advice, Protection, Sharing, SyncMode};
use crate::error::{RegionError, Syscall};
use crate::mapping::page_size;
use crate::options::MapOptions;
use crate::region::Region;

fn open_rw(fixture: &FileFixture) -> Region {
    init_test_logging();
    Region::open(&MapOptions::file(fixture.path()).mode(AccessMode::ReadWrite))
        .expect("Failed to open(..)")
}

// =============================================================================
// open()
// =============================================================================

#[test]
#[serial(region)]
fn test_open_maps_whole_file() {
    let fixture = FileFixture::with_content(b"hello mapped world");
    let region = open_rw(&fixture);

    assert_eq!(region.len(), 18);
    assert_eq!(region.capacity(), 18);
    assert_eq!(region.as_slice().unwrap(), b"hello mapped world");
    assert_eq!(region.path(), Some(fixture.path()));
    assert!(!region.is_fixed());
    assert!(!region.is_dirty());
}

#[test]
#[serial(region)]
fn test_open_missing_file_fails() {
    let fixture = FileFixture::missing();
    let result = Region::open(&MapOptions::file(fixture.path()).mode(AccessMode::ReadWrite));

    assert!(matches!(
        result,
        Err(RegionError::Os {
            syscall: Syscall::Open,
            ..
        })
    ));
}

#[test]
#[serial(region)]
fn test_open_read_mode_is_frozen() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = Region::open(&MapOptions::file(fixture.path())).expect("Failed to open(..)");

    assert!(region.is_frozen());
    assert_eq!(region.protection(), Protection::Read);
    assert!(matches!(region.as_mut_slice(), Err(RegionError::ReadOnly)));
    assert!(matches!(
        region.protect(Protection::ReadWrite),
        Err(RegionError::ReadOnly)
    ));
    assert!(matches!(region.remap(10), Err(RegionError::ReadOnly)));
}

#[test]
#[serial(region)]
fn test_open_write_mode_truncates() {
    let fixture = FileFixture::with_content(b"old content");
    let region = Region::open(&MapOptions::file(fixture.path()).mode(AccessMode::Write))
        .expect("Failed to open(..)");

    assert_eq!(region.len(), 0);
    assert_eq!(region.capacity(), 0);
    assert_eq!(region.as_slice().unwrap(), b"");
    assert_eq!(fixture.size(), 0);
}

#[test]
#[serial(region)]
fn test_open_append_mode_creates_missing_file() {
    let fixture = FileFixture::missing();
    let mut region = Region::open(&MapOptions::file(fixture.path()).mode(AccessMode::Append))
        .expect("Failed to open(..)");

    region.remap(3).expect("Failed to remap(..)");
    region.as_mut_capacity().unwrap().copy_from_slice(b"new");
    region.set_len(3).expect("Failed to set_len(..)");
    region.terminate().expect("Failed to terminate()");

    assert_eq!(fixture.read(), b"new");
}

#[test]
#[serial(region)]
fn test_open_anonymous_is_zeroed() {
    let region = Region::open(&MapOptions::anonymous(64)).expect("Failed to open(..)");

    assert!(region.is_anonymous());
    assert_eq!(region.len(), 64);
    assert!(region.as_slice().unwrap().iter().all(|&b| b == 0));
}

#[test]
#[serial(region)]
fn test_open_with_length_and_unaligned_offset() {
    let fixture = FileFixture::with_pattern(page_size() * 2);
    let offset = page_size() as u64 + 3;
    let region = Region::open(
        &MapOptions::file(fixture.path())
            .mode(AccessMode::ReadWrite)
            .offset(offset)
            .length(5),
    )
    .expect("Failed to open(..)");

    let expected: Vec<u8> = (0..5).map(|i| ((offset as usize + i) % 256) as u8).collect();

    assert!(region.is_fixed());
    assert_eq!(region.as_slice().unwrap(), expected.as_slice());
}

#[test]
#[serial(region)]
fn test_open_window_past_end_of_file_fails() {
    let fixture = FileFixture::with_content(b"0123456789");
    let result = Region::open(&MapOptions::file(fixture.path()).offset(4).length(7));

    assert!(matches!(
        result,
        Err(RegionError::OutOfFile {
            offset: 4,
            length: 7,
            file_size: 10
        })
    ));
}

#[test]
#[serial(region)]
fn test_open_applies_initial_advice() {
    let fixture = FileFixture::with_pattern(100);
    let region = Region::open(&MapOptions::file(fixture.path()).advice(Advice::Sequential))
        .expect("Failed to open(..)");

    assert_eq!(region.advice(), Some(Advice::Sequential));
}

#[test]
#[serial(region)]
fn test_open_fails_when_address_space_exhausted() {
    let mut original = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    unsafe { libc::getrlimit(libc::RLIMIT_AS, &mut original) };

    let tiny = libc::rlimit {
        rlim_cur: 0,
        rlim_max: original.rlim_max,
    };
    unsafe { libc::setrlimit(libc::RLIMIT_AS, &tiny) };

    let result = Region::open(&MapOptions::anonymous(1 << 20));

    unsafe { libc::setrlimit(libc::RLIMIT_AS, &original) };

    assert!(matches!(
        result,
        Err(RegionError::Os {
            syscall: Syscall::Mmap,
            ..
        })
    ));
}

// =============================================================================
// remap() / extend()
// =============================================================================

#[test]
#[serial(region)]
fn test_remap_grow_shared_file_extends_file() {
    let fixture = FileFixture::with_content(b"abcdef");
    let mut region = open_rw(&fixture);

    region.remap(page_size() * 3).expect("Failed to remap(..)");

    assert_eq!(region.capacity(), page_size() * 3);
    assert_eq!(region.len(), 6);
    assert_eq!(region.as_slice().unwrap(), b"abcdef");
    assert_eq!(fixture.size(), (page_size() * 3) as u64);
}

#[test]
#[serial(region)]
fn test_remap_shrink_truncates_len_and_file() {
    let fixture = FileFixture::with_content(b"abcdef");
    let mut region = open_rw(&fixture);

    region.remap(2).expect("Failed to remap(..)");

    assert_eq!(region.len(), 2);
    assert_eq!(region.as_slice().unwrap(), b"ab");
    assert_eq!(fixture.size(), 2);
}

#[test]
#[serial(region)]
fn test_remap_to_zero_then_grow() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.remap(0).expect("Failed to remap(0)");
    assert!(region.is_empty());
    assert_eq!(region.as_slice().unwrap(), b"");

    region.remap(4).expect("Failed to remap(4)");
    assert_eq!(region.capacity(), 4);
    assert_eq!(region.len(), 0);
}

#[test]
#[serial(region)]
fn test_remap_anonymous_preserves_content() {
    let mut region = Region::open(&MapOptions::anonymous(4)).expect("Failed to open(..)");
    region.as_mut_slice().unwrap().copy_from_slice(b"wxyz");

    region.remap(page_size() * 4).expect("Failed to remap(..)");

    assert_eq!(region.as_slice().unwrap(), b"wxyz");
    assert!(region.as_mut_capacity().unwrap()[4..].iter().all(|&b| b == 0));
}

#[test]
#[serial(region)]
fn test_remap_private_file_never_touches_file() {
    let fixture = FileFixture::with_content(b"private");
    let mut region = Region::open(
        &MapOptions::file(fixture.path())
            .mode(AccessMode::ReadWrite)
            .sharing(Sharing::Private),
    )
    .expect("Failed to open(..)");

    region.as_mut_slice().unwrap()[0] = b'P';
    region.remap(64).expect("Failed to remap(..)");

    assert_eq!(region.as_slice().unwrap(), b"Private");
    region.terminate().expect("Failed to terminate()");
    assert_eq!(fixture.read(), b"private");
}

#[test]
#[serial(region)]
fn test_remap_fixed_region_fails() {
    let fixture = FileFixture::with_content(b"0123456789");
    let mut region = Region::open(
        &MapOptions::file(fixture.path())
            .mode(AccessMode::ReadWrite)
            .length(10),
    )
    .expect("Failed to open(..)");

    assert!(matches!(region.remap(20), Err(RegionError::FixedSize)));
    assert!(matches!(region.extend(1), Err(RegionError::FixedSize)));
    assert_eq!(region.capacity(), 10);
}

#[test]
#[serial(region)]
fn test_remap_failure_keeps_previous_mapping() {
    let mut region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");
    region.as_mut_slice().unwrap().copy_from_slice(b"keepthis");

    let mut original = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    unsafe { libc::getrlimit(libc::RLIMIT_AS, &mut original) };

    let tiny = libc::rlimit {
        rlim_cur: 0,
        rlim_max: original.rlim_max,
    };
    unsafe { libc::setrlimit(libc::RLIMIT_AS, &tiny) };

    let result = region.remap(1 << 24);

    unsafe { libc::setrlimit(libc::RLIMIT_AS, &original) };

    assert!(result.is_err());
    assert_eq!(region.capacity(), 8);
    assert_eq!(region.as_slice().unwrap(), b"keepthis");
}

#[test]
#[serial(region)]
fn test_extend_returns_new_capacity() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    let capacity = region.extend(5).expect("Failed to extend(..)");

    assert_eq!(capacity, 8);
    assert_eq!(region.len(), 3);
}

#[test]
#[serial(region)]
fn test_remap_keeps_pin() {
    let mut region = Region::open(&MapOptions::anonymous(16)).expect("Failed to open(..)");

    region.lock().expect("Failed to lock()");
    region.remap(page_size()).expect("Failed to remap(..)");

    assert_eq!(region.lock_count(), 1);
    region.unlock().expect("Failed to unlock()");
}

// =============================================================================
// set_len()
// =============================================================================

#[test]
#[serial(region)]
fn test_set_len_beyond_capacity_fails() {
    let mut region = Region::open(&MapOptions::anonymous(4)).expect("Failed to open(..)");

    assert!(matches!(
        region.set_len(5),
        Err(RegionError::CapacityExceeded {
            len: 5,
            capacity: 4
        })
    ));

    region.set_len(2).expect("Failed to set_len(..)");
    assert_eq!(region.len(), 2);
    assert_eq!(region.capacity(), 4);
}

// =============================================================================
// protect()
// =============================================================================

#[test]
#[serial(region)]
fn test_protect_read_blocks_writes() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.protect(Protection::Read).expect("Failed to protect(..)");

    assert!(matches!(region.as_mut_slice(), Err(RegionError::ReadOnly)));
    assert_eq!(region.as_slice().unwrap(), b"abc");

    region.protect(Protection::ReadWrite).expect("Failed to protect(..)");
    region.as_mut_slice().unwrap()[0] = b'A';
    assert_eq!(region.as_slice().unwrap(), b"Abc");
}

#[test]
#[serial(region)]
fn test_protect_none_blocks_reads() {
    let mut region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");

    region.protect(Protection::None).expect("Failed to protect(..)");

    assert!(matches!(region.as_slice(), Err(RegionError::Inaccessible)));
}

#[test]
#[serial(region)]
fn test_freeze_blocks_write_protection() {
    let mut region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");

    region.freeze().expect("Failed to freeze()");

    assert!(matches!(region.as_mut_slice(), Err(RegionError::ReadOnly)));
    assert!(matches!(
        region.protect(Protection::Write),
        Err(RegionError::ReadOnly)
    ));
}

// =============================================================================
// lock() / unlock()
// =============================================================================

#[test]
#[serial(region)]
fn test_lock_counts_nested_calls() {
    let mut region = Region::open(&MapOptions::anonymous(32)).expect("Failed to open(..)");

    region.lock().expect("Failed to lock()");
    region.lock().expect("Failed to lock()");
    assert_eq!(region.lock_count(), 2);

    region.unlock().expect("Failed to unlock()");
    assert_eq!(region.lock_count(), 1);

    region.unlock().expect("Failed to unlock()");
    assert_eq!(region.lock_count(), 0);
}

#[test]
#[serial(region)]
fn test_unlock_without_lock_succeeds() {
    let mut region = Region::open(&MapOptions::anonymous(32)).expect("Failed to open(..)");

    region.unlock().expect("Failed to unlock()");
    assert_eq!(region.lock_count(), 0);
}

// =============================================================================
// sync()
// =============================================================================

#[test]
#[serial(region)]
fn test_sync_writes_and_clears_dirty() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.as_mut_slice().unwrap().copy_from_slice(b"xyz");
    assert!(region.is_dirty());

    region.sync(SyncMode::Sync).expect("Failed to sync(..)");

    assert!(!region.is_dirty());
    assert_eq!(fixture.read(), b"xyz");
}

#[test]
#[serial(region)]
fn test_sync_twice_is_idempotent() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.sync(SyncMode::Sync).expect("Failed to sync(..)");
    region.sync(SyncMode::Sync).expect("Failed to sync(..)");

    assert_eq!(region.as_slice().unwrap(), b"abc");
    assert_eq!(fixture.read(), b"abc");
}

#[test]
#[serial(region)]
fn test_sync_compacts_slack_capacity() {
    let fixture = FileFixture::with_content(b"abcdef");
    let mut region = open_rw(&fixture);

    region.remap(page_size()).expect("Failed to remap(..)");
    region.set_len(4).expect("Failed to set_len(..)");
    region.sync(SyncMode::Async).expect("Failed to sync(..)");

    assert_eq!(region.capacity(), 4);
    assert_eq!(fixture.read(), b"abcd");
}

#[test]
#[serial(region)]
fn test_sync_invalidate_writes_through() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.as_mut_slice().unwrap().copy_from_slice(b"xyz");
    region.sync(SyncMode::Invalidate).expect("Failed to sync(..)");

    assert!(!region.is_dirty());
    assert_eq!(region.as_slice().unwrap(), b"xyz");
    assert_eq!(fixture.read(), b"xyz");
}

#[test]
#[serial(region)]
fn test_sync_anonymous_is_noop() {
    let mut region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");

    region.as_mut_slice().unwrap()[0] = 1;
    region.sync(SyncMode::Sync).expect("Failed to sync(..)");

    assert!(!region.is_dirty());
    assert_eq!(region.capacity(), 8);
}

// =============================================================================
// terminate()
// =============================================================================

#[test]
#[serial(region)]
fn test_terminate_is_idempotent() {
    let fixture = FileFixture::with_content(b"abc");
    let mut region = open_rw(&fixture);

    region.terminate().expect("Failed to terminate()");
    region.terminate().expect("Failed to terminate()");

    assert!(!region.is_mapped());
}

#[test]
#[serial(region)]
fn test_operations_after_terminate_fail() {
    let mut region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");

    region.terminate().expect("Failed to terminate()");

    assert!(matches!(region.as_slice(), Err(RegionError::Unmapped)));
    assert!(matches!(region.remap(16), Err(RegionError::Unmapped)));
    assert!(matches!(
        region.protect(Protection::Read),
        Err(RegionError::Unmapped)
    ));
    assert!(matches!(
        region.advise(Advice::Normal),
        Err(RegionError::Unmapped)
    ));
    assert!(matches!(region.lock(), Err(RegionError::Unmapped)));
    assert!(matches!(
        region.sync(SyncMode::Sync),
        Err(RegionError::Unmapped)
    ));
}

#[test]
#[serial(region)]
fn test_terminate_truncates_to_len_and_roundtrips() {
    let fixture = FileFixture::with_content(b"abcdef");
    let mut region = open_rw(&fixture);

    region.remap(page_size()).expect("Failed to remap(..)");
    region.as_mut_capacity().unwrap()[6..9].copy_from_slice(b"ghi");
    region.set_len(9).expect("Failed to set_len(..)");
    region.terminate().expect("Failed to terminate()");

    assert_eq!(fixture.read(), b"abcdefghi");

    let reopened = open_rw(&fixture);
    assert_eq!(reopened.as_slice().unwrap(), b"abcdefghi");
}

#[test]
#[serial(region)]
fn test_drop_terminates() {
    let fixture = FileFixture::with_content(b"abcdef");

    {
        let mut region = open_rw(&fixture);
        region.as_mut_slice().unwrap()[0] = b'Z';
        region.set_len(3).expect("Failed to set_len(..)");
    }

    assert_eq!(fixture.read(), b"Zbc");
}

#[test]
#[serial(region)]
fn test_debug_omits_address() {
    let region = Region::open(&MapOptions::anonymous(8)).expect("Failed to open(..)");
    let output = format!("{region:?}");

    assert!(output.contains("capacity: 8"));
    assert!(!output.contains("0x"));
}

// =============================================================================
// seccomp
// =============================================================================

#[cfg(target_os = "linux")]
mod seccomp {
    use super::*;
    use vellum_test_utils::{
        block_madvise, block_mlock, block_mprotect, block_msync, run_test_as_subprocess,
    };

    #[test]
    #[ignore]
    fn subprocess_test_lock_fails_when_mlock_blocked() {
        let mut region = Region::open(&MapOptions::anonymous(64)).expect("Failed to open(..)");

        block_mlock();

        let result = region.lock();

        assert!(matches!(
            result,
            Err(RegionError::Os {
                syscall: Syscall::Mlock,
                ..
            })
        ));
        assert_eq!(region.lock_count(), 0);
    }

    #[test]
    #[serial(region)]
    fn test_lock_fails_when_mlock_blocked() {
        let exit_code = run_test_as_subprocess(
            "tests::region::seccomp::subprocess_test_lock_fails_when_mlock_blocked",
        );

        assert_eq!(
            exit_code,
            Some(0),
            "Subprocess should exit cleanly after assertion"
        );
    }

    #[test]
    #[ignore]
    fn subprocess_test_protect_fails_when_mprotect_blocked() {
        let mut region = Region::open(&MapOptions::anonymous(64)).expect("Failed to open(..)");

        block_mprotect();

        let result = region.protect(Protection::Read);

        assert!(matches!(
            result,
            Err(RegionError::Os {
                syscall: Syscall::Mprotect,
                ..
            })
        ));
        assert_eq!(region.protection(), Protection::ReadWrite);
    }

    #[test]
    #[serial(region)]
    fn test_protect_fails_when_mprotect_blocked() {
        let exit_code = run_test_as_subprocess(
            "tests::region::seccomp::subprocess_test_protect_fails_when_mprotect_blocked",
        );

        assert_eq!(
            exit_code,
            Some(0),
            "Subprocess should exit cleanly after assertion"
        );
    }

    #[test]
    #[ignore]
    fn subprocess_test_advise_fails_when_madvise_blocked() {
        let mut region = Region::open(&MapOptions::anonymous(64)).expect("Failed to open(..)");

        block_madvise();

        let result = region.advise(Advice::Random);

        assert!(matches!(
            result,
            Err(RegionError::Os {
                syscall: Syscall::Madvise,
                ..
            })
        ));
        assert_eq!(region.advice(), None);
    }

    #[test]
    #[serial(region)]
    fn test_advise_fails_when_madvise_blocked() {
        let exit_code = run_test_as_subprocess(
            "tests::region::seccomp::subprocess_test_advise_fails_when_madvise_blocked",
        );

        assert_eq!(
            exit_code,
            Some(0),
            "Subprocess should exit cleanly after assertion"
        );
    }

    #[test]
    #[ignore]
    fn subprocess_test_sync_fails_when_msync_blocked() {
        let fixture = FileFixture::with_content(b"abc");
        let mut region = open_rw(&fixture);

        region.as_mut_slice().unwrap().copy_from_slice(b"xyz");

        block_msync();

        let result = region.sync(SyncMode::Sync);

        assert!(matches!(
            result,
            Err(RegionError::Os {
                syscall: Syscall::Msync,
                ..
            })
        ));
        assert!(region.is_dirty());
        assert_eq!(region.as_slice().unwrap(), b"xyz");
    }

    #[test]
    #[serial(region)]
    fn test_sync_fails_when_msync_blocked() {
        let exit_code = run_test_as_subprocess(
            "tests::region::seccomp::subprocess_test_sync_fails_when_msync_blocked",
        );

        assert_eq!(
            exit_code,
            Some(0),
            "Subprocess should exit cleanly after assertion"
        );
    }
}
