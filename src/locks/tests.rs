//! Tests for the locks subsystem.

use super::*;
use crate::error::LockError;
use crate::test_support::temp_lock_path;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Exercise the single-holder contract shared by every backend.
fn assert_try_lock_contract<L: Lock>(lock: &L) {
    let first = lock.try_lock().unwrap();
    assert!(first.is_locked());

    // Reentrant collision is reported as not acquired, never as an error.
    let second = lock.try_lock().unwrap();
    assert!(!second.is_locked());
    second.release().unwrap();

    assert!(!lock.probe().unwrap());
    assert!(!lock.probe().unwrap());

    first.release().unwrap();
    assert!(lock.probe().unwrap());
    assert!(lock.probe().unwrap());
}

#[test]
fn test_open_creates_empty_file() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    assert!(!path.exists());

    let lock = FileLock::open(&path).unwrap();
    assert_eq!(lock.path(), path.as_path());
    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

    lock.close().unwrap();
}

#[test]
fn test_open_preserves_existing_content() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    std::fs::write(&path, "keep me").unwrap();

    let lock = FileLock::open(&path).unwrap();
    lock.lock().unwrap().release().unwrap();
    lock.close().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
}

#[test]
fn test_open_directory_fails() {
    let (temp_dir, _path) = temp_lock_path("unused.lock");

    let err = FileLock::open(temp_dir.path()).unwrap_err();
    assert!(matches!(err, LockError::Open { .. }), "{err:?}");
}

#[test]
fn test_open_missing_parent_fails_by_default() {
    let (_temp_dir, path) = temp_lock_path("missing/dir/x.lock");

    let err = FileLock::open(&path).unwrap_err();
    assert!(matches!(err, LockError::Open { .. }), "{err:?}");
    assert!(!path.exists());
}

#[test]
fn test_open_with_create_parent_dirs() {
    let (_temp_dir, path) = temp_lock_path("missing/dir/x.lock");
    let options = FileLockOptions::new().with_create_parent_dirs(true);

    let lock = FileLock::open_with(&path, &options).unwrap();
    assert!(path.exists());
    lock.close().unwrap();
}

#[test]
fn test_file_lock_try_lock_contract() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();

    assert_try_lock_contract(&lock);

    lock.close().unwrap();
}

#[test]
fn test_memory_lock_try_lock_contract() {
    let lock = MemoryLock::new("cache");
    assert_try_lock_contract(&lock);
    lock.close().unwrap();
}

#[test]
fn test_blocking_lock_when_free() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();

    let locked = lock.lock().unwrap();
    assert!(!lock.probe().unwrap());
    locked.release().unwrap();

    assert!(lock.probe().unwrap());
    lock.close().unwrap();
}

#[test]
fn test_blocking_lock_reentrant_is_error_not_deadlock() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();

    let locked = lock.lock().unwrap();
    let err = lock.lock().unwrap_err();
    assert!(matches!(err, LockError::HeldInProcess { .. }), "{err:?}");

    // The original hold survives the failed attempt.
    assert!(!lock.try_lock().unwrap().is_locked());
    locked.release().unwrap();
    assert!(lock.try_lock().unwrap().is_locked());
}

#[test]
fn test_second_handle_in_same_process_sees_lock() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let first = FileLock::open(&path).unwrap();
    let second = FileLock::open(&path).unwrap();

    let locked = first.lock().unwrap();

    let attempt = second.try_lock().unwrap();
    assert!(!attempt.is_locked());
    attempt.release().unwrap();
    assert!(!second.probe().unwrap());
    assert!(matches!(
        second.lock().unwrap_err(),
        LockError::HeldInProcess { .. }
    ));

    locked.release().unwrap();

    let attempt = second.try_lock().unwrap();
    assert!(attempt.is_locked());
    attempt.release().unwrap();
}

#[test]
fn test_equivalent_paths_share_lock() {
    let (temp_dir, path) = temp_lock_path("x.lock");
    let first = FileLock::open(&path).unwrap();
    let dotted = temp_dir.path().join(".").join("x.lock");
    let second = FileLock::open(&dotted).unwrap();

    let _locked = first.lock().unwrap();
    assert!(!second.probe().unwrap());
}

#[cfg(unix)]
#[test]
fn test_hard_link_shares_lock_without_deadlock() {
    let (temp_dir, path) = temp_lock_path("x.lock");
    let linked = temp_dir.path().join("linked.lock");
    let first = FileLock::open(&path).unwrap();
    std::fs::hard_link(&path, &linked).unwrap();
    let second = FileLock::open(&linked).unwrap();

    let locked = first.lock().unwrap();
    assert!(!second.try_lock().unwrap().is_locked());
    assert!(!second.probe().unwrap());

    // Same file under another name: a blocking attempt must fail, not hang.
    let err = second.lock().unwrap_err();
    assert!(matches!(err, LockError::HeldInProcess { .. }), "{err:?}");

    locked.release().unwrap();
    let relocked = second.lock().unwrap();
    assert!(!first.probe().unwrap());
    relocked.release().unwrap();
}

#[cfg(unix)]
#[test]
fn test_recreated_file_is_a_separate_lock() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let old = FileLock::open(&path).unwrap();
    let held = old.lock().unwrap();

    std::fs::remove_file(&path).unwrap();
    let fresh = FileLock::open(&path).unwrap();

    // The hold is on the unlinked file, so the new one at the same path is free.
    let locked = fresh.try_lock().unwrap();
    assert!(locked.is_locked());
    assert!(!old.try_lock().unwrap().is_locked());

    locked.release().unwrap();
    held.release().unwrap();
    assert!(old.probe().unwrap());
}

#[test]
fn test_release_not_acquired_is_noop() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let holder = FileLock::open(&path).unwrap();
    let other = FileLock::open(&path).unwrap();

    let held = holder.try_lock().unwrap();
    assert!(held.is_locked());

    for _ in 0..3 {
        let attempt = other.try_lock().unwrap();
        assert!(attempt.into_locked().is_none());
        other.try_lock().unwrap().release().unwrap();
    }

    // Releasing the failed attempts never touched the real hold.
    assert!(!other.probe().unwrap());
    held.release().unwrap();
    assert!(other.probe().unwrap());
}

#[test]
fn test_dropping_token_releases_lock() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let holder = FileLock::open(&path).unwrap();
    let other = FileLock::open(&path).unwrap();

    {
        let _locked = holder.lock().unwrap();
        assert!(!other.probe().unwrap());
    }

    assert!(other.probe().unwrap());
}

#[test]
fn test_close_without_lock() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();

    lock.close().unwrap();

    // File is kept and can be locked again.
    assert!(path.exists());
    let reopened = FileLock::open(&path).unwrap();
    assert!(reopened.probe().unwrap());
}

#[test]
fn test_delete_keeps_file() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();
    lock.lock().unwrap().release().unwrap();

    lock.delete().unwrap();

    assert!(path.exists());
}

#[test]
fn test_close_releases_leaked_token() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();
    let other = FileLock::open(&path).unwrap();

    std::mem::forget(lock.lock().unwrap());
    assert!(!other.probe().unwrap());

    lock.close().unwrap();
    assert!(other.probe().unwrap());
}

#[test]
fn test_drop_releases_leaked_token() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let other = FileLock::open(&path).unwrap();

    {
        let lock = FileLock::open(&path).unwrap();
        std::mem::forget(lock.try_lock().unwrap());
        assert!(!other.probe().unwrap());
    }

    assert!(other.probe().unwrap());
}

#[test]
fn test_with_lock_releases_on_success_and_error() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let lock = FileLock::open(&path).unwrap();

    let value = lock.with_lock(|| 42).unwrap();
    assert_eq!(value, 42);
    assert!(lock.probe().unwrap());

    let outcome: std::result::Result<(), &str> = lock.with_lock(|| Err("boom")).unwrap();
    assert_eq!(outcome, Err("boom"));
    assert!(lock.probe().unwrap());
}

#[test]
fn test_with_lock_releases_on_panic() {
    let lock = MemoryLock::new("panicky");

    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        lock.with_lock(|| -> u32 { panic!("boom") })
    }));
    assert!(caught.is_err());

    assert!(lock.probe().unwrap());
}

#[test]
fn test_with_lock_propagates_reentrant_error() {
    let lock = MemoryLock::new("nested");

    let inner = lock.with_lock(|| lock.with_lock(|| ())).unwrap();
    assert!(matches!(inner, Err(LockError::HeldInProcess { .. })));
}

#[test]
fn test_memory_lock_blocks_other_threads() {
    let lock = MemoryLock::new("shared");
    let held = lock.lock().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        let lock_ref = &lock;
        s.spawn(move || {
            let locked = lock_ref.lock().unwrap();
            tx.send(()).unwrap();
            locked.release().unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        held.release().unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    });

    assert!(lock.probe().unwrap());
}

#[test]
fn test_memory_lock_reentrant_lock_is_error() {
    let lock = MemoryLock::default();
    assert_eq!(lock.name(), "memory");

    let _locked = lock.lock().unwrap();
    let err = lock.lock().unwrap_err();
    assert_eq!(err.to_string(), "lock 'memory' is already held by this process");
}

#[test]
fn test_file_lock_across_threads() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let holder = FileLock::open(&path).unwrap();
    let held = holder.lock().unwrap();

    thread::scope(|s| {
        let path = &path;
        let seen = s
            .spawn(move || {
                let other = FileLock::open(path).unwrap();
                other.probe().unwrap()
            })
            .join()
            .unwrap();
        assert!(!seen);
    });

    held.release().unwrap();
}

#[test]
fn test_locks_as_trait_objects() {
    let (_temp_dir, path) = temp_lock_path("x.lock");
    let locks: Vec<Box<dyn Lock>> = vec![
        Box::new(FileLock::open(&path).unwrap()),
        Box::new(MemoryLock::new("boxed")),
    ];

    for lock in &locks {
        let locked = lock.lock().unwrap();
        assert!(!lock.probe().unwrap());
        locked.release().unwrap();
        assert!(lock.probe().unwrap());
    }
}

#[test]
fn test_options_deserialize_with_defaults() {
    let options: FileLockOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, FileLockOptions::default());
    assert!(!options.create_parent_dirs);

    let options: FileLockOptions =
        serde_json::from_str(r#"{"create_parent_dirs": true, "unrelated": 1}"#).unwrap();
    assert!(options.create_parent_dirs);
}
