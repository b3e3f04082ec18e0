//! Tests against real OS watchers on temporary directories.
//!
//! Delivery timing is up to the platform, so these poll `drain` with a
//! deadline instead of blocking on `listen`.

use serial_test::serial;
use std::fs;
use std::time::{Duration, Instant};

use crate::selftest::{SelfTestOutcome, run_self_test};
use crate::storage::{LocalStorage, NotifyStorage};
use crate::tests::helpers::unique_temp_dir;
use crate::watcher::{ChangeEvent, ChangeSubscription};

fn wait_for<F>(subscription: &mut dyn ChangeSubscription, mut found: F) -> Vec<ChangeEvent>
where
    F: FnMut(&[ChangeEvent]) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        seen.extend(subscription.drain());
        if found(&seen) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    seen
}

#[test]
#[serial]
fn test_native_watcher_reports_storage_relative_paths() {
    let temp_dir = unique_temp_dir("native_watch");
    let storage = LocalStorage::new(temp_dir.path(), None).unwrap();
    fs::create_dir(storage.root().join("docs")).unwrap();

    let mut subscription = storage.notify("/").unwrap();
    std::thread::sleep(Duration::from_millis(100));
    fs::write(storage.root().join("docs/report.txt"), "quarterly").unwrap();

    let seen = wait_for(subscription.as_mut(), |seen| {
        seen.iter().any(|e| e.path == "/docs/report.txt")
    });

    assert!(
        seen.iter().any(|e| e.path == "/docs/report.txt"),
        "expected /docs/report.txt in {:?}",
        seen
    );
}

#[test]
#[serial]
fn test_scoped_subscription_ignores_siblings() {
    let temp_dir = unique_temp_dir("scoped_watch");
    let storage = LocalStorage::new(temp_dir.path(), None).unwrap();
    fs::create_dir(storage.root().join("inbox")).unwrap();
    fs::create_dir(storage.root().join("archive")).unwrap();

    let mut subscription = storage.notify("/inbox").unwrap();
    std::thread::sleep(Duration::from_millis(100));
    fs::write(storage.root().join("archive/old.txt"), "x").unwrap();
    fs::write(storage.root().join("inbox/new.txt"), "y").unwrap();

    let seen = wait_for(subscription.as_mut(), |seen| {
        seen.iter().any(|e| e.path == "/inbox/new.txt")
    });

    assert!(seen.iter().any(|e| e.path == "/inbox/new.txt"));
    assert!(seen.iter().all(|e| !e.path.starts_with("/archive")));
}

#[test]
#[serial]
fn test_polling_watcher_reports_changes() {
    let temp_dir = unique_temp_dir("poll_watch");
    let storage = LocalStorage::new(temp_dir.path(), Some(Duration::from_millis(100))).unwrap();

    let mut subscription = storage.notify("/").unwrap();
    std::thread::sleep(Duration::from_millis(250));
    fs::write(storage.root().join("polled.txt"), "content").unwrap();

    let seen = wait_for(subscription.as_mut(), |seen| {
        seen.iter().any(|e| e.path == "/polled.txt")
    });

    assert!(seen.iter().any(|e| e.path == "/polled.txt"), "saw {:?}", seen);
}

#[test]
#[serial]
fn test_self_test_on_local_storage_succeeds() {
    let temp_dir = unique_temp_dir("local_self_test");
    let storage = LocalStorage::new(temp_dir.path(), None).unwrap();

    let mut subscription = storage.notify("/").unwrap();
    let outcome = run_self_test(&storage, subscription.as_mut(), "/", Duration::from_millis(200));

    assert_eq!(outcome, SelfTestOutcome::Success);
    assert!(!storage.root().join(".nc_test_file.txt").exists());
    assert!(!storage.root().join(".nc_test_folder").exists());
}

#[test]
#[serial]
fn test_self_test_succeeds_repeatedly_with_short_settle() {
    let temp_dir = unique_temp_dir("repeated_self_test");
    let storage = LocalStorage::new(temp_dir.path(), None).unwrap();
    let mut subscription = storage.notify("/").unwrap();

    for run in 0..5 {
        let outcome =
            run_self_test(&storage, subscription.as_mut(), "/", Duration::from_millis(100));
        assert_eq!(outcome, SelfTestOutcome::Success, "run {}", run);
    }
}
