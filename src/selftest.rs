//! Startup self-test for a notify subscription
//!
//! Writes a probe file at the scoped root and one inside a probe folder, then
//! checks that the subscription reported both. Purely diagnostic: the outcome
//! is logged and the listener starts regardless.

use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::storage::{NotifyStorage, StorageError};
use crate::utils::paths::join_storage_path;
use crate::watcher::{ChangeEvent, ChangeSubscription};

pub const ROOT_PROBE: &str = ".nc_test_file.txt";
pub const PROBE_FOLDER: &str = ".nc_test_folder";
pub const SUBFOLDER_PROBE: &str = ".nc_test_folder/subfile.txt";

const PROBE_CONTENT: &[u8] = b"test content";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfTestOutcome {
    /// Both probes were reported
    Success,
    /// Only the root probe was reported; recursive notifications are broken
    SubfolderNotDetected,
    /// Nothing was reported
    NoChangesDetected,
    /// The probes could not be written
    ProbeFailed(String),
}

impl SelfTestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SelfTestOutcome::Success)
    }

    /// Report the outcome; success is only mentioned when verbose.
    pub fn log(&self, verbose: bool) {
        match self {
            SelfTestOutcome::Success => {
                if verbose {
                    info!("Self-test successful");
                }
            }
            SelfTestOutcome::SubfolderNotDetected => {
                error!("Error while running self-test, change in subfolder not detected")
            }
            SelfTestOutcome::NoChangesDetected => {
                error!("Error while running self-test, no changes detected")
            }
            SelfTestOutcome::ProbeFailed(reason) => {
                error!("Error while running self-test, could not write test files: {}", reason)
            }
        }
    }
}

struct Probes {
    root_file: String,
    folder: String,
    sub_file: String,
}

impl Probes {
    fn under(prefix: &str) -> Self {
        Self {
            root_file: join_storage_path(prefix, ROOT_PROBE),
            folder: join_storage_path(prefix, PROBE_FOLDER),
            sub_file: join_storage_path(prefix, SUBFOLDER_PROBE),
        }
    }

    /// The pause after `mkdir` lets watchers that add per-directory watches
    /// (inotify) pick up the new folder before the subfile is written.
    fn create(&self, storage: &dyn NotifyStorage, settle: Duration) -> Result<(), StorageError> {
        storage.write_file(&self.root_file, PROBE_CONTENT)?;
        storage.mkdir(&self.folder)?;
        thread::sleep(settle);
        storage.write_file(&self.sub_file, PROBE_CONTENT)?;
        Ok(())
    }

    /// Best effort; a probe that never got created is not an error worth raising
    fn remove(&self, storage: &dyn NotifyStorage) {
        let results = [
            storage.unlink(&self.root_file),
            storage.unlink(&self.sub_file),
            storage.rmdir(&self.folder),
        ];
        for result in results {
            if let Err(e) = result {
                warn!("Failed to clean up self-test file: {}", e);
            }
        }
    }
}

/// Run the self-test against `subscription`, which must already be listening
/// on `prefix` of `storage`. `settle` is the pause between steps.
pub fn run_self_test(
    storage: &dyn NotifyStorage,
    subscription: &mut dyn ChangeSubscription,
    prefix: &str,
    settle: Duration,
) -> SelfTestOutcome {
    let probes = Probes::under(prefix);

    // Give the subscription time to start
    thread::sleep(settle);

    if let Err(e) = probes.create(storage, settle) {
        probes.remove(storage);
        thread::sleep(settle);
        subscription.drain();
        return SelfTestOutcome::ProbeFailed(e.to_string());
    }

    thread::sleep(settle);
    let changes = subscription.drain();

    probes.remove(storage);

    // Flush the events our own cleanup produced
    thread::sleep(settle);
    subscription.drain();

    evaluate(&changes, &probes.root_file, &probes.sub_file)
}

/// Classify observed changes against the expected probe paths
pub fn evaluate(changes: &[ChangeEvent], root_probe: &str, sub_probe: &str) -> SelfTestOutcome {
    let mut found_root = false;
    let mut found_subfolder = false;

    for change in changes {
        if same_path(&change.path, root_probe) {
            found_root = true;
        } else if same_path(&change.path, sub_probe) {
            found_subfolder = true;
        }
    }

    match (found_root, found_subfolder) {
        (true, true) => SelfTestOutcome::Success,
        (true, false) => SelfTestOutcome::SubfolderNotDetected,
        // Subfolder without root is still "notifications broken" at the root
        (false, _) => SelfTestOutcome::NoChangesDetected,
    }
}

/// Backends disagree on leading slashes; accept both forms
fn same_path(reported: &str, expected: &str) -> bool {
    reported.trim_start_matches('/') == expected.trim_start_matches('/')
}
