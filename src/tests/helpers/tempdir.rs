/// Test helper for creating unique temporary directories
///
/// Watcher tests run real OS watchers; a unique directory per test keeps one
/// test's events out of another's subscription.
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a uniquely named temporary directory for parallel test execution
pub fn unique_temp_dir(test_name: &str) -> TempDir {
    let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_name = format!("mount_notify_test_{}_{}", test_name, counter);

    tempfile::Builder::new()
        .prefix(&unique_name)
        .tempdir()
        .expect("Failed to create unique temp directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_temp_dirs_are_different() {
        let dir1 = unique_temp_dir("test");
        let dir2 = unique_temp_dir("test");
        assert_ne!(dir1.path(), dir2.path());
    }

    #[test]
    fn test_unique_temp_dir_names_contain_test_name() {
        let dir = unique_temp_dir("my_awesome_test");
        let path_str = dir.path().to_string_lossy();

        assert!(
            path_str.contains("mount_notify_test_my_awesome_test"),
            "Temp dir name should contain test name: {}",
            path_str
        );
    }
}
