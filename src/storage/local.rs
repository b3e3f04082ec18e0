use super::{NotifyStorage, Storage, StorageError};
use crate::mounts::BackendKind;
use crate::utils::paths::normalize_path;
use crate::watcher::{ChangeSubscription, WatcherSubscription};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// A directory on this host, watched with `notify`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    poll_interval: Option<Duration>,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(root: P, poll_interval: Option<Duration>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        // Canonical so watcher paths (which are canonical on macOS) strip cleanly
        let root = fs::canonicalize(root).map_err(|source| StorageError::Io {
            path: root.display().to_string(),
            source,
        })?;

        if !root.is_dir() {
            return Err(StorageError::NotADirectory(root));
        }

        Ok(Self {
            root,
            poll_interval,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a storage path onto the local filesystem, refusing `..` escapes
    fn local_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = normalize_path(path);
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        if normalized.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(normalized))
        }
    }

    fn io<T>(path: &str, result: std::io::Result<T>) -> Result<T, StorageError> {
        result.map_err(|source| StorageError::Io {
            path: path.to_string(),
            source,
        })
    }
}

impl Storage for LocalStorage {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn as_notify(&self) -> Option<&dyn NotifyStorage> {
        Some(self)
    }
}

impl NotifyStorage for LocalStorage {
    fn notify(&self, path: &str) -> Result<Box<dyn ChangeSubscription>, StorageError> {
        let target = self.local_path(path)?;
        let subscription = WatcherSubscription::start(&self.root, &target, self.poll_interval)?;
        Ok(Box::new(subscription))
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        debug!("Writing {}", path);
        Self::io(path, fs::write(self.local_path(path)?, contents))
    }

    fn mkdir(&self, path: &str) -> Result<(), StorageError> {
        Self::io(path, fs::create_dir(self.local_path(path)?))
    }

    fn unlink(&self, path: &str) -> Result<(), StorageError> {
        Self::io(path, fs::remove_file(self.local_path(path)?))
    }

    fn rmdir(&self, path: &str) -> Result<(), StorageError> {
        Self::io(path, fs::remove_dir(self.local_path(path)?))
    }
}
