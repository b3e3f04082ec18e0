//! Storage backends behind a mount
//!
//! [`Storage`] is what mount resolution hands back. Only backends that can
//! push change notifications expose [`NotifyStorage`], which also carries the
//! handful of file primitives the self-test needs.

mod local;
mod remote;

use crate::mounts::BackendKind;
use crate::watcher::ChangeSubscription;
use std::path::PathBuf;
use thiserror::Error;

pub use local::LocalStorage;
pub use remote::RemoteStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Invalid storage path \"{0}\"")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start change notifications: {0}")]
    Watch(#[from] notify::Error),
}

pub trait Storage {
    fn backend(&self) -> BackendKind;

    /// Human-readable location, e.g. a local root or `smb://user@host/share`
    fn describe(&self) -> String;

    /// Active change notification capability, if the backend has it
    fn as_notify(&self) -> Option<&dyn NotifyStorage> {
        None
    }
}

/// A storage that can push change notifications.
///
/// Paths are rooted storage paths (`/dir/file.txt`).
pub trait NotifyStorage {
    /// Subscribe to changes at or below `path`.
    fn notify(&self, path: &str) -> Result<Box<dyn ChangeSubscription>, StorageError>;

    fn write_file(&self, path: &str, contents: &[u8]) -> Result<(), StorageError>;

    fn mkdir(&self, path: &str) -> Result<(), StorageError>;

    fn unlink(&self, path: &str) -> Result<(), StorageError>;

    fn rmdir(&self, path: &str) -> Result<(), StorageError>;
}
