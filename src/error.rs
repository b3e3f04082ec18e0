use thiserror::Error;

use crate::config::ConfigError;
use crate::database::DatabaseError;
use crate::storage::StorageError;

/// Failures surfaced by the notify command and the reconciler.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Unknown mount, missing credentials, or an unusable backend definition.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Mount of type \"{backend}\" does not support active update notifications")]
    UnsupportedBackend { backend: String },

    /// The mount has no storage ids in the metadata cache, so there is
    /// nothing that could be invalidated for it.
    #[error("No storages found by mount ID {mount_id}")]
    StorageNotFound { mount_id: i64 },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Change notification stream for mount {mount_id} closed unexpectedly")]
    SubscriptionClosed { mount_id: i64 },
}

pub type Result<T> = std::result::Result<T, NotifyError>;
