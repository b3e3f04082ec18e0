// mount-notify - change notification reconciler for external storage mounts
//!
//! Listens to a storage mount's live change feed and marks the cached size of
//! every touched folder as unknown in the metadata cache, so the next scan
//! re-derives it.

pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod mounts;
pub mod reconciler;
pub mod selftest;
pub mod shutdown;
pub mod storage;
pub mod utils;
pub mod watcher;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use config::NotifyConfig;
pub use error::NotifyError;
pub use reconciler::{Invalidation, Reconciler, RetryPolicy};
pub use watcher::{ChangeEvent, ChangeKind};
