/// Command implementations for the mount-notify binary
///
/// Modules:
/// - notify: resolve a mount, self-test, and reconcile changes until stopped
/// - mounts: list configured mounts with their capabilities and storage ids
/// - output: table / JSON rendering for listings
pub mod mounts;
pub mod notify;
pub mod output;

pub use mounts::{MountSummary, list_mounts};
pub use notify::{NotifyOptions, listen_mount, run_notify};
pub use output::OutputFormat;
