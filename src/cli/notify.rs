//! The `notify` command
//!
//! Startup is fail-fast (unknown mount, bad credentials, no notify
//! capability). Once listening, a failed reconciliation is logged and the
//! loop moves on to the next event.

use tracing::{debug, error, info};

use crate::config::NotifyConfig;
use crate::database::{FileCacheDatabase, MetadataStore};
use crate::error::{NotifyError, Result};
use crate::mounts::{CredentialOverride, resolve_storage};
use crate::reconciler::{Reconciler, RetryPolicy};
use crate::selftest::run_self_test;
use crate::storage::NotifyStorage;
use crate::utils::paths::normalize_path;
use crate::watcher::{IgnoreFilter, listen};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NotifyOptions {
    pub mount_id: i64,
    pub credentials: CredentialOverride,
    /// Path prefix to scope the subscription to
    pub path: String,
    pub self_check: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            mount_id: 0,
            credentials: CredentialOverride::default(),
            path: "/".to_string(),
            self_check: true,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Listen on a mount until the process is stopped.
///
/// Only returns on a startup failure or if the change feed closes.
pub fn run_notify(config: &NotifyConfig, options: &NotifyOptions) -> Result<()> {
    let mount = config.find_mount(options.mount_id)?;
    let storage = resolve_storage(mount, &options.credentials)?;

    let notify_storage = storage.as_notify().ok_or_else(|| NotifyError::UnsupportedBackend {
        backend: storage.backend().to_string(),
    })?;

    let filter = config.ignore_filter()?;
    let db = FileCacheDatabase::new(config.database_path(), config.busy_timeout())?;
    debug!("Opened metadata cache at {}", db.path().display());
    let mut reconciler = Reconciler::new(mount.id, db, RetryPolicy::new(config.reconnect_delay()))
        .with_dry_run(options.dry_run);

    info!(
        "Listening for changes on mount {} ({} at {})",
        mount.id,
        storage.backend(),
        storage.describe()
    );

    listen_mount(
        notify_storage,
        &mut reconciler,
        &filter,
        options,
        config.settle_interval(),
    )
}

/// Subscribe, optionally self-test, then reconcile every change in order.
pub fn listen_mount<S: MetadataStore>(
    storage: &dyn NotifyStorage,
    reconciler: &mut Reconciler<S>,
    filter: &IgnoreFilter,
    options: &NotifyOptions,
    settle: Duration,
) -> Result<()> {
    let prefix = normalize_path(&options.path);
    let mut subscription = storage.notify(&prefix)?;

    if options.self_check {
        let outcome = run_self_test(storage, subscription.as_mut(), &prefix, settle);
        outcome.log(options.verbose);
    }

    for change in listen(subscription.as_mut()) {
        if filter.is_ignored(&change) {
            debug!("Ignoring {}", change);
            continue;
        }

        if options.verbose {
            info!("{}", change);
        }

        if let Err(e) = reconciler.reconcile(&change) {
            error!("Failed to reconcile {}: {}", change, e);
        }
    }

    Err(NotifyError::SubscriptionClosed {
        mount_id: reconciler.mount_id(),
    })
}
