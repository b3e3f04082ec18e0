//! Change reconciliation
//!
//! Every change marks the cached size of the changed path's parent folder as
//! unknown, for every storage id backing the mount. A rename touches two
//! folders and is reconciled as two independent invalidations, target first.

mod retry;

use tracing::{debug, info};

use crate::database::MetadataStore;
use crate::error::{NotifyError, Result};
use crate::utils::paths::{parent_path, path_hash};
use crate::watcher::{ChangeEvent, ChangeKind};

pub use retry::{Attempt, RetryPolicy};

/// One parent-folder invalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    /// Normalized parent folder (`""` for the storage root)
    pub parent: String,
    pub path_hash: String,
    pub storage_ids: Vec<i64>,
    pub rows_updated: usize,
    /// Whether the storage-id lookup needed a reconnect
    pub reconnected: bool,
    /// False in dry-run mode
    pub applied: bool,
}

pub struct Reconciler<S: MetadataStore> {
    mount_id: i64,
    store: S,
    policy: RetryPolicy,
    dry_run: bool,
}

impl<S: MetadataStore> Reconciler<S> {
    pub fn new(mount_id: i64, store: S, policy: RetryPolicy) -> Self {
        Self {
            mount_id,
            store,
            policy,
            dry_run: false,
        }
    }

    /// Resolve and log invalidations without writing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn mount_id(&self) -> i64 {
        self.mount_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Invalidate the parent folder(s) touched by `event`.
    pub fn reconcile(&mut self, event: &ChangeEvent) -> Result<Vec<Invalidation>> {
        let mut invalidations = Vec::with_capacity(2);

        if let ChangeKind::Renamed { target } = &event.kind {
            invalidations.push(self.mark_parent_outdated(target)?);
        }
        invalidations.push(self.mark_parent_outdated(&event.path)?);

        Ok(invalidations)
    }

    fn mark_parent_outdated(&mut self, path: &str) -> Result<Invalidation> {
        let mount_id = self.mount_id;
        let parent = parent_path(path);

        let lookup = self
            .policy
            .run(&mut self.store, |store| store.storage_ids_for_mount(mount_id))?;
        let storage_ids = lookup.value;

        if storage_ids.is_empty() {
            return Err(NotifyError::StorageNotFound { mount_id });
        }

        let hash = path_hash(&parent);

        let rows_updated = if self.dry_run {
            info!(
                "Dry run: would mark \"{}\" as outdated for storages {:?}",
                parent, storage_ids
            );
            0
        } else {
            let updated = self.store.invalidate_folder_size(&storage_ids, &hash)?;
            if updated == 0 {
                // TODO: walk up to the nearest cached ancestor and invalidate that instead
                info!(
                    "Parent folder \"{}\" of {} is not in the cache for mount {}",
                    parent, path, mount_id
                );
            } else {
                debug!("Marked \"{}\" as outdated ({} rows)", parent, updated);
            }
            updated
        };

        Ok(Invalidation {
            parent,
            path_hash: hash,
            storage_ids,
            rows_updated,
            reconnected: lookup.reconnects > 0,
            applied: !self.dry_run,
        })
    }
}
