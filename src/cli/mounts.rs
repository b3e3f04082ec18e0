//! The `mounts` command

use serde::Serialize;
use std::io::Write;
use tracing::warn;

use super::output::{OutputFormat, write_json, write_table};
use crate::config::NotifyConfig;
use crate::database::FileCacheDatabase;
use crate::mounts::{CredentialOverride, resolve_storage};

#[derive(Debug, Clone, Serialize)]
pub struct MountSummary {
    pub id: i64,
    pub mount_point: String,
    pub backend: String,
    pub location: Option<String>,
    pub notify: bool,
    /// `None` when the metadata cache could not be read
    pub storage_ids: Option<Vec<i64>>,
    pub error: Option<String>,
}

/// Summarize every configured mount. The database is optional: if it cannot
/// be opened the listing still shows configuration and capability.
pub fn summarize_mounts(config: &NotifyConfig, db: Option<&FileCacheDatabase>) -> Vec<MountSummary> {
    config
        .mounts
        .iter()
        .map(|mount| {
            let storage_ids = db.and_then(|db| match db.get_storage_ids_for_mount(mount.id) {
                Ok(ids) => Some(ids),
                Err(e) => {
                    warn!("Failed to look up storage ids for mount {}: {}", mount.id, e);
                    None
                }
            });

            // Listing never prompts, so user-provided credentials show up as errors
            let (location, notify, error) =
                match resolve_storage(mount, &CredentialOverride::default()) {
                    Ok(storage) => (Some(storage.describe()), storage.as_notify().is_some(), None),
                    Err(e) => (None, false, Some(e.to_string())),
                };

            MountSummary {
                id: mount.id,
                mount_point: mount.mount_point.clone(),
                backend: mount.backend.to_string(),
                location,
                notify,
                storage_ids,
                error,
            }
        })
        .collect()
}

pub fn list_mounts<W: Write>(config: &NotifyConfig, format: OutputFormat, writer: &mut W) -> anyhow::Result<()> {
    let db = match FileCacheDatabase::new(config.database_path(), config.busy_timeout()) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("Metadata cache unavailable: {}", e);
            None
        }
    };

    let summaries = summarize_mounts(config, db.as_ref());

    match format {
        OutputFormat::Json => write_json(writer, &summaries),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = summaries
                .iter()
                .map(|s| {
                    vec![
                        s.id.to_string(),
                        s.mount_point.clone(),
                        s.backend.clone(),
                        if s.notify { "yes" } else { "no" }.to_string(),
                        s.storage_ids
                            .as_ref()
                            .map(|ids| ids.iter().map(i64::to_string).collect::<Vec<_>>().join(","))
                            .unwrap_or_else(|| "?".to_string()),
                        s.error.clone().or_else(|| s.location.clone()).unwrap_or_default(),
                    ]
                })
                .collect();

            write_table(
                writer,
                &["ID", "Mount point", "Backend", "Notify", "Storages", "Location"],
                &rows,
            )
        }
    }
}
