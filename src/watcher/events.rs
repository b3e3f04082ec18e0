//! File system event processing
//!
//! Converts raw `notify::Event`s into storage-relative [`ChangeEvent`]s.

use crate::utils::paths::to_storage_path;
use crate::watcher::types::ChangeEvent;
use notify::event::{MetadataKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Translate one watcher event into zero or more change events.
///
/// inotify reports both halves of a rename and then the paired event, so a
/// single rename can produce removed + added + renamed. Invalidating the same
/// parents more than once is harmless.
pub fn convert_event(root: &Path, event: Event) -> Vec<ChangeEvent> {
    debug!("Processing file system event: {:?}", event);

    let paths = event.paths;
    match event.kind {
        EventKind::Create(_) => map_paths(root, &paths, ChangeEvent::added),
        EventKind::Remove(_) => map_paths(root, &paths, ChangeEvent::removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
            match (
                to_storage_path(&paths[0], root),
                to_storage_path(&paths[1], root),
            ) {
                (Some(from), Some(to)) => vec![ChangeEvent::renamed(from, to)],
                // One side left the watched tree
                (Some(from), None) => vec![ChangeEvent::removed(from)],
                (None, Some(to)) => vec![ChangeEvent::added(to)],
                (None, None) => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            map_paths(root, &paths, ChangeEvent::removed)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            map_paths(root, &paths, ChangeEvent::added)
        }
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => Vec::new(),
        EventKind::Modify(_) => map_paths(root, &paths, ChangeEvent::modified),
        other => {
            debug!("Ignoring event kind: {:?}", other);
            Vec::new()
        }
    }
}

fn map_paths(root: &Path, paths: &[PathBuf], build: fn(String) -> ChangeEvent) -> Vec<ChangeEvent> {
    paths
        .iter()
        .filter_map(|path| match to_storage_path(path, root) {
            Some(storage_path) => Some(build(storage_path)),
            None => {
                debug!("Skipping path outside storage root: {}", path.display());
                None
            }
        })
        .collect()
}
