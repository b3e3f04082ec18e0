//! Storage path handling
//!
//! Paths inside a storage are `/`-separated and relative to the storage root.
//! The metadata cache keys directory entries by the MD5 of the *normalized*
//! path, so every lookup must go through [`normalize_path`] first or the
//! invalidation will silently miss its row.

use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Normalize a storage path the way the metadata cache stores it.
///
/// NFC-normalizes, drops empty and `.` segments, and trims slashes from both
/// ends. The storage root normalizes to the empty string.
pub fn normalize_path(path: &str) -> String {
    let composed: String = path.nfc().collect();

    composed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalized parent directory of `path`. The root (and any top-level entry)
/// has the empty path as its parent, never `.`.
pub fn parent_path(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

/// Lookup key for a cached directory entry: hex MD5 of the normalized path.
pub fn path_hash(path: &str) -> String {
    format!("{:x}", md5::compute(normalize_path(path).as_bytes()))
}

/// Join a storage prefix and a relative name into a rooted storage path
/// (`/prefix/name`, or `/name` when the prefix is the root).
pub fn join_storage_path(prefix: &str, name: &str) -> String {
    let prefix = normalize_path(prefix);
    let name = name.trim_matches('/');
    if prefix.is_empty() {
        format!("/{}", name)
    } else {
        format!("/{}/{}", prefix, name)
    }
}

/// Convert an absolute filesystem path reported by a watcher into a rooted
/// storage path (`/docs/report.txt`). Returns `None` for paths outside `root`
/// or paths that are not valid UTF-8.
pub fn to_storage_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }

    Some(format!("/{}", segments.join("/")))
}
