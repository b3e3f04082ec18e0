//! Type definitions for storage change events
//!
//! Paths are rooted storage paths (`/docs/report.txt`), relative to the root
//! of the storage the subscription belongs to.

use std::fmt;

/// One observed change inside a storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: String,
    pub kind: ChangeKind,
}

/// Types of changes a notify subscription reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    /// `path` was renamed to `target`
    Renamed { target: String },
}

impl ChangeEvent {
    pub fn added(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Added,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Modified,
        }
    }

    pub fn removed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Removed,
        }
    }

    pub fn renamed(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Renamed {
                target: target.into(),
            },
        }
    }

    /// Rename destination, `None` for every other kind
    pub fn target_path(&self) -> Option<&str> {
        match &self.kind {
            ChangeKind::Renamed { target } => Some(target),
            _ => None,
        }
    }
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Renamed { .. } => "renamed",
        }
    }
}

/// `<kind> <path>[ to <target>]`
impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.path)?;
        if let Some(target) = self.target_path() {
            write!(f, " to {}", target)?;
        }
        Ok(())
    }
}
