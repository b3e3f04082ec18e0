//! Ignore patterns for change events
//!
//! Patterns are globs matched against the normalized storage path
//! (`docs/.git/HEAD`, no leading slash).

use crate::utils::paths::normalize_path;
use crate::watcher::types::ChangeEvent;

#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches_path(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.patterns.iter().any(|p| p.matches(&normalized))
    }

    /// An event is dropped only when every path it touches is ignored, so a
    /// rename out of an ignored folder still reaches the cache.
    pub fn is_ignored(&self, event: &ChangeEvent) -> bool {
        if self.is_empty() || !self.matches_path(&event.path) {
            return false;
        }
        event
            .target_path()
            .is_none_or(|target| self.matches_path(target))
    }
}
