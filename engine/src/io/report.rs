//! Outcome summaries of save and load operations
//!
//! Failures of individual entities do not abort an operation; they are
//! collected here so callers can show them to the user.

use crate::core::entity::EntityKind;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One entity that could not be written, read or linked
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub entity_id: Option<String>,
    pub path: Option<PathBuf>,
    pub error: String,
}

impl EntityFailure {
    pub fn new(kind: EntityKind, error: impl ToString) -> Self {
        Self {
            kind,
            entity_id: None,
            path: None,
            error: error.to_string(),
        }
    }

    pub fn with_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.entity_id, &self.path) {
            (Some(id), _) => write!(f, "Failed to handle {} {id}: {}", self.kind, self.error),
            (None, Some(path)) => write!(f, "Failed to handle {} {}: {}", self.kind, path.display(), self.error),
            (None, None) => write!(f, "Failed to handle {}: {}", self.kind, self.error),
        }
    }
}

/// Result of a scene save
#[derive(Debug, Default, Clone)]
pub struct SaveReport {
    /// Files written successfully
    pub written: Vec<PathBuf>,
    /// Stale files removed by the sweep
    pub removed: Vec<PathBuf>,
    pub failures: Vec<EntityFailure>,
}

impl SaveReport {
    /// True when every entity was written and every stale file removed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a scene load
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    /// Number of entities created, per kind
    pub loaded: BTreeMap<EntityKind, usize>,
    /// Stable ids of entities whose parent reference matched nothing
    pub unresolved_parents: Vec<String>,
    pub failures: Vec<EntityFailure>,
}

impl LoadReport {
    pub fn count(&self, kind: EntityKind) -> usize {
        self.loaded.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, kind: EntityKind) {
        *self.loaded.entry(kind).or_insert(0) += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = EntityFailure::new(EntityKind::Mesh, "disk full").with_id("crate");
        assert_eq!(failure.to_string(), "Failed to handle mesh crate: disk full");

        let failure = EntityFailure::new(EntityKind::Light, "bad json").with_path("lights/x.json");
        assert_eq!(failure.to_string(), "Failed to handle light lights/x.json: bad json");
    }

    #[test]
    fn test_load_report_counts() {
        let mut report = LoadReport::default();
        report.record(EntityKind::Mesh);
        report.record(EntityKind::Mesh);
        assert_eq!(report.count(EntityKind::Mesh), 2);
        assert_eq!(report.count(EntityKind::Light), 0);
        assert!(report.is_complete());
    }
}
