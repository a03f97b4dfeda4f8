//! Error types for group mutations and policy loading.

use tabstrip_core::TabId;
use thiserror::Error;

/// Rejected group mutation.
///
/// Every variant describes a caller-supplied precondition that did not hold;
/// the engine's state is untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("{id} is not in this collection")]
    TabNotFound { id: TabId },

    #[error("{id} belongs to another collection (tab incognito: {tab_incognito})")]
    CrossCollection { id: TabId, tab_incognito: bool },

    #[error("{id} is already in the collection")]
    AlreadyPresent { id: TabId },

    #[error("{id} is already in a group")]
    AlreadyGrouped { id: TabId },

    #[error("{id} has no pending closure")]
    NotPendingClosure { id: TabId },

    #[error("merge list is empty")]
    EmptyMergeList,
}

/// Failure to load a [`GroupPolicy`](crate::GroupPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_collection_names_both_sides() {
        let err = GroupError::CrossCollection {
            id: TabId::new(4),
            tab_incognito: true,
        };
        assert_eq!(
            err.to_string(),
            "tab#4 belongs to another collection (tab incognito: true)"
        );
    }

    #[test]
    fn missing_tab_message() {
        let err = GroupError::TabNotFound { id: TabId::new(9) };
        assert_eq!(err.to_string(), "tab#9 is not in this collection");
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
    }
}
