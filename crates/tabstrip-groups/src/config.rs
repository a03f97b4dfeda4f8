#![forbid(unsafe_code)]

//! Policy-as-data configuration for the group engine.
//!
//! # Loading
//!
//! ```toml
//! # tabstrip-groups.toml
//! stable_ids = true
//! hiding_enabled = true
//! fallback_color = "grey"
//! ```
//!
//! ```rust,ignore
//! let policy = GroupPolicy::from_toml_file("tabstrip-groups.toml")?;
//! let policy = GroupPolicy::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `GroupPolicy::default()` is the production behavior: stable keys are the
//! group identity, hiding is allowed, and a stored color marks a merge
//! destination as an existing group.

#[cfg(feature = "policy-config")]
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabstrip_core::GroupColor;

#[cfg(feature = "policy-config")]
use crate::error::ConfigError;

/// Tunable behavior of a [`TabGroupEngine`](crate::TabGroupEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPolicy {
    /// Treat the stable key as group identity. One-member groups exist only
    /// in this mode. When `false`, stable keys are stripped at restore and a
    /// group is any legacy key shared by two or more tabs.
    pub stable_ids: bool,
    /// Allow closed groups to be hidden instead of torn down. Ignored for
    /// incognito collections.
    pub hiding_enabled: bool,
    /// A merge destination that already has a stored color is an existing
    /// group (for example one restored from history), so the merge does not
    /// count as group creation.
    pub color_marks_existing_group: bool,
    /// Color reported for groups with no stored color.
    pub fallback_color: GroupColor,
    /// Upper bound on follow-up requests drained after one operation.
    pub max_follow_up_rounds: usize,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            stable_ids: true,
            hiding_enabled: true,
            color_marks_existing_group: true,
            fallback_color: GroupColor::Grey,
            max_follow_up_rounds: 64,
        }
    }
}

impl GroupPolicy {
    /// Policy for a collection that predates stable keys.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            stable_ids: false,
            hiding_enabled: false,
            ..Self::default()
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|err| ConfigError::Toml(err.to_string()))
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|err| ConfigError::Json(err.to_string()))
    }

    /// Load a TOML file and reject it if validation reports anything.
    #[cfg(feature = "policy-config")]
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let policy = Self::from_toml_file(path)?;
        let errors = policy.validate();
        if errors.is_empty() {
            Ok(policy)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate parameters. An empty list means the policy is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_follow_up_rounds == 0 {
            errors.push("max_follow_up_rounds must be > 0".into());
        }
        if !self.stable_ids && self.hiding_enabled {
            errors.push("hiding_enabled requires stable_ids (hidden groups are keyed by token)".into());
        }
        errors
    }

    /// Whether hiding applies to a collection with the given incognito flag.
    #[must_use]
    pub const fn can_hide(&self, incognito: bool) -> bool {
        self.hiding_enabled && self.stable_ids && !incognito
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(GroupPolicy::default().validate().is_empty());
    }

    #[test]
    fn legacy_policy_is_valid() {
        assert!(GroupPolicy::legacy().validate().is_empty());
    }

    #[test]
    fn hiding_without_stable_ids_is_flagged() {
        let policy = GroupPolicy {
            hiding_enabled: true,
            ..GroupPolicy::legacy()
        };
        let errors = policy.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("hiding_enabled"));
    }

    #[test]
    fn incognito_never_hides() {
        let policy = GroupPolicy::default();
        assert!(policy.can_hide(false));
        assert!(!policy.can_hide(true));
    }

    #[test]
    fn zero_follow_up_rounds_rejected() {
        let policy = GroupPolicy {
            max_follow_up_rounds: 0,
            ..GroupPolicy::default()
        };
        assert!(!policy.validate().is_empty());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn toml_overrides_selected_fields() {
        let policy = GroupPolicy::from_toml_str(
            "stable_ids = false\nhiding_enabled = false\nfallback_color = \"blue\"\n",
        )
        .expect("valid toml");
        assert!(!policy.stable_ids);
        assert_eq!(policy.fallback_color, GroupColor::Blue);
        assert_eq!(policy.max_follow_up_rounds, 64);
        assert!(policy.validate().is_empty());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn json_parse_error_is_reported() {
        let err = GroupPolicy::from_json_str("{ not json").expect_err("invalid");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
