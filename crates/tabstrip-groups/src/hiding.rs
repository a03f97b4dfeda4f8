#![forbid(unsafe_code)]

//! Groups whose closure is pending and may be restored.

use rustc_hash::FxHashSet;
use tabstrip_core::GroupToken;

/// Stable keys currently marked hiding.
///
/// Lifecycle: inserted at close-request time, removed when any member of
/// the group is restored, and consumed at commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HidingSet {
    tokens: FxHashSet<GroupToken>,
}

impl HidingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `token` hiding. Returns `true` if it was not already marked.
    pub fn insert(&mut self, token: GroupToken) -> bool {
        self.tokens.insert(token)
    }

    /// Clear the mark. Returns whether it was set.
    pub fn remove(&mut self, token: GroupToken) -> bool {
        self.tokens.remove(&token)
    }

    #[must_use]
    pub fn contains(&self, token: GroupToken) -> bool {
        self.tokens.contains(&token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GroupToken> + '_ {
        self.tokens.iter().copied()
    }
}
