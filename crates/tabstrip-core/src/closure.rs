#![forbid(unsafe_code)]

//! Ledger of closures that can still be undone.
//!
//! A tab closed with undo allowed leaves the visible [`TabList`] but stays in
//! the *comprehensive* model until the closure is committed or cancelled.
//!
//! [`TabList`]: crate::TabList

use serde::{Deserialize, Serialize};

use crate::id::{GroupToken, TabId};
use crate::tab::Tab;

/// One tab awaiting commit or undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClosure {
    pub tab: Tab,
    /// Index the tab occupied when it was closed.
    pub index: usize,
}

/// Pending closures in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClosures {
    entries: Vec<PendingClosure>,
}

impl PendingClosures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tab: Tab, index: usize) {
        self.entries.push(PendingClosure { tab, index });
    }

    /// Remove and return the pending closure for `id`.
    pub fn take(&mut self, id: TabId) -> Option<PendingClosure> {
        let pos = self.entries.iter().position(|entry| entry.tab.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Remove and return every pending closure, oldest first.
    pub fn drain(&mut self) -> Vec<PendingClosure> {
        std::mem::take(&mut self.entries)
    }

    /// Id of the oldest pending closure.
    #[must_use]
    pub fn oldest_id(&self) -> Option<TabId> {
        self.entries.first().map(|entry| entry.tab.id)
    }

    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.entries.iter().any(|entry| entry.tab.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingClosure> {
        self.entries.iter()
    }

    pub fn tabs_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.entries.iter_mut().map(|entry| &mut entry.tab)
    }

    /// Whether any pending tab still carries `token`.
    #[must_use]
    pub fn holds_token(&self, token: GroupToken) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.tab.group_token == Some(token))
    }
}
