#![forbid(unsafe_code)]

//! Visual group metadata: title, color, collapsed state.
//!
//! Metadata is keyed by the legacy group key (the root [`TabId`]). Storage is
//! pluggable through [`VisualStore`]; [`InMemoryVisualStore`] is the
//! reference implementation and is serializable so hosts can persist it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::TabId;

/// Tab group color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    /// Every palette entry in display order.
    pub const ALL: [Self; 9] = [
        Self::Grey,
        Self::Blue,
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Pink,
        Self::Purple,
        Self::Cyan,
        Self::Orange,
    ];
}

/// All visual metadata stored for one group key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVisuals {
    pub title: Option<String>,
    pub color: Option<GroupColor>,
    pub collapsed: bool,
}

impl GroupVisuals {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.color.is_none() && !self.collapsed
    }
}

/// Key-value contract for visual group metadata.
///
/// `None` color is the "unset" sentinel. An absent collapsed entry reads as
/// `false`.
pub trait VisualStore {
    fn title(&self, root: TabId) -> Option<String>;
    fn set_title(&mut self, root: TabId, title: &str);
    fn delete_title(&mut self, root: TabId);

    fn color(&self, root: TabId) -> Option<GroupColor>;
    fn set_color(&mut self, root: TabId, color: GroupColor);
    fn delete_color(&mut self, root: TabId);

    fn collapsed(&self, root: TabId) -> bool;
    fn set_collapsed(&mut self, root: TabId, collapsed: bool);
    fn delete_collapsed(&mut self, root: TabId);

    /// Read every attribute for `root` at once.
    fn snapshot(&self, root: TabId) -> GroupVisuals {
        GroupVisuals {
            title: self.title(root),
            color: self.color(root),
            collapsed: self.collapsed(root),
        }
    }
}

/// In-memory [`VisualStore`] backed by ordered maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryVisualStore {
    titles: BTreeMap<TabId, String>,
    colors: BTreeMap<TabId, GroupColor>,
    collapsed: BTreeMap<TabId, bool>,
}

impl InMemoryVisualStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys that carry at least one attribute.
    #[must_use]
    pub fn keys(&self) -> Vec<TabId> {
        let mut keys: Vec<TabId> = self
            .titles
            .keys()
            .chain(self.colors.keys())
            .chain(self.collapsed.keys())
            .copied()
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

impl VisualStore for InMemoryVisualStore {
    fn title(&self, root: TabId) -> Option<String> {
        self.titles.get(&root).cloned()
    }

    fn set_title(&mut self, root: TabId, title: &str) {
        self.titles.insert(root, title.to_owned());
    }

    fn delete_title(&mut self, root: TabId) {
        self.titles.remove(&root);
    }

    fn color(&self, root: TabId) -> Option<GroupColor> {
        self.colors.get(&root).copied()
    }

    fn set_color(&mut self, root: TabId, color: GroupColor) {
        self.colors.insert(root, color);
    }

    fn delete_color(&mut self, root: TabId) {
        self.colors.remove(&root);
    }

    fn collapsed(&self, root: TabId) -> bool {
        self.collapsed.get(&root).copied().unwrap_or(false)
    }

    fn set_collapsed(&mut self, root: TabId, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(root, true);
        } else {
            self.collapsed.remove(&root);
        }
    }

    fn delete_collapsed(&mut self, root: TabId) {
        self.collapsed.remove(&root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_color_reads_none() {
        let store = InMemoryVisualStore::new();
        assert_eq!(store.color(TabId::new(1)), None);
        assert!(!store.collapsed(TabId::new(1)));
    }

    #[test]
    fn snapshot_reads_all_attributes() {
        let mut store = InMemoryVisualStore::new();
        let root = TabId::new(4);
        store.set_title(root, "Work");
        store.set_color(root, GroupColor::Blue);
        store.set_collapsed(root, true);
        let snap = store.snapshot(root);
        assert_eq!(snap.title.as_deref(), Some("Work"));
        assert_eq!(snap.color, Some(GroupColor::Blue));
        assert!(snap.collapsed);
        assert_eq!(store.keys(), vec![root]);
    }

    #[test]
    fn clearing_collapsed_drops_the_entry() {
        let mut store = InMemoryVisualStore::new();
        let root = TabId::new(2);
        store.set_collapsed(root, true);
        store.set_collapsed(root, false);
        assert!(store.keys().is_empty());
        assert!(store.snapshot(root).is_empty());
    }

    #[test]
    fn store_round_trips_through_json() {
        let mut store = InMemoryVisualStore::new();
        store.set_title(TabId::new(1), "Research");
        store.set_color(TabId::new(1), GroupColor::Cyan);
        let json = serde_json::to_string(&store).expect("serialize");
        let back: InMemoryVisualStore = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, store);
    }
}
