#![forbid(unsafe_code)]

//! Ordered tab sequence.
//!
//! [`TabList`] owns the tabs of one collection (regular or incognito) in
//! display order and tracks the active tab.
//!
//! # Move semantics
//!
//! [`TabList::move_tab`] takes an *insert-before* index expressed in
//! pre-removal coordinates, clamped to `[0, len]`:
//!
//! - `new_index == old` or `new_index == old + 1` leaves the tab where it is
//!   and reports no move;
//! - moving forward (`new_index > old + 1`) lands the tab at `new_index - 1`;
//! - moving backward lands the tab at `new_index`.
//!
//! Every effective move returns exactly one [`TabMove`]; the owner of the
//! list is expected to feed it into its positional-change handling.

use serde::{Deserialize, Serialize};

use crate::id::TabId;
use crate::tab::Tab;

/// A completed positional change of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabMove {
    pub tab: TabId,
    /// Final index after the move.
    pub to: usize,
    /// Index before the move.
    pub from: usize,
}

/// Mutable ordered list of tabs with stable identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabList {
    incognito: bool,
    tabs: Vec<Tab>,
    active: Option<TabId>,
}

impl TabList {
    /// Empty regular collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty collection with the given incognito flag.
    #[must_use]
    pub fn with_incognito(incognito: bool) -> Self {
        Self {
            incognito,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_incognito(&self) -> bool {
        self.incognito
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    #[must_use]
    pub fn get_by_id(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    #[must_use]
    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tab> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Tab> {
        self.tabs.iter_mut()
    }

    /// Tab ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|tab| tab.id).collect()
    }

    /// Insert `tab` before `index` (clamped to the end). Returns the final index.
    pub fn insert(&mut self, index: usize, tab: Tab) -> usize {
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, tab);
        index
    }

    /// Append `tab` at the end. Returns its index.
    pub fn push(&mut self, tab: Tab) -> usize {
        self.tabs.push(tab);
        self.tabs.len() - 1
    }

    /// Remove a tab by id, returning it with the index it occupied.
    ///
    /// Removing the active tab clears the active selection.
    pub fn remove(&mut self, id: TabId) -> Option<(usize, Tab)> {
        let index = self.index_of(id)?;
        let tab = self.tabs.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        Some((index, tab))
    }

    /// Move a tab using insert-before semantics (see module docs).
    pub fn move_tab(&mut self, id: TabId, new_index: usize) -> Option<TabMove> {
        let new_index = new_index.min(self.tabs.len());
        let from = self.index_of(id)?;
        if from == new_index || from + 1 == new_index {
            return None;
        }
        let tab = self.tabs.remove(from);
        let to = if from < new_index {
            new_index - 1
        } else {
            new_index
        };
        self.tabs.insert(to, tab);
        Some(TabMove { tab: id, to, from })
    }

    /// Mark a tab active. Returns `false` if the id is unknown.
    pub fn select(&mut self, id: TabId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    #[must_use]
    pub const fn active(&self) -> Option<TabId> {
        self.active
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.index_of(id))
    }
}

impl<'a> IntoIterator for &'a TabList {
    type Item = &'a Tab;
    type IntoIter = std::slice::Iter<'a, Tab>;

    fn into_iter(self) -> Self::IntoIter {
        self.tabs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: u32) -> TabList {
        let mut list = TabList::new();
        for id in 1..=n {
            list.push(Tab::new(id));
        }
        list
    }

    fn order(list: &TabList) -> Vec<u32> {
        list.iter().map(|tab| tab.id.get()).collect()
    }

    #[test]
    fn move_to_same_or_next_slot_is_noop() {
        let mut tabs = list(4);
        assert_eq!(tabs.move_tab(TabId::new(2), 1), None);
        assert_eq!(tabs.move_tab(TabId::new(2), 2), None);
        assert_eq!(order(&tabs), vec![1, 2, 3, 4]);
    }

    #[test]
    fn forward_move_lands_before_insert_index() {
        let mut tabs = list(4);
        let mv = tabs.move_tab(TabId::new(1), 3).expect("moved");
        assert_eq!(mv, TabMove { tab: TabId::new(1), to: 2, from: 0 });
        assert_eq!(order(&tabs), vec![2, 3, 1, 4]);
    }

    #[test]
    fn backward_move_lands_at_insert_index() {
        let mut tabs = list(4);
        let mv = tabs.move_tab(TabId::new(4), 1).expect("moved");
        assert_eq!(mv.to, 1);
        assert_eq!(mv.from, 3);
        assert_eq!(order(&tabs), vec![1, 4, 2, 3]);
    }

    #[test]
    fn move_index_clamps_to_len() {
        let mut tabs = list(3);
        let mv = tabs.move_tab(TabId::new(1), 99).expect("moved");
        assert_eq!(mv.to, 2);
        assert_eq!(order(&tabs), vec![2, 3, 1]);
    }

    #[test]
    fn unknown_tab_does_not_move() {
        let mut tabs = list(2);
        assert_eq!(tabs.move_tab(TabId::new(9), 0), None);
    }

    #[test]
    fn removing_active_tab_clears_selection() {
        let mut tabs = list(3);
        assert!(tabs.select(TabId::new(2)));
        assert_eq!(tabs.active_index(), Some(1));
        let (index, tab) = tabs.remove(TabId::new(2)).expect("removed");
        assert_eq!(index, 1);
        assert_eq!(tab.id, TabId::new(2));
        assert_eq!(tabs.active(), None);
    }

    #[test]
    fn insert_clamps_to_end() {
        let mut tabs = list(2);
        assert_eq!(tabs.insert(10, Tab::new(5)), 2);
        assert_eq!(order(&tabs), vec![1, 2, 5]);
    }
}
