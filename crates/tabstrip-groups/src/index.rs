#![forbid(unsafe_code)]

//! Group index: which tabs form which groups, and in what order.
//!
//! # Design
//!
//! The index keeps one *slot* per distinct legacy key (root id) present in
//! the [`TabList`]. A slot is either a single ungrouped tab or a
//! [`TabGroup`]. Only groups are exposed as group records; singles exist so
//! the representative list (one entry per group plus one per ungrouped tab)
//! and move classification can be answered without scanning the sequence.
//!
//! A slot is a group when it has two or more members or any member carries a
//! stable token.
//!
//! # Invariants
//!
//! After [`GroupIndex::resync`] or [`GroupIndex::reorder`]:
//!
//! 1. `order` lists every slot key exactly once, by first occurrence in the
//!    sequence, and `ordinals` is its inverse.
//! 2. A group's `members` are in sequence order.
//! 3. `tokens` maps each group token to the first group carrying it.
//! 4. A group's `last_shown` is one of its members.
//!
//! # Failure Modes
//!
//! The index never repairs legacy keys on its own. A slot whose key is not
//! one of its members is reported by [`GroupIndex::stale_roots`] and fixed by
//! the engine's fix-up pass.

use rustc_hash::{FxHashMap, FxHashSet};
use tabstrip_core::{GroupToken, Tab, TabId, TabList};

/// One group of contiguous tabs sharing a legacy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    root: TabId,
    token: Option<GroupToken>,
    members: Vec<TabId>,
    last_shown: TabId,
}

impl TabGroup {
    fn new(root: TabId, first: TabId, token: Option<GroupToken>) -> Self {
        Self {
            root,
            token,
            members: vec![first],
            last_shown: first,
        }
    }

    /// Legacy key.
    #[must_use]
    pub const fn root(&self) -> TabId {
        self.root
    }

    /// Stable key.
    #[must_use]
    pub const fn token(&self) -> Option<GroupToken> {
        self.token
    }

    /// Member ids in sequence order.
    #[must_use]
    pub fn members(&self) -> &[TabId] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.members.contains(&id)
    }

    /// Position of `id` inside the group.
    #[must_use]
    pub fn position_of(&self, id: TabId) -> Option<usize> {
        self.members.iter().position(|member| *member == id)
    }

    #[must_use]
    pub fn last_shown(&self) -> TabId {
        self.last_shown
    }

    /// Member that takes over as last shown if `leaving` goes away: the
    /// member after it, else the one before it.
    #[must_use]
    pub fn successor_of(&self, leaving: TabId) -> Option<TabId> {
        if self.last_shown != leaving {
            return Some(self.last_shown);
        }
        let pos = self.position_of(leaving)?;
        self.members
            .get(pos + 1)
            .or_else(|| pos.checked_sub(1).and_then(|prev| self.members.get(prev)))
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Single(TabId),
    Group(TabGroup),
}

impl Slot {
    fn new(root: TabId, tab: &Tab) -> Self {
        match tab.group_token {
            Some(token) => Self::Group(TabGroup::new(root, tab.id, Some(token))),
            None => Self::Single(tab.id),
        }
    }

    fn push(&mut self, root: TabId, tab: &Tab) {
        match self {
            Self::Single(first) => {
                let mut group = TabGroup::new(root, *first, tab.group_token);
                group.members.push(tab.id);
                *self = Self::Group(group);
            }
            Self::Group(group) => {
                group.members.push(tab.id);
                if group.token.is_none() {
                    group.token = tab.group_token;
                }
            }
        }
    }

    fn members(&self) -> &[TabId] {
        match self {
            Self::Single(id) => std::slice::from_ref(id),
            Self::Group(group) => &group.members,
        }
    }

    fn as_group(&self) -> Option<&TabGroup> {
        match self {
            Self::Single(_) => None,
            Self::Group(group) => Some(group),
        }
    }
}

/// Maps between tabs, legacy keys, stable keys, and representative order.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    slots: FxHashMap<TabId, Slot>,
    order: Vec<TabId>,
    ordinals: FxHashMap<TabId, usize>,
    tokens: FxHashMap<GroupToken, TabId>,
}

impl GroupIndex {
    /// Build an index for `tabs`.
    #[must_use]
    pub fn build(tabs: &TabList) -> Self {
        let mut index = Self::default();
        index.resync(tabs);
        index
    }

    /// Full O(n) rebuild from the sequence.
    ///
    /// Last-shown members survive when they still belong to the group under
    /// the same key. The active tab is then marked last shown in its group.
    pub fn resync(&mut self, tabs: &TabList) {
        let previous_last_shown: FxHashMap<TabId, TabId> = self
            .groups()
            .map(|group| (group.root, group.last_shown))
            .collect();

        self.slots.clear();
        self.order.clear();
        for tab in tabs {
            let root = tab.root_id;
            match self.slots.get_mut(&root) {
                Some(slot) => slot.push(root, tab),
                None => {
                    self.slots.insert(root, Slot::new(root, tab));
                    self.order.push(root);
                }
            }
        }

        for (root, last_shown) in previous_last_shown {
            if let Some(Slot::Group(group)) = self.slots.get_mut(&root)
                && group.contains(last_shown)
            {
                group.last_shown = last_shown;
            }
        }
        self.rebuild_lookups();
        self.select_active(tabs);
    }

    /// Incremental path for moves that keep every tab's legacy key.
    ///
    /// Member order and representative order are re-derived; slots, tokens
    /// and last-shown members are kept.
    pub fn reorder(&mut self, tabs: &TabList) {
        for slot in self.slots.values_mut() {
            if let Slot::Group(group) = slot {
                group.members.clear();
            }
        }
        self.order.clear();
        let mut seen = FxHashSet::default();
        for tab in tabs {
            let root = tab.root_id;
            if seen.insert(root) {
                self.order.push(root);
            }
            match self.slots.get_mut(&root) {
                Some(Slot::Group(group)) => group.members.push(tab.id),
                Some(Slot::Single(_)) => {}
                None => {
                    self.slots.insert(root, Slot::new(root, tab));
                }
            }
        }
        self.slots.retain(|root, _| seen.contains(root));
        for slot in self.slots.values_mut() {
            if let Slot::Group(group) = slot
                && !group.contains(group.last_shown)
                && let Some(first) = group.members.first()
            {
                group.last_shown = *first;
            }
        }
        self.rebuild_lookups();
    }

    fn rebuild_lookups(&mut self) {
        self.ordinals = self
            .order
            .iter()
            .enumerate()
            .map(|(ordinal, root)| (*root, ordinal))
            .collect();
        self.tokens.clear();
        for root in &self.order {
            if let Some(Slot::Group(group)) = self.slots.get(root)
                && let Some(token) = group.token
            {
                self.tokens.entry(token).or_insert(*root);
            }
        }
    }

    fn select_active(&mut self, tabs: &TabList) {
        if let Some(active) = tabs.active().and_then(|id| tabs.get_by_id(id)) {
            self.set_last_shown(active);
        }
    }

    /// Mark `tab` as the last shown member of its group.
    pub fn set_last_shown(&mut self, tab: &Tab) -> bool {
        match self.slots.get_mut(&tab.root_id) {
            Some(Slot::Group(group)) if group.contains(tab.id) => {
                group.last_shown = tab.id;
                true
            }
            _ => false,
        }
    }

    /// Move a slot to a new legacy key ahead of a resync, so last-shown
    /// state follows the rename.
    pub fn rekey(&mut self, old_root: TabId, new_root: TabId) {
        if let Some(mut slot) = self.slots.remove(&old_root) {
            if let Slot::Group(group) = &mut slot {
                group.root = new_root;
            }
            self.slots.insert(new_root, slot);
        }
    }

    // ---------------------------------------------------------------------
    // Group queries
    // ---------------------------------------------------------------------

    /// Group recorded under a legacy key.
    #[must_use]
    pub fn group(&self, root: TabId) -> Option<&TabGroup> {
        self.slots.get(&root).and_then(Slot::as_group)
    }

    /// Group containing `tab`, if it is grouped.
    #[must_use]
    pub fn group_of(&self, tab: &Tab) -> Option<&TabGroup> {
        self.group(tab.root_id)
            .filter(|group| group.contains(tab.id))
    }

    /// Whether `tab` is a member of a group.
    #[must_use]
    pub fn is_grouped(&self, tab: &Tab) -> bool {
        self.group_of(tab).is_some()
    }

    /// Every group in representative order.
    pub fn groups(&self) -> impl Iterator<Item = &TabGroup> {
        self.order
            .iter()
            .filter_map(|root| self.slots.get(root))
            .filter_map(Slot::as_group)
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    /// Legacy keys of every group, in representative order.
    #[must_use]
    pub fn group_roots(&self) -> Vec<TabId> {
        self.groups().map(TabGroup::root).collect()
    }

    /// Stable keys of every group, in representative order.
    #[must_use]
    pub fn group_tokens(&self) -> Vec<GroupToken> {
        self.groups().filter_map(TabGroup::token).collect()
    }

    #[must_use]
    pub fn root_for_token(&self, token: GroupToken) -> Option<TabId> {
        self.tokens.get(&token).copied()
    }

    #[must_use]
    pub fn token_for_root(&self, root: TabId) -> Option<GroupToken> {
        self.group(root).and_then(TabGroup::token)
    }

    // ---------------------------------------------------------------------
    // Slot queries (groups and single tabs)
    // ---------------------------------------------------------------------

    /// Whether any tab uses `root` as legacy key.
    #[must_use]
    pub fn has_slot(&self, root: TabId) -> bool {
        self.slots.contains_key(&root)
    }

    /// Members recorded under `root`; empty when the key is unknown.
    #[must_use]
    pub fn members(&self, root: TabId) -> &[TabId] {
        self.slots.get(&root).map_or(&[], Slot::members)
    }

    /// Legacy key of the slot that currently lists `id` as a member.
    ///
    /// Unlike a lookup by the tab's own `root_id`, this reflects the index
    /// as of the last resync, so it still answers while keys are rewritten.
    #[must_use]
    pub fn root_listing(&self, id: TabId) -> Option<TabId> {
        self.slots
            .iter()
            .find(|(_, slot)| slot.members().contains(&id))
            .map(|(root, _)| *root)
    }

    /// Slot keys that are not one of their own members.
    #[must_use]
    pub fn stale_roots(&self) -> Vec<TabId> {
        self.order
            .iter()
            .copied()
            .filter(|root| !self.members(*root).contains(root))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Representative list
    // ---------------------------------------------------------------------

    /// Number of representatives: groups plus ungrouped tabs.
    #[must_use]
    pub fn representative_count(&self) -> usize {
        self.order.len()
    }

    /// Representative position of a legacy key.
    #[must_use]
    pub fn ordinal(&self, root: TabId) -> Option<usize> {
        self.ordinals.get(&root).copied()
    }

    /// Legacy key at a representative position.
    #[must_use]
    pub fn representative_root(&self, ordinal: usize) -> Option<TabId> {
        self.order.get(ordinal).copied()
    }

    /// Tab shown for a representative: a group's last shown member, or the
    /// ungrouped tab itself.
    #[must_use]
    pub fn representative_tab(&self, ordinal: usize) -> Option<TabId> {
        let root = self.representative_root(ordinal)?;
        match self.slots.get(&root)? {
            Slot::Single(id) => Some(*id),
            Slot::Group(group) => Some(group.last_shown),
        }
    }
}

/// Whether every legacy key occupies one contiguous run of the sequence.
#[must_use]
pub fn is_order_valid(tabs: &TabList) -> bool {
    let mut finished: FxHashSet<TabId> = FxHashSet::default();
    let mut current: Option<TabId> = None;
    for tab in tabs {
        if current == Some(tab.root_id) {
            continue;
        }
        if finished.contains(&tab.root_id) {
            return false;
        }
        if let Some(previous) = current {
            finished.insert(previous);
        }
        current = Some(tab.root_id);
    }
    true
}
