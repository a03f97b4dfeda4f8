#![forbid(unsafe_code)]

//! Read-only view over one engine's state.
//!
//! Every query degrades gracefully: an unknown tab or key yields an empty
//! list, `None`, or the fallback color instead of an error.

use tabstrip_core::{GroupColor, GroupToken, PendingClosures, Tab, TabId, TabList};

use crate::hiding::HidingSet;
use crate::index::{self, GroupIndex, TabGroup};
use crate::visuals::Visuals;

/// Borrowed view of the sequence, group index, visual data and closure state.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    pub(crate) tabs: &'a TabList,
    pub(crate) index: &'a GroupIndex,
    pub(crate) visuals: &'a Visuals,
    pub(crate) hiding: &'a HidingSet,
    pub(crate) pending: &'a PendingClosures,
    pub(crate) restored: bool,
}

impl<'a> GroupView<'a> {
    #[must_use]
    pub fn tabs(&self) -> &'a TabList {
        self.tabs
    }

    #[must_use]
    pub fn index(&self) -> &'a GroupIndex {
        self.index
    }

    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<&'a Tab> {
        self.tabs.get_by_id(id)
    }

    /// Whether the initial load has finished.
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Number of groups, `None` until the initial load has finished.
    #[must_use]
    pub fn group_count(&self) -> Option<usize> {
        self.restored.then(|| self.index.group_count())
    }

    #[must_use]
    pub fn is_tab_in_group(&self, id: TabId) -> bool {
        self.tab(id).is_some_and(|tab| self.index.is_grouped(tab))
    }

    /// Group containing `id`, if grouped.
    #[must_use]
    pub fn group_of(&self, id: TabId) -> Option<&'a TabGroup> {
        self.tab(id).and_then(|tab| self.index.group_of(tab))
    }

    /// Ids of the tab's group in sequence order, or just the tab when ungrouped.
    #[must_use]
    pub fn related_tab_ids(&self, id: TabId) -> Vec<TabId> {
        match self.tab(id) {
            None => Vec::new(),
            Some(tab) => match self.index.group_of(tab) {
                Some(group) => group.members().to_vec(),
                None => vec![id],
            },
        }
    }

    /// Tabs of the tab's group in sequence order.
    #[must_use]
    pub fn related_tabs(&self, id: TabId) -> Vec<&'a Tab> {
        self.related_tab_ids(id)
            .into_iter()
            .filter_map(|member| self.tab(member))
            .collect()
    }

    /// Member count of the group keyed by `root`; 0 when unknown.
    #[must_use]
    pub fn group_size(&self, root: TabId) -> usize {
        self.index.group(root).map_or(0, TabGroup::len)
    }

    /// Position of `id` inside its group.
    #[must_use]
    pub fn index_in_group(&self, id: TabId) -> Option<usize> {
        self.group_of(id).and_then(|group| group.position_of(id))
    }

    /// Last shown member of the group keyed by `root`.
    #[must_use]
    pub fn last_shown(&self, root: TabId) -> Option<TabId> {
        self.index.group(root).map(TabGroup::last_shown)
    }

    #[must_use]
    pub fn root_for_token(&self, token: GroupToken) -> Option<TabId> {
        self.index.root_for_token(token)
    }

    #[must_use]
    pub fn token_for_root(&self, root: TabId) -> Option<GroupToken> {
        self.index.token_for_root(root)
    }

    #[must_use]
    pub fn group_roots(&self) -> Vec<TabId> {
        self.index.group_roots()
    }

    #[must_use]
    pub fn group_tokens(&self) -> Vec<GroupToken> {
        self.index.group_tokens()
    }

    #[must_use]
    pub fn representative_count(&self) -> usize {
        self.index.representative_count()
    }

    /// Tab shown at a representative position.
    #[must_use]
    pub fn representative_at(&self, ordinal: usize) -> Option<TabId> {
        self.index.representative_tab(ordinal)
    }

    /// Representative position of a tab's group (or of the tab itself).
    #[must_use]
    pub fn representative_index_of(&self, id: TabId) -> Option<usize> {
        self.tab(id).and_then(|tab| self.index.ordinal(tab.root_id))
    }

    /// Representative position of the tab at a sequence position.
    #[must_use]
    pub fn representative_index_at_position(&self, position: usize) -> Option<usize> {
        self.tabs
            .get(position)
            .and_then(|tab| self.index.ordinal(tab.root_id))
    }

    /// First sequence position covered by a representative.
    #[must_use]
    pub fn position_of_representative(&self, ordinal: usize) -> Option<usize> {
        let root = self.index.representative_root(ordinal)?;
        let first = *self.index.members(root).first()?;
        self.tabs.index_of(first)
    }

    /// Contiguity check over the whole sequence.
    #[must_use]
    pub fn is_order_valid(&self) -> bool {
        index::is_order_valid(self.tabs)
    }

    #[must_use]
    pub fn title(&self, root: TabId) -> Option<String> {
        self.visuals.title(root)
    }

    /// Stored color, or the fallback when unset.
    #[must_use]
    pub fn color(&self, root: TabId) -> GroupColor {
        self.visuals.color_or_fallback(root)
    }

    #[must_use]
    pub fn stored_color(&self, root: TabId) -> Option<GroupColor> {
        self.visuals.color(root)
    }

    #[must_use]
    pub fn collapsed(&self, root: TabId) -> bool {
        self.visuals.collapsed(root)
    }

    #[must_use]
    pub fn is_hiding(&self, token: GroupToken) -> bool {
        self.hiding.contains(token)
    }

    #[must_use]
    pub fn hiding(&self) -> &'a HidingSet {
        self.hiding
    }

    #[must_use]
    pub fn pending_closures(&self) -> &'a PendingClosures {
        self.pending
    }

    /// Whether `token` is still carried by a visible tab or a pending closure.
    #[must_use]
    pub fn token_in_comprehensive_model(&self, token: GroupToken) -> bool {
        self.tabs.iter().any(|tab| tab.group_token == Some(token))
            || self.pending.holds_token(token)
    }
}
