//! Group creation and merging.
//!
//! All merges share [`TabGroupEngine::merge_into`]:
//!
//! 1. decide whether the merge creates a group (before anything mutates);
//! 2. emit one will-merge per participant, in input order;
//! 3. relocate every participant into one block right after the
//!    destination's group, in input order, and assign the destination keys;
//! 4. resync, then emit did-merge per participant followed by the
//!    aggregates.
//!
//! Relocation uses insert-before indices. A participant before the block
//! (`backward`) is moved to the current block end, which shifts the group
//! left by one, so the end index stays put. A participant after the block
//! (`forward`) is moved to the block end, which then grows by one.

use rustc_hash::FxHashSet;
use tabstrip_core::{GroupToken, TabId};

use super::TabGroupEngine;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::{GroupEvent, RemovalReason, UndoMetadata};

/// Source group that lost members to a merge.
struct SourceGroup {
    root: TabId,
    token: Option<GroupToken>,
}

impl TabGroupEngine {
    /// Promote a single ungrouped tab into a one-member group.
    ///
    /// Uses `desired` as stable key when given, otherwise mints one.
    pub fn create_single_tab_group(
        &mut self,
        id: TabId,
        desired: Option<GroupToken>,
    ) -> Result<GroupToken, GroupError> {
        self.run(|engine| engine.create_group(id, desired, true))
    }

    /// Merge the group containing `source` (or `source` alone) into the
    /// group containing `destination`. Members keep their sequence order.
    pub fn merge_tabs_to_group(
        &mut self,
        source: TabId,
        destination: TabId,
    ) -> Result<(), GroupError> {
        self.run(|engine| engine.merge_tabs(source, destination))
    }

    /// Merge an explicit list of tabs into `destination`'s group. The block
    /// after the destination follows the order of `tabs`.
    ///
    /// With `notify` set, an extended group carries its undo snapshot in
    /// [`GroupEvent::GroupExtended`].
    pub fn merge_list_to_group(
        &mut self,
        tabs: &[TabId],
        destination: TabId,
        notify: bool,
    ) -> Result<(), GroupError> {
        self.run(|engine| engine.merge_list(tabs, destination, notify))
    }

    pub(crate) fn create_group(
        &mut self,
        id: TabId,
        desired: Option<GroupToken>,
        notify: bool,
    ) -> Result<GroupToken, GroupError> {
        let _span = tracing::info_span!("tabstrip.create_group", tab = id.get()).entered();
        let tab = self.snapshot_tab(id)?;
        if self.index.is_grouped(&tab) {
            return Err(GroupError::AlreadyGrouped { id });
        }
        let original_index = self.tabs.index_of(id).unwrap_or_default();
        let new_group = self.creates_new_group(false, id);

        self.emit(GroupEvent::WillMergeTabToGroup {
            tab: id,
            destination_root: id,
        });
        let token = desired.unwrap_or_else(GroupToken::random);
        self.set_group_keys(id, id, Some(token))?;
        self.resync();

        let last_shown = self.index.group(id).map_or(id, |group| group.last_shown());
        self.emit(GroupEvent::DidMergeTabToGroup { tab: id, last_shown });
        if new_group {
            self.emit(GroupEvent::GroupCreated { destination: id });
        } else if notify {
            let visuals = self.visuals.snapshot(id);
            self.emit(GroupEvent::GroupExtended {
                snapshot: vec![UndoMetadata {
                    tab: id,
                    original_index,
                    original_root: tab.root_id,
                    original_token: tab.group_token,
                }],
                title: visuals.title,
                color: visuals.color,
                collapsed: visuals.collapsed,
            });
        }
        Ok(token)
    }

    pub(crate) fn merge_tabs(&mut self, source: TabId, destination: TabId) -> Result<(), GroupError> {
        let _span = tracing::info_span!(
            "tabstrip.merge_tabs",
            source = source.get(),
            destination = destination.get()
        )
        .entered();
        let source_tab = self.snapshot_tab(source)?;
        self.tab(destination)?;
        if self.index.root_listing(source) == self.index.root_listing(destination) {
            tracing::debug!(message = "tabstrip.merge.same_group", source = source.get());
            return Ok(());
        }
        let participants = self.view().related_tab_ids(source);
        self.merge_into(&participants, destination, true, source_tab.group_token)
    }

    pub(crate) fn merge_list(
        &mut self,
        tabs: &[TabId],
        destination: TabId,
        notify: bool,
    ) -> Result<(), GroupError> {
        let _span = tracing::info_span!(
            "tabstrip.merge_list",
            count = tabs.len(),
            destination = destination.get()
        )
        .entered();
        if tabs.is_empty() {
            return Err(GroupError::EmptyMergeList);
        }
        let mut default_token = None;
        for id in tabs {
            let tab = self.tab(*id)?;
            if default_token.is_none() {
                default_token = tab.group_token;
            }
        }
        self.tab(destination)?;
        self.merge_into(tabs, destination, notify, default_token)
    }

    /// Shared merge algorithm. Every id must already be validated.
    fn merge_into(
        &mut self,
        tabs: &[TabId],
        destination: TabId,
        notify: bool,
        default_token: Option<GroupToken>,
    ) -> Result<(), GroupError> {
        let mut seen = FxHashSet::default();
        let participants: Vec<TabId> = tabs.iter().copied().filter(|id| seen.insert(*id)).collect();
        // A stable key left behind on a non-participant cannot be adopted.
        let default_token = default_token.filter(|token| {
            !self
                .tabs
                .iter()
                .any(|tab| tab.group_token == Some(*token) && !seen.contains(&tab.id))
        });

        let dest = self.snapshot_tab(destination)?;
        let dest_root = dest.root_id;
        let participants_grouped = self.is_grouped(destination)
            || participants.iter().any(|id| self.is_grouped(*id));
        let new_group = self.creates_new_group(participants_grouped, dest_root);

        for id in &participants {
            self.emit(GroupEvent::WillMergeTabToGroup {
                tab: *id,
                destination_root: dest_root,
            });
        }

        let dest_index = self.tabs.index_of(destination).unwrap_or_default();
        let mut snapshot = vec![UndoMetadata {
            tab: destination,
            original_index: dest_index,
            original_root: dest.root_id,
            original_token: dest.group_token,
        }];
        let dest_token = if self.policy.stable_ids {
            Some(self.get_or_create_token(destination, default_token)?)
        } else {
            None
        };

        let mut sources: Vec<SourceGroup> = Vec::new();
        let mut insert_at = self.group_end(dest_root).unwrap_or(dest_index + 1);
        for id in &participants {
            let id = *id;
            if id == destination {
                continue;
            }
            let tab = self.snapshot_tab(id)?;
            let index = self.tabs.index_of(id).unwrap_or_default();
            snapshot.push(UndoMetadata {
                tab: id,
                original_index: index,
                original_root: tab.root_id,
                original_token: tab.group_token,
            });
            if tab.root_id != dest_root
                && self.index.is_grouped(&tab)
                && !sources.iter().any(|source| source.root == tab.root_id)
            {
                sources.push(SourceGroup {
                    root: tab.root_id,
                    token: tab.group_token.filter(|token| Some(*token) != dest_token),
                });
            }

            self.set_group_keys(id, dest_root, dest_token)?;
            let target = if index < insert_at {
                insert_at
            } else {
                insert_at += 1;
                insert_at - 1
            };
            self.move_in_sequence(id, target, OpContext::user().batch());
        }

        let root_changes = self.rekey_partial_sources(&sources, &participants, &mut snapshot)?;
        self.resync();
        debug_assert!(self.view().is_order_valid(), "merge broke contiguity");

        let last_shown = self
            .index
            .group(dest_root)
            .map_or(destination, |group| group.last_shown());
        for id in &participants {
            self.emit(GroupEvent::DidMergeTabToGroup {
                tab: *id,
                last_shown,
            });
        }
        for (old_root, new_root) in &root_changes {
            self.emit(GroupEvent::RootChanged {
                old_root: *old_root,
                new_root: *new_root,
            });
        }
        if new_group {
            self.emit(GroupEvent::GroupCreated { destination });
        } else if notify {
            let visuals = self.visuals.snapshot(dest_root);
            self.emit(GroupEvent::GroupExtended {
                snapshot,
                title: visuals.title,
                color: visuals.color,
                collapsed: visuals.collapsed,
            });
        }
        for source in sources {
            let live_root = root_changes
                .iter()
                .find(|(old_root, _)| *old_root == source.root)
                .map_or(source.root, |(_, new_root)| *new_root);
            if self.index.group(live_root).is_none() {
                self.emit(GroupEvent::GroupRemoved {
                    root: source.root,
                    token: source.token,
                    reason: RemovalReason::Merge,
                });
            }
        }
        Ok(())
    }

    /// Index one past the last member recorded under `root`.
    pub(crate) fn group_end(&self, root: TabId) -> Option<usize> {
        let last = *self.index.members(root).last()?;
        self.tabs.index_of(last).map(|index| index + 1)
    }

    /// A source group whose key tab left while other members stayed gets a
    /// new key from the first remaining member. The remaining members join
    /// the undo snapshot so the old key can be restored. Returns the key
    /// changes.
    fn rekey_partial_sources(
        &mut self,
        sources: &[SourceGroup],
        participants: &[TabId],
        snapshot: &mut Vec<UndoMetadata>,
    ) -> Result<Vec<(TabId, TabId)>, GroupError> {
        let mut changes = Vec::new();
        for source in sources {
            if !participants.contains(&source.root) {
                continue;
            }
            let remaining: Vec<TabId> = self
                .index
                .members(source.root)
                .iter()
                .copied()
                .filter(|member| !participants.contains(member))
                .collect();
            let Some(new_root) = remaining.first().copied() else {
                continue;
            };
            for member in &remaining {
                let original_index = self.tabs.index_of(*member).unwrap_or_default();
                let tab = self.tab_mut(*member)?;
                snapshot.push(UndoMetadata {
                    tab: tab.id,
                    original_index,
                    original_root: tab.root_id,
                    original_token: tab.group_token,
                });
                tab.root_id = new_root;
            }
            self.index.rekey(source.root, new_root);
            self.visuals.rename(source.root, new_root);
            changes.push((source.root, new_root));
        }
        Ok(changes)
    }
}
