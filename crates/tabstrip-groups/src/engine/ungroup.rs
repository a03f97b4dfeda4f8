//! Moving a tab out of its group.

use tabstrip_core::TabId;

use super::TabGroupEngine;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::{GroupEvent, RemovalReason};

impl TabGroupEngine {
    /// Move `id` out of its group, to the group's trailing or leading edge.
    ///
    /// A sole member dissolves its group in place. When the departing tab is
    /// the group's legacy key, a contiguous neighbor takes over the key
    /// first. Calling this on an ungrouped tab changes nothing structurally
    /// and only re-announces the tab as outside any group.
    pub fn move_tab_out_of_group(&mut self, id: TabId, trailing: bool) -> Result<(), GroupError> {
        self.run(|engine| engine.move_out_of_group(id, trailing))
    }

    pub(crate) fn move_out_of_group(&mut self, id: TabId, trailing: bool) -> Result<(), GroupError> {
        let _span =
            tracing::info_span!("tabstrip.move_out_of_group", tab = id.get(), trailing).entered();
        let tab = self.snapshot_tab(id)?;
        let old_root = tab.root_id;
        let members = self.index.members(old_root).to_vec();

        if members.len() <= 1 {
            let previous_group_index = self.index.ordinal(old_root).unwrap_or_default();
            self.emit(GroupEvent::WillMoveTabOutOfGroup {
                tab: id,
                new_root: id,
            });
            let dissolved = self.index.is_grouped(&tab);
            self.tab_mut(id)?.clear_group_keys();
            self.resync();
            self.emit(GroupEvent::DidMoveTabOutOfGroup {
                tab: id,
                previous_group_index,
            });
            if dissolved {
                self.emit(GroupEvent::GroupRemoved {
                    root: old_root,
                    token: tab.group_token,
                    reason: RemovalReason::Ungroup,
                });
            }
            return Ok(());
        }

        let source_index = self.tabs.index_of(id).unwrap_or_default();
        let edge = if trailing {
            members.last()
        } else {
            members.first()
        };
        let target_index = edge
            .and_then(|edge| self.tabs.index_of(*edge))
            .unwrap_or(source_index);

        let new_root = if id == old_root {
            self.neighbor_sharing_root(source_index, old_root)
                .unwrap_or(old_root)
        } else {
            old_root
        };
        let rekey = new_root != old_root;

        self.emit(GroupEvent::WillMoveTabOutOfGroup { tab: id, new_root });
        self.tab_mut(id)?.group_token = None;
        if rekey {
            for member in &members {
                self.tab_mut(*member)?.root_id = new_root;
            }
            self.index.rekey(old_root, new_root);
            self.visuals.rename(old_root, new_root);
            self.resync();
            self.emit(GroupEvent::RootChanged { old_root, new_root });
        }
        self.tab_mut(id)?.root_id = id;

        if source_index == target_index {
            self.resync();
            let previous_group_index = self.index.ordinal(new_root).unwrap_or_default();
            self.emit(GroupEvent::DidMoveTabOutOfGroup {
                tab: id,
                previous_group_index,
            });
        } else {
            let to = if trailing {
                target_index + 1
            } else {
                target_index
            };
            self.move_in_sequence(id, to, OpContext::user());
        }
        if self.index.group(new_root).is_none() {
            self.emit(GroupEvent::GroupRemoved {
                root: old_root,
                token: tab.group_token,
                reason: RemovalReason::Ungroup,
            });
        }
        Ok(())
    }

    /// Adjacent tab (previous first, then next) that shares `root`.
    fn neighbor_sharing_root(&self, index: usize, root: TabId) -> Option<TabId> {
        let previous = index
            .checked_sub(1)
            .and_then(|prev| self.tabs.get(prev))
            .filter(|tab| tab.root_id == root);
        let next = self.tabs.get(index + 1).filter(|tab| tab.root_id == root);
        previous.or(next).map(|tab| tab.id)
    }
}
