//! Reversing grouping changes from [`UndoMetadata`] snapshots.

use tabstrip_core::TabMove;

use super::TabGroupEngine;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::{GroupEvent, UndoMetadata};

impl TabGroupEngine {
    /// Restore one tab's index and keys.
    ///
    /// A tab whose keys change is announced as moving out of its current
    /// group, and as merging when it lands back in a group.
    pub fn undo_grouped_tab(&mut self, meta: UndoMetadata) -> Result<(), GroupError> {
        self.run(|engine| engine.undo(meta))
    }

    /// Reverse a whole merge snapshot, most recent relocation first.
    pub fn undo_merge(&mut self, snapshot: &[UndoMetadata]) -> Result<(), GroupError> {
        self.run(|engine| {
            let _span =
                tracing::info_span!("tabstrip.undo_merge", count = snapshot.len()).entered();
            for meta in snapshot.iter().rev() {
                engine.undo(*meta)?;
            }
            Ok(())
        })
    }

    fn undo(&mut self, meta: UndoMetadata) -> Result<(), GroupError> {
        let tab = self.snapshot_tab(meta.tab)?;
        let current = self.tabs.index_of(meta.tab).unwrap_or_default();
        let changing_groups =
            tab.root_id != meta.original_root || tab.group_token != meta.original_token;
        let ctx = OpContext::user().undoing(changing_groups);
        tracing::debug!(
            message = "tabstrip.undo",
            tab = meta.tab.get(),
            from = current,
            to = meta.original_index,
            changing_groups
        );

        self.set_group_keys(meta.tab, meta.original_root, meta.original_token)?;
        if current != meta.original_index {
            let to = if current < meta.original_index {
                meta.original_index + 1
            } else {
                meta.original_index
            };
            if self.move_in_sequence(meta.tab, to, ctx).is_none() {
                self.resync();
            }
        } else if changing_groups {
            self.did_move_tab(
                TabMove {
                    tab: meta.tab,
                    to: meta.original_index,
                    from: current,
                },
                ctx,
            );
        } else {
            self.resync();
        }

        if changing_groups
            && let Some(last_shown) = self
                .tab(meta.tab)
                .ok()
                .and_then(|tab| self.index.group_of(tab))
                .map(|group| group.last_shown())
        {
            self.emit(GroupEvent::DidMergeTabToGroup {
                tab: meta.tab,
                last_shown,
            });
        }
        Ok(())
    }
}
