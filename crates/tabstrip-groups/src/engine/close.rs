//! Closing tabs: pending closures, hiding, undo and commit.
//!
//! # Lifecycle
//!
//! ```text
//! close_tabs ──► pending ──► undo_closure ──► visible again
//!                   │
//!                   └──────► commit_closure ──► gone
//! ```
//!
//! A group whose members are all in one close request announces
//! [`GroupEvent::WillCloseGroup`] first. Tabs leave back to front, so each
//! pending closure keeps the index it had before the request and restoring
//! in sequence order rebuilds the original layout. When hiding applies, the
//! group's stable key enters the [`HidingSet`](crate::HidingSet) and the
//! group is not reported as removed. Restoring any member clears the mark. Committing the last
//! member that carries a stable key reports
//! [`GroupEvent::GroupClosureCommitted`] with the hiding state at that time.

use rustc_hash::FxHashSet;
use tabstrip_core::{Tab, TabId};

use super::TabGroupEngine;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::{GroupEvent, RemovalReason};

/// How a close request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseOptions {
    /// Keep closed tabs pending so the closure can be undone.
    pub allow_undo: bool,
    /// Hide fully closed groups instead of removing them, when the policy
    /// allows it for this collection.
    pub hide_groups: bool,
}

impl CloseOptions {
    /// Undoable closure that hides fully closed groups.
    #[must_use]
    pub const fn undoable() -> Self {
        Self {
            allow_undo: true,
            hide_groups: true,
        }
    }

    /// Immediate, irrevocable closure.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            allow_undo: false,
            hide_groups: false,
        }
    }
}

impl TabGroupEngine {
    /// Close `ids` in one request.
    ///
    /// Every id is validated before anything changes.
    pub fn close_tabs(&mut self, ids: &[TabId], options: CloseOptions) -> Result<(), GroupError> {
        self.run(|engine| engine.close(ids, options))
    }

    /// Close every visible tab.
    pub fn close_all_tabs(&mut self, options: CloseOptions) -> Result<(), GroupError> {
        let ids = self.tabs.ids();
        self.close_tabs(&ids, options)
    }

    /// Cancel a pending closure and put the tab back.
    ///
    /// Returns the index the tab was restored at.
    pub fn undo_closure(&mut self, id: TabId) -> Result<usize, GroupError> {
        self.run(|engine| engine.restore_closed(id))
    }

    /// Make a pending closure irrevocable.
    pub fn commit_closure(&mut self, id: TabId) -> Result<(), GroupError> {
        self.run(|engine| {
            let closure = engine
                .pending
                .take(id)
                .ok_or(GroupError::NotPendingClosure { id })?;
            engine.finish_commit(&closure.tab);
            Ok(())
        })
    }

    /// Commit every pending closure, oldest first.
    pub fn commit_all_closures(&mut self) -> Result<(), GroupError> {
        self.run(|engine| {
            while let Some(id) = engine.pending.oldest_id() {
                let Some(closure) = engine.pending.take(id) else {
                    break;
                };
                engine.finish_commit(&closure.tab);
            }
            Ok(())
        })
    }

    fn close(&mut self, ids: &[TabId], options: CloseOptions) -> Result<(), GroupError> {
        let _span = tracing::info_span!(
            "tabstrip.close_tabs",
            count = ids.len(),
            allow_undo = options.allow_undo
        )
        .entered();
        for id in ids {
            self.tab(*id)?;
        }
        let mut seen = FxHashSet::default();
        let mut ids: Vec<TabId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        // Back to front, so every pending closure records its original index.
        ids.sort_by_key(|id| std::cmp::Reverse(self.tabs.index_of(*id)));

        let can_hide = options.hide_groups && self.policy.can_hide(self.is_incognito());
        let closing_groups: Vec<_> = self
            .index
            .groups()
            .filter(|group| group.members().iter().all(|member| seen.contains(member)))
            .map(|group| (group.root(), group.token()))
            .collect();
        for (root, token) in closing_groups {
            let hiding = can_hide && token.is_some();
            self.emit(GroupEvent::WillCloseGroup { root, token, hiding });
            if hiding && let Some(token) = token {
                self.hiding.insert(token);
            }
        }

        for id in ids {
            self.remove_closed(id, options.allow_undo)?;
        }
        Ok(())
    }

    /// Remove one tab from the sequence, handing its legacy key to another
    /// member when it held it.
    fn remove_closed(&mut self, id: TabId, allow_undo: bool) -> Result<(), GroupError> {
        let tab = self.snapshot_tab(id)?;
        let root = tab.root_id;
        let group = self.index.group_of(&tab).cloned();
        let Some((position, mut removed)) = self.tabs.remove(id) else {
            return Err(GroupError::TabNotFound { id });
        };

        let mut root_change = None;
        if id == root
            && let Some(next_root) = group.as_ref().and_then(|group| group.successor_of(id))
        {
            removed.root_id = next_root;
            self.move_legacy_key(root, next_root);
            root_change = Some((root, next_root));
        }
        tracing::debug!(message = "tabstrip.close", tab = id.get(), position, allow_undo);

        let token = removed.group_token;
        if allow_undo {
            self.pending.push(removed.clone(), position);
        }
        self.resync();

        if let Some((old_root, new_root)) = root_change {
            self.emit(GroupEvent::RootChanged { old_root, new_root });
        }
        let live_root = root_change.map_or(root, |(_, new_root)| new_root);
        let dissolved = group.is_some() && self.index.group(live_root).is_none();
        let hiding = token.is_some_and(|token| self.hiding.contains(token));
        if dissolved && !hiding {
            self.emit(GroupEvent::GroupRemoved {
                root,
                token,
                reason: RemovalReason::Close,
            });
        }
        if !allow_undo {
            self.finish_commit(&removed);
        }
        Ok(())
    }

    fn restore_closed(&mut self, id: TabId) -> Result<usize, GroupError> {
        let _span = tracing::info_span!("tabstrip.undo_closure", tab = id.get()).entered();
        let closure = self
            .pending
            .take(id)
            .ok_or(GroupError::NotPendingClosure { id })?;
        let mut tab = closure.tab;
        if let Some(token) = tab.group_token {
            if self.hiding.remove(token) {
                tracing::debug!(message = "tabstrip.hiding.cleared", tab = id.get());
            }
            if let Some(root) = self.index.root_for_token(token) {
                tab.root_id = root;
            }
        }
        // Joining a group that carries another stable key adopts that key.
        if let Some(existing) = self.index.token_for_root(tab.root_id)
            && tab.group_token != Some(existing)
        {
            tab.group_token = Some(existing);
        }

        let root = tab.root_id;
        let position = self.add(tab, Some(closure.index), OpContext::closure_undo())?;

        // The key tab is gone or keyed elsewhere: the restored tab takes the
        // key over.
        if root != id && self.index.has_slot(root) && !self.index.members(root).contains(&root) {
            self.move_legacy_key(root, id);
            self.resync();
            self.emit(GroupEvent::RootChanged {
                old_root: root,
                new_root: id,
            });
        }
        Ok(position)
    }

    /// Report a committed closure and drop data nothing refers to anymore.
    fn finish_commit(&mut self, tab: &Tab) {
        if let Some(token) = tab.group_token
            && !self.view().token_in_comprehensive_model(token)
        {
            let was_hiding = self.hiding.remove(token);
            self.emit(GroupEvent::GroupClosureCommitted { token, was_hiding });
        }
        let root = tab.root_id;
        let still_referenced = self.index.has_slot(root)
            || self.pending.iter().any(|closure| closure.tab.root_id == root);
        if !still_referenced {
            self.visuals.delete(root);
        }
    }

    /// Rewrite legacy key `old_root` to `new_root` on visible and pending
    /// tabs, and move its visual data along.
    pub(crate) fn move_legacy_key(&mut self, old_root: TabId, new_root: TabId) {
        for tab in self.tabs.iter_mut().chain(self.pending.tabs_mut()) {
            if tab.root_id == old_root {
                tab.root_id = new_root;
            }
        }
        self.index.rekey(old_root, new_root);
        self.visuals.rename(old_root, new_root);
    }
}
