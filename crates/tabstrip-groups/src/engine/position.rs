//! Placement rules and whole-group moves.

use tabstrip_core::{Tab, TabId};

use super::TabGroupEngine;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::GroupEvent;

impl TabGroupEngine {
    /// Position at which `tab` may be inserted without splitting a run.
    ///
    /// A tab carrying an existing group's legacy key lands inside that
    /// group: a proposal before the group snaps to its first slot, one past
    /// it snaps to its trailing edge. Any other tab may sit at a group
    /// boundary but never strictly inside a group; such a proposal is pushed
    /// to the group's trailing edge.
    #[must_use]
    pub fn valid_position_for(&self, tab: &Tab, proposed: usize) -> usize {
        let members = self.index.members(tab.root_id);
        let joins_existing = match members {
            [] => false,
            [only] => *only != tab.id || tab.group_token.is_some(),
            _ => true,
        };
        if joins_existing && let Some(first) = self.tabs.index_of(members[0]) {
            let end = first + members.len();
            return proposed.clamp(first, end);
        }

        let len = self.tabs.len();
        if proposed == 0 || proposed >= len {
            return proposed.min(len);
        }
        let mut position = proposed;
        while position < len && self.shares_run(position - 1, position) {
            position += 1;
        }
        position
    }

    /// First position at or after `index` that does not split a run other
    /// than `moving`.
    fn group_boundary(&self, index: usize, moving: TabId) -> usize {
        let len = self.tabs.len();
        let mut position = index.min(len);
        while position > 0
            && position < len
            && self.shares_run(position - 1, position)
            && self.tabs.get(position).is_some_and(|tab| tab.root_id != moving)
        {
            position += 1;
        }
        position
    }

    /// Whether the tabs at `a` and `b` carry the same legacy key.
    fn shares_run(&self, a: usize, b: usize) -> bool {
        match (self.tabs.get(a), self.tabs.get(b)) {
            (Some(a), Some(b)) => a.root_id == b.root_id,
            _ => false,
        }
    }

    /// Move one tab, adjusting `index` so it does not split a group.
    ///
    /// `index` uses insert-before semantics against the current sequence.
    pub fn move_tab(&mut self, id: TabId, index: usize) -> Result<(), GroupError> {
        self.run(|engine| {
            let tab = engine.snapshot_tab(id)?;
            let position = engine.valid_position_for(&tab, index);
            engine.move_in_sequence(id, position, OpContext::user());
            Ok(())
        })
    }

    /// Move the whole group containing `id` (or `id` alone) to the
    /// insert-before position `index`.
    ///
    /// A position strictly inside another group is pushed to that group's
    /// trailing edge. A position inside the moving group changes nothing.
    pub fn move_related_tabs(&mut self, id: TabId, index: usize) -> Result<(), GroupError> {
        self.run(|engine| engine.move_group(id, index))
    }

    pub(crate) fn move_group(&mut self, id: TabId, index: usize) -> Result<(), GroupError> {
        let _span =
            tracing::info_span!("tabstrip.move_group", tab = id.get(), index).entered();
        let root = self.tab(id)?.root_id;
        let related = self.view().related_tab_ids(id);
        let Some(current) = related.first().and_then(|first| self.tabs.index_of(*first)) else {
            return Ok(());
        };
        let target = self.group_boundary(index, root);
        if (current..=current + related.len()).contains(&target) {
            return Ok(());
        }

        self.emit(GroupEvent::WillMoveGroup {
            from: current,
            to: target,
        });
        let forward = target >= current;
        for (offset, member) in related.iter().enumerate() {
            let to = if forward { target } else { target + offset };
            self.move_in_sequence(*member, to, OpContext::user());
        }
        Ok(())
    }
}
