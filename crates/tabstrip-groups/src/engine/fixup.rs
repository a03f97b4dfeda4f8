//! Restore completion and legacy-key repair.

use tabstrip_core::{GroupToken, TabId};

use super::TabGroupEngine;
use crate::index::is_order_valid;

impl TabGroupEngine {
    /// Finish loading: classify moves from now on, repair legacy keys, and
    /// migrate stable keys to match the policy.
    pub fn mark_restored(&mut self) {
        let _span =
            tracing::info_span!("tabstrip.mark_restored", tabs = self.tabs.len()).entered();
        let order_valid = is_order_valid(&self.tabs);
        tracing::info!(
            target: "tabstrip.metrics",
            message = "order_valid_on_restore",
            order_valid
        );
        if !order_valid {
            tracing::warn!(message = "tabstrip.restore.order_invalid");
        }

        self.restored = true;
        self.repair_root_ids();
        if self.policy.stable_ids {
            self.add_group_tokens_for_all_groups();
        } else {
            self.remove_group_tokens_for_all_groups();
        }
        self.resync();
        self.drain_follow_ups();
    }

    /// Re-key every group whose legacy key is not one of its members.
    ///
    /// Returns the number of stale keys repaired.
    pub fn fix_root_ids(&mut self) -> usize {
        let repaired = self.repair_root_ids();
        self.drain_follow_ups();
        repaired
    }

    /// Each contiguous run under a stale key is keyed by its first member.
    /// Visual data is copied to every new key, since one stale key may cover
    /// several runs, then dropped from the stale key.
    fn repair_root_ids(&mut self) -> usize {
        let stale = self.index.stale_roots();
        if stale.is_empty() {
            return 0;
        }
        tracing::warn!(message = "tabstrip.fix_root_ids", stale = stale.len());

        let mut rewrites = Vec::new();
        for old_root in &stale {
            let visuals = self.visuals.snapshot(*old_root);
            for run in self.contiguous_runs(*old_root) {
                let Some(new_root) = run.first().copied() else {
                    continue;
                };
                for member in &run {
                    if let Some(tab) = self.tabs.get_by_id_mut(*member) {
                        tab.root_id = new_root;
                    }
                }
                rewrites.push((*old_root, new_root, visuals.clone()));
            }
        }
        self.resync();

        for (old_root, new_root, visuals) in rewrites {
            tracing::debug!(
                message = "tabstrip.fix_root_ids.rekey",
                old_root = old_root.get(),
                new_root = new_root.get()
            );
            if self.index.group(new_root).is_none() {
                continue;
            }
            if visuals.title.is_some() {
                self.write_title(new_root, visuals.title);
            }
            if visuals.color.is_some() {
                self.write_color(new_root, visuals.color);
            }
            if visuals.collapsed {
                self.write_collapsed(new_root, true);
            }
        }
        for old_root in &stale {
            if !self.index.has_slot(*old_root) {
                self.visuals.delete(*old_root);
            }
        }
        tracing::info!(
            target: "tabstrip.metrics",
            message = "root_ids_fixed",
            count = stale.len()
        );
        stale.len()
    }

    /// Members under `root` split into runs of adjacent sequence positions.
    fn contiguous_runs(&self, root: TabId) -> Vec<Vec<TabId>> {
        let mut runs: Vec<Vec<TabId>> = Vec::new();
        let mut previous: Option<usize> = None;
        for member in self.index.members(root) {
            let Some(index) = self.tabs.index_of(*member) else {
                continue;
            };
            match runs.last_mut() {
                Some(run) if previous.is_some_and(|prev| prev + 1 == index) => run.push(*member),
                _ => runs.push(vec![*member]),
            }
            previous = Some(index);
        }
        runs
    }

    /// Give every multi-member group without a stable key a fresh one.
    ///
    /// Returns the number of groups that received a key.
    pub fn add_group_tokens_for_all_groups(&mut self) -> usize {
        let missing: Vec<Vec<TabId>> = self
            .index
            .groups()
            .filter(|group| group.token().is_none() && group.len() > 1)
            .map(|group| group.members().to_vec())
            .collect();
        for members in &missing {
            let token = GroupToken::random();
            for member in members {
                if let Some(tab) = self.tabs.get_by_id_mut(*member) {
                    tab.group_token = Some(token);
                }
            }
        }
        if !missing.is_empty() {
            tracing::debug!(message = "tabstrip.tokens.added", groups = missing.len());
            self.resync();
        }
        missing.len()
    }

    /// Strip stable keys from every visible and pending tab.
    pub fn remove_group_tokens_for_all_groups(&mut self) {
        let mut stripped = 0usize;
        for tab in self.tabs.iter_mut().chain(self.pending.tabs_mut()) {
            if tab.group_token.take().is_some() {
                stripped += 1;
            }
        }
        if stripped > 0 {
            tracing::debug!(message = "tabstrip.tokens.removed", tabs = stripped);
            self.resync();
        }
    }
}
