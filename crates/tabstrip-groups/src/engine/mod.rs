#![forbid(unsafe_code)]

//! Mutation engine: the single owner of one collection's grouping state.
//!
//! # Design
//!
//! [`TabGroupEngine`] owns the [`TabList`], the [`GroupIndex`], the visual
//! data and the closure/hiding state of one collection. Every mutation goes
//! through it so the sequence and the index change together.
//!
//! Topology changes (merge, move out, close, fix-up) finish with a full
//! resync. Pure reorders take the incremental [`GroupIndex::reorder`] path.
//!
//! Public mutations run inside [`TabGroupEngine::run`]: the operation
//! executes, then follow-up requests queued by listeners are drained in FIFO
//! order, bounded by [`GroupPolicy::max_follow_up_rounds`].
//!
//! # Invariants
//!
//! After every public call returns:
//!
//! 1. Every legacy key occupies one contiguous run of the sequence.
//! 2. The index matches a fresh resync of the sequence.
//! 3. Stable and legacy keys map one-to-one.
//!
//! # Failure Modes
//!
//! Caller errors (unknown ids, cross-collection tabs) return [`GroupError`]
//! before any state changes. A group key with no backing record after a
//! resync is an engine bug and panics in debug builds.

mod close;
mod fixup;
mod merge;
mod position;
mod undo;
mod ungroup;

use tabstrip_core::{
    GroupColor, GroupToken, InMemoryVisualStore, LaunchType, PendingClosures, Tab, TabId, TabList,
    TabMove, VisualStore,
};

use crate::bus::{EventBus, EventContext, FollowUp, Subscription};
use crate::config::GroupPolicy;
use crate::context::OpContext;
use crate::error::GroupError;
use crate::event::GroupEvent;
use crate::hiding::HidingSet;
use crate::index::GroupIndex;
use crate::view::GroupView;
use crate::visuals::{VisualOverrides, Visuals};

pub use close::CloseOptions;

/// Grouping engine for one tab collection.
#[derive(Debug)]
pub struct TabGroupEngine {
    tabs: TabList,
    index: GroupIndex,
    visuals: Visuals,
    hiding: HidingSet,
    pending: PendingClosures,
    policy: GroupPolicy,
    restored: bool,
    bus: EventBus,
    follow_ups: Vec<FollowUp>,
}

impl TabGroupEngine {
    /// Empty collection backed by an in-memory visual store.
    #[must_use]
    pub fn new(incognito: bool, policy: GroupPolicy) -> Self {
        Self::with_store(
            TabList::with_incognito(incognito),
            policy,
            Box::new(InMemoryVisualStore::new()),
        )
    }

    /// Engine over previously loaded tabs.
    ///
    /// The engine starts in the loading state: positional changes are not
    /// classified and the group count is unknown until
    /// [`mark_restored`](Self::mark_restored).
    #[must_use]
    pub fn with_store(tabs: TabList, policy: GroupPolicy, store: Box<dyn VisualStore>) -> Self {
        let index = GroupIndex::build(&tabs);
        let visuals = Visuals::new(store, policy.fallback_color);
        Self {
            tabs,
            index,
            visuals,
            hiding: HidingSet::new(),
            pending: PendingClosures::new(),
            policy,
            restored: false,
            bus: EventBus::new(),
            follow_ups: Vec::new(),
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn view(&self) -> GroupView<'_> {
        GroupView {
            tabs: &self.tabs,
            index: &self.index,
            visuals: &self.visuals,
            hiding: &self.hiding,
            pending: &self.pending,
            restored: self.restored,
        }
    }

    #[must_use]
    pub fn tabs(&self) -> &TabList {
        &self.tabs
    }

    #[must_use]
    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    #[must_use]
    pub fn policy(&self) -> &GroupPolicy {
        &self.policy
    }

    #[must_use]
    pub fn is_incognito(&self) -> bool {
        self.tabs.is_incognito()
    }

    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Register an event listener. See [`EventBus::subscribe`].
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&GroupEvent, &mut EventContext<'_>) + 'static,
    ) -> Subscription {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.bus.unsubscribe(subscription);
    }

    /// Override table for externally synchronized groups.
    pub fn visual_overrides_mut(&mut self) -> &mut VisualOverrides {
        self.visuals.overrides_mut()
    }

    // ---------------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------------

    /// Run one public operation, then drain listener follow-ups.
    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, GroupError>,
    ) -> Result<T, GroupError> {
        let result = op(self);
        self.drain_follow_ups();
        result
    }

    fn drain_follow_ups(&mut self) {
        let mut rounds = 0;
        while !self.follow_ups.is_empty() {
            if rounds == self.policy.max_follow_up_rounds {
                tracing::warn!(
                    message = "tabstrip.follow_ups.dropped",
                    dropped = self.follow_ups.len(),
                    rounds
                );
                self.follow_ups.clear();
                return;
            }
            rounds += 1;
            for follow_up in std::mem::take(&mut self.follow_ups) {
                if let Err(err) = self.apply_follow_up(follow_up) {
                    tracing::warn!(message = "tabstrip.follow_up.rejected", error = %err);
                }
            }
        }
    }

    fn apply_follow_up(&mut self, follow_up: FollowUp) -> Result<(), GroupError> {
        match follow_up {
            FollowUp::MergeTabs {
                source,
                destination,
            } => self.merge_tabs(source, destination),
            FollowUp::MergeList {
                tabs,
                destination,
                notify,
            } => self.merge_list(&tabs, destination, notify),
            FollowUp::MoveOutOfGroup { tab, trailing } => self.move_out_of_group(tab, trailing),
            FollowUp::MoveGroup { tab, index } => self.move_group(tab, index),
            FollowUp::CreateGroup { tab } => self.create_group(tab, None, true).map(|_| ()),
            FollowUp::SetTitle { root, title } => {
                self.write_title(root, title);
                Ok(())
            }
            FollowUp::SetColor { root, color } => {
                self.write_color(root, color);
                Ok(())
            }
            FollowUp::SetCollapsed { root, collapsed } => {
                self.write_collapsed(root, collapsed);
                Ok(())
            }
            FollowUp::SelectTab { tab } => self.select(tab),
        }
    }

    /// Deliver one event to every listener.
    pub(crate) fn emit(&mut self, event: GroupEvent) {
        let view = GroupView {
            tabs: &self.tabs,
            index: &self.index,
            visuals: &self.visuals,
            hiding: &self.hiding,
            pending: &self.pending,
            restored: self.restored,
        };
        let mut ctx = EventContext::new(view, &mut self.follow_ups);
        self.bus.emit(&event, &mut ctx);
    }

    pub(crate) fn resync(&mut self) {
        self.index.resync(&self.tabs);
    }

    pub(crate) fn tab(&self, id: TabId) -> Result<&Tab, GroupError> {
        self.tabs.get_by_id(id).ok_or(GroupError::TabNotFound { id })
    }

    pub(crate) fn tab_mut(&mut self, id: TabId) -> Result<&mut Tab, GroupError> {
        self.tabs
            .get_by_id_mut(id)
            .ok_or(GroupError::TabNotFound { id })
    }

    /// Clone of a tab known to be present.
    pub(crate) fn snapshot_tab(&self, id: TabId) -> Result<Tab, GroupError> {
        self.tab(id).cloned()
    }

    fn ensure_same_collection(&self, tab: &Tab) -> Result<(), GroupError> {
        if tab.incognito == self.tabs.is_incognito() {
            Ok(())
        } else {
            Err(GroupError::CrossCollection {
                id: tab.id,
                tab_incognito: tab.incognito,
            })
        }
    }

    pub(crate) fn is_grouped(&self, id: TabId) -> bool {
        self.tabs
            .get_by_id(id)
            .is_some_and(|tab| self.index.is_grouped(tab))
    }

    pub(crate) fn set_group_keys(
        &mut self,
        id: TabId,
        root: TabId,
        token: Option<GroupToken>,
    ) -> Result<(), GroupError> {
        self.tab_mut(id)?.set_group_keys(root, token);
        Ok(())
    }

    /// Stable key of `id`, minting one (or adopting `default`) when absent.
    pub(crate) fn get_or_create_token(
        &mut self,
        id: TabId,
        default: Option<GroupToken>,
    ) -> Result<GroupToken, GroupError> {
        let tab = self.tab_mut(id)?;
        if let Some(token) = tab.group_token {
            return Ok(token);
        }
        let token = default.unwrap_or_else(GroupToken::random);
        tab.group_token = Some(token);
        Ok(token)
    }

    /// Whether a merge into `destination_root` counts as creating a group.
    ///
    /// A destination that already has a stored color was a group before
    /// (restored from history), so it is extended rather than created.
    pub(crate) fn creates_new_group(&self, participants_grouped: bool, destination_root: TabId) -> bool {
        if participants_grouped {
            return false;
        }
        !(self.policy.color_marks_existing_group && self.visuals.color(destination_root).is_some())
    }

    // ---------------------------------------------------------------------
    // Positional changes
    // ---------------------------------------------------------------------

    /// Move a tab in the sequence and classify the change.
    pub(crate) fn move_in_sequence(
        &mut self,
        id: TabId,
        new_index: usize,
        ctx: OpContext,
    ) -> Option<TabMove> {
        let mv = self.tabs.move_tab(id, new_index)?;
        self.did_move_tab(mv, ctx);
        Some(mv)
    }

    /// Classify a positional change and emit its events.
    ///
    /// - move out: no slot under the tab's legacy key, or undo in progress;
    /// - merge: the slot under the tab's legacy key does not list it;
    /// - otherwise a reorder inside unchanged topology.
    pub(crate) fn did_move_tab(&mut self, mv: TabMove, ctx: OpContext) {
        if ctx.batch {
            return;
        }
        if !self.restored {
            self.resync();
            return;
        }
        let Some(tab) = self.tabs.get_by_id(mv.tab) else {
            debug_assert!(false, "moved tab {} missing from sequence", mv.tab);
            return;
        };
        let root = tab.root_id;
        let is_move_out = !self.index.has_slot(root) || ctx.undoing;
        let is_merge = self.index.has_slot(root) && !self.index.members(root).contains(&mv.tab);

        if is_move_out {
            let root_before = self.index.root_listing(mv.tab).unwrap_or(root);
            self.resync();
            let previous_group_index = self
                .index
                .ordinal(root_before)
                .or_else(|| self.index.ordinal(root))
                .unwrap_or(0);
            self.emit(GroupEvent::DidMoveTabOutOfGroup {
                tab: mv.tab,
                previous_group_index,
            });
        } else if is_merge {
            self.resync();
            if let Some(last_shown) = self.index.group(root).map(|group| group.last_shown()) {
                self.emit(GroupEvent::DidMergeTabToGroup {
                    tab: mv.tab,
                    last_shown,
                });
            }
        } else {
            self.index.reorder(&self.tabs);
            if self.is_move_within_group(root, mv) {
                self.emit(GroupEvent::DidMoveWithinGroup {
                    tab: mv.tab,
                    from: mv.from,
                    to: mv.to,
                });
            } else if self.has_finished_moving_group(root, mv.to) {
                self.emit(GroupEvent::DidMoveGroup {
                    tab: mv.tab,
                    from: mv.from,
                    to: mv.to,
                });
            }
        }
    }

    fn is_move_within_group(&self, root: TabId, mv: TabMove) -> bool {
        let (start, end) = (mv.from.min(mv.to), mv.from.max(mv.to));
        (start..=end).all(|i| self.tabs.get(i).is_some_and(|tab| tab.root_id == root))
    }

    fn has_finished_moving_group(&self, root: TabId, to: usize) -> bool {
        let size = self.index.members(root).len();
        let Some(offset) = (to + 1).checked_sub(size) else {
            return false;
        };
        (offset..=to).all(|i| self.tabs.get(i).is_some_and(|tab| tab.root_id == root))
    }

    // ---------------------------------------------------------------------
    // Add / select
    // ---------------------------------------------------------------------

    /// Add a tab. `index` is a proposed position, adjusted by the
    /// valid-position rule; `None` appends (or lands at the end of the group
    /// the tab joins).
    ///
    /// Tabs launched to join their parent's group inherit its keys once the
    /// collection has been restored.
    pub fn add_tab(&mut self, tab: Tab, index: Option<usize>) -> Result<usize, GroupError> {
        self.run(|engine| engine.add(tab, index, OpContext::user()))
    }

    pub(crate) fn add(
        &mut self,
        mut tab: Tab,
        index: Option<usize>,
        ctx: OpContext,
    ) -> Result<usize, GroupError> {
        let _span = tracing::info_span!("tabstrip.add_tab", tab = tab.id.get()).entered();
        self.ensure_same_collection(&tab)?;
        if self.tabs.contains(tab.id) {
            return Err(GroupError::AlreadyPresent { id: tab.id });
        }

        let parent = self.joinable_parent(&tab, ctx);
        let mut created_group = false;
        if let Some(parent_id) = parent {
            let parent_root = self.tab(parent_id)?.root_id;
            created_group = !self.is_grouped(parent_id);
            let token = if self.policy.stable_ids {
                Some(self.get_or_create_token(parent_id, None)?)
            } else {
                None
            };
            tab.set_group_keys(parent_root, token);
        }

        let position = self.valid_position_for(&tab, index.unwrap_or(self.tabs.len()));
        let id = tab.id;
        let launch_type = tab.launch_type;
        let position = self.tabs.insert(position, tab);
        self.resync();
        tracing::debug!(message = "tabstrip.add_tab", tab = id.get(), position, created_group);

        if created_group && launch_type == LaunchType::FromLongpressBackgroundInGroup {
            if ctx.record_metrics {
                tracing::info!(
                    target: "tabstrip.metrics",
                    message = "group_created_with_context_menu",
                    tab = id.get()
                );
            }
            self.emit(GroupEvent::GroupCreated { destination: id });
        }
        Ok(position)
    }

    /// Parent whose group `tab` should join, if any.
    fn joinable_parent(&self, tab: &Tab, ctx: OpContext) -> Option<TabId> {
        if ctx.from_undo || !self.restored || !tab.launch_type.joins_parent_group() {
            return None;
        }
        tab.parent_id.filter(|parent| self.tabs.contains(*parent))
    }

    /// Make `id` the active tab and its group's last shown member.
    pub fn select_tab(&mut self, id: TabId) -> Result<(), GroupError> {
        self.run(|engine| engine.select(id))
    }

    fn select(&mut self, id: TabId) -> Result<(), GroupError> {
        let tab = self.snapshot_tab(id)?;
        self.tabs.select(id);
        self.index.set_last_shown(&tab);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Visual data
    // ---------------------------------------------------------------------

    pub fn set_title(&mut self, root: TabId, title: &str) {
        self.write_title(root, Some(title.to_owned()));
        self.drain_follow_ups();
    }

    pub fn delete_title(&mut self, root: TabId) {
        self.write_title(root, None);
        self.drain_follow_ups();
    }

    pub fn set_color(&mut self, root: TabId, color: GroupColor) {
        self.write_color(root, Some(color));
        self.drain_follow_ups();
    }

    pub fn delete_color(&mut self, root: TabId) {
        self.write_color(root, None);
        self.drain_follow_ups();
    }

    pub fn set_collapsed(&mut self, root: TabId, collapsed: bool) {
        self.write_collapsed(root, collapsed);
        self.drain_follow_ups();
    }

    pub fn delete_collapsed(&mut self, root: TabId) {
        self.visuals.store_mut().delete_collapsed(root);
        self.emit(GroupEvent::CollapsedChanged {
            root,
            collapsed: false,
        });
        self.drain_follow_ups();
    }

    pub(crate) fn write_title(&mut self, root: TabId, title: Option<String>) {
        match &title {
            Some(title) => self.visuals.store_mut().set_title(root, title),
            None => self.visuals.store_mut().delete_title(root),
        }
        self.emit(GroupEvent::TitleChanged { root, title });
    }

    pub(crate) fn write_color(&mut self, root: TabId, color: Option<GroupColor>) {
        match color {
            Some(color) => self.visuals.store_mut().set_color(root, color),
            None => self.visuals.store_mut().delete_color(root),
        }
        self.emit(GroupEvent::ColorChanged { root, color });
    }

    pub(crate) fn write_collapsed(&mut self, root: TabId, collapsed: bool) {
        self.visuals.store_mut().set_collapsed(root, collapsed);
        self.emit(GroupEvent::CollapsedChanged { root, collapsed });
    }
}
