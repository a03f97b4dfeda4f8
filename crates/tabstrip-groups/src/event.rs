#![forbid(unsafe_code)]

//! Observer events.
//!
//! Every topology change is announced in two phases:
//!
//! 1. one `Will*` event per affected tab, in input order, before any state
//!    changes;
//! 2. after the sequence and index are updated and resynced, the matching
//!    `Did*` events in the same order, then the aggregate events.
//!
//! The aggregate for a grouping operation is exactly one of
//! [`GroupEvent::GroupCreated`] or [`GroupEvent::GroupExtended`] (when
//! notifying), followed by one [`GroupEvent::GroupRemoved`] per group the
//! operation dissolved.

use serde::{Deserialize, Serialize};
use tabstrip_core::{GroupColor, GroupToken, TabId};

/// Why a group went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Its members were merged into another group.
    Merge,
    /// Its last member was moved out.
    Ungroup,
    /// Its last member was closed.
    Close,
}

/// Pre-mutation state of one tab, sufficient to reverse a grouping change.
///
/// `original_index` is the tab's index immediately before its own
/// relocation, so a batch must be undone in reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoMetadata {
    pub tab: TabId,
    pub original_index: usize,
    pub original_root: TabId,
    pub original_token: Option<GroupToken>,
}

/// One structural or visual change, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GroupEvent {
    WillMergeTabToGroup {
        tab: TabId,
        destination_root: TabId,
    },
    DidMergeTabToGroup {
        tab: TabId,
        /// Last-shown member of the group the tab joined.
        last_shown: TabId,
    },
    WillMoveTabOutOfGroup {
        tab: TabId,
        /// Legacy key the remaining members will carry.
        new_root: TabId,
    },
    DidMoveTabOutOfGroup {
        tab: TabId,
        /// Representative index of the group the tab left.
        previous_group_index: usize,
    },
    /// A merge produced a brand-new group.
    GroupCreated { destination: TabId },
    /// A merge extended an existing group. Carries the undo snapshot,
    /// destination first.
    GroupExtended {
        snapshot: Vec<UndoMetadata>,
        title: Option<String>,
        color: Option<GroupColor>,
        collapsed: bool,
    },
    GroupRemoved {
        root: TabId,
        token: Option<GroupToken>,
        reason: RemovalReason,
    },
    WillMoveGroup {
        from: usize,
        to: usize,
    },
    DidMoveGroup {
        tab: TabId,
        from: usize,
        to: usize,
    },
    DidMoveWithinGroup {
        tab: TabId,
        from: usize,
        to: usize,
    },
    RootChanged {
        old_root: TabId,
        new_root: TabId,
    },
    TitleChanged {
        root: TabId,
        title: Option<String>,
    },
    ColorChanged {
        root: TabId,
        color: Option<GroupColor>,
    },
    CollapsedChanged {
        root: TabId,
        collapsed: bool,
    },
    WillCloseGroup {
        root: TabId,
        token: Option<GroupToken>,
        hiding: bool,
    },
    GroupClosureCommitted {
        token: GroupToken,
        was_hiding: bool,
    },
}

impl GroupEvent {
    /// Short snake_case name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WillMergeTabToGroup { .. } => "will_merge_tab_to_group",
            Self::DidMergeTabToGroup { .. } => "did_merge_tab_to_group",
            Self::WillMoveTabOutOfGroup { .. } => "will_move_tab_out_of_group",
            Self::DidMoveTabOutOfGroup { .. } => "did_move_tab_out_of_group",
            Self::GroupCreated { .. } => "group_created",
            Self::GroupExtended { .. } => "group_extended",
            Self::GroupRemoved { .. } => "group_removed",
            Self::WillMoveGroup { .. } => "will_move_group",
            Self::DidMoveGroup { .. } => "did_move_group",
            Self::DidMoveWithinGroup { .. } => "did_move_within_group",
            Self::RootChanged { .. } => "root_changed",
            Self::TitleChanged { .. } => "title_changed",
            Self::ColorChanged { .. } => "color_changed",
            Self::CollapsedChanged { .. } => "collapsed_changed",
            Self::WillCloseGroup { .. } => "will_close_group",
            Self::GroupClosureCommitted { .. } => "group_closure_committed",
        }
    }

    /// Whether this is a will-phase event.
    #[must_use]
    pub const fn is_will_phase(&self) -> bool {
        matches!(
            self,
            Self::WillMergeTabToGroup { .. }
                | Self::WillMoveTabOutOfGroup { .. }
                | Self::WillMoveGroup { .. }
                | Self::WillCloseGroup { .. }
        )
    }
}
