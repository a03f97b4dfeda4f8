#![forbid(unsafe_code)]

//! The tab item and how it was opened.

use serde::{Deserialize, Serialize};

use crate::id::{GroupToken, TabId};

/// How a tab came into existence.
///
/// Only a few launch types make a new tab join its parent's group; see
/// [`LaunchType::joins_parent_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchType {
    /// Opened from browser chrome (new-tab button, omnibox, menu).
    #[default]
    FromChromeUi,
    /// Opened by a link in another tab.
    FromLink,
    /// Recreated while restoring saved state.
    FromRestore,
    /// Opened from the "+" button inside a group's UI.
    FromTabGroupUi,
    /// "Open in new tab" from a context menu.
    FromLongpressBackground,
    /// "Open in new tab in group" from a context menu.
    FromLongpressBackgroundInGroup,
    /// Opened from the start surface while a group was focused.
    FromStartSurface,
    /// Created by a sync collaborator in the background.
    FromSyncBackground,
}

impl LaunchType {
    /// Whether a tab opened this way inherits its parent's group keys.
    #[must_use]
    pub const fn joins_parent_group(self) -> bool {
        matches!(
            self,
            Self::FromTabGroupUi | Self::FromLongpressBackgroundInGroup | Self::FromStartSurface
        )
    }
}

/// One item of the ordered tab sequence.
///
/// `root_id` is the legacy group key. An ungrouped tab's root is its own id.
/// `group_token` is the stable group key and is `None` for ungrouped tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub root_id: TabId,
    pub group_token: Option<GroupToken>,
    pub parent_id: Option<TabId>,
    pub launch_type: LaunchType,
    pub pinned: bool,
    pub incognito: bool,
}

impl Tab {
    /// An ungrouped, regular tab.
    #[must_use]
    pub fn new(id: impl Into<TabId>) -> Self {
        let id = id.into();
        Self {
            id,
            root_id: id,
            group_token: None,
            parent_id: None,
            launch_type: LaunchType::default(),
            pinned: false,
            incognito: false,
        }
    }

    #[must_use]
    pub fn with_root(mut self, root_id: impl Into<TabId>) -> Self {
        self.root_id = root_id.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: GroupToken) -> Self {
        self.group_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<TabId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn with_launch_type(mut self, launch_type: LaunchType) -> Self {
        self.launch_type = launch_type;
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    #[must_use]
    pub fn incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    /// Set both group keys at once.
    pub fn set_group_keys(&mut self, root_id: TabId, token: Option<GroupToken>) {
        self.root_id = root_id;
        self.group_token = token;
    }

    /// Reset to the ungrouped state: own id as root, no token.
    pub fn clear_group_keys(&mut self) {
        self.root_id = self.id;
        self.group_token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tab_is_its_own_root() {
        let tab = Tab::new(7);
        assert_eq!(tab.root_id, TabId::new(7));
        assert!(tab.group_token.is_none());
    }

    #[test]
    fn only_group_launches_join_parent() {
        assert!(LaunchType::FromTabGroupUi.joins_parent_group());
        assert!(LaunchType::FromLongpressBackgroundInGroup.joins_parent_group());
        assert!(LaunchType::FromStartSurface.joins_parent_group());
        assert!(!LaunchType::FromLink.joins_parent_group());
        assert!(!LaunchType::FromLongpressBackground.joins_parent_group());
        assert!(!LaunchType::FromRestore.joins_parent_group());
    }

    #[test]
    fn clear_group_keys_restores_self_root() {
        let mut tab = Tab::new(3).with_root(1).with_token(GroupToken::from_u128(9));
        tab.clear_group_keys();
        assert_eq!(tab.root_id, tab.id);
        assert_eq!(tab.group_token, None);
    }
}
