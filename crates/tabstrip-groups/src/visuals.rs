#![forbid(unsafe_code)]

//! Visual metadata access for the engine: backing store plus override table.
//!
//! [`VisualOverrides`] holds metadata for groups owned by an external sync
//! collaborator. The host populates it when a window attaches and clears it
//! on detach; while populated, reads consult it before the store.

use rustc_hash::FxHashMap;
use tabstrip_core::{GroupColor, GroupVisuals, InMemoryVisualStore, TabId, VisualStore};

/// Override table consulted before the [`VisualStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualOverrides {
    entries: FxHashMap<TabId, GroupVisuals>,
}

impl VisualOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the override for a legacy key.
    pub fn populate(&mut self, root: TabId, visuals: GroupVisuals) {
        self.entries.insert(root, visuals);
    }

    /// Drop every override.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, root: TabId) -> Option<&GroupVisuals> {
        self.entries.get(&root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Store and overrides, as owned by one engine.
pub struct Visuals {
    store: Box<dyn VisualStore>,
    overrides: VisualOverrides,
    fallback_color: GroupColor,
}

impl std::fmt::Debug for Visuals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visuals")
            .field("overrides", &self.overrides)
            .field("fallback_color", &self.fallback_color)
            .finish_non_exhaustive()
    }
}

impl Default for Visuals {
    fn default() -> Self {
        Self::new(Box::new(InMemoryVisualStore::new()), GroupColor::Grey)
    }
}

impl Visuals {
    #[must_use]
    pub fn new(store: Box<dyn VisualStore>, fallback_color: GroupColor) -> Self {
        Self {
            store,
            overrides: VisualOverrides::new(),
            fallback_color,
        }
    }

    #[must_use]
    pub fn title(&self, root: TabId) -> Option<String> {
        match self.overrides.get(root) {
            Some(visuals) => visuals.title.clone(),
            None => self.store.title(root),
        }
    }

    /// Stored color, `None` when unset.
    #[must_use]
    pub fn color(&self, root: TabId) -> Option<GroupColor> {
        match self.overrides.get(root) {
            Some(visuals) => visuals.color,
            None => self.store.color(root),
        }
    }

    /// Stored color, or the fallback when unset.
    #[must_use]
    pub fn color_or_fallback(&self, root: TabId) -> GroupColor {
        self.color(root).unwrap_or(self.fallback_color)
    }

    #[must_use]
    pub fn collapsed(&self, root: TabId) -> bool {
        match self.overrides.get(root) {
            Some(visuals) => visuals.collapsed,
            None => self.store.collapsed(root),
        }
    }

    /// Everything stored for `root`, overrides applied.
    #[must_use]
    pub fn snapshot(&self, root: TabId) -> GroupVisuals {
        GroupVisuals {
            title: self.title(root),
            color: self.color(root),
            collapsed: self.collapsed(root),
        }
    }

    #[must_use]
    pub const fn fallback_color(&self) -> GroupColor {
        self.fallback_color
    }

    #[must_use]
    pub fn overrides(&self) -> &VisualOverrides {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut VisualOverrides {
        &mut self.overrides
    }

    pub(crate) fn store_mut(&mut self) -> &mut dyn VisualStore {
        self.store.as_mut()
    }

    /// Copy every stored attribute from `from` to `to`, leaving `from` intact.
    pub(crate) fn copy(&mut self, from: TabId, to: TabId) {
        let visuals = self.store.snapshot(from);
        self.write(to, &visuals);
    }

    /// Write the set attributes of `visuals` under `root`.
    pub(crate) fn write(&mut self, root: TabId, visuals: &GroupVisuals) {
        if let Some(title) = &visuals.title {
            self.store.set_title(root, title);
        }
        if let Some(color) = visuals.color {
            self.store.set_color(root, color);
        }
        if visuals.collapsed {
            self.store.set_collapsed(root, true);
        }
    }

    /// Delete every stored attribute for `root`.
    pub(crate) fn delete(&mut self, root: TabId) {
        self.store.delete_title(root);
        self.store.delete_color(root);
        self.store.delete_collapsed(root);
    }

    /// Move every stored attribute from `from` to `to`.
    pub(crate) fn rename(&mut self, from: TabId, to: TabId) {
        if from == to {
            return;
        }
        self.copy(from, to);
        self.delete(from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> TabId {
        TabId::new(raw)
    }

    #[test]
    fn overrides_win_over_store() {
        let mut visuals = Visuals::default();
        visuals.store_mut().set_title(id(1), "Stored");
        visuals.overrides_mut().populate(
            id(1),
            GroupVisuals {
                title: Some("Synced".into()),
                color: Some(GroupColor::Green),
                collapsed: false,
            },
        );
        assert_eq!(visuals.title(id(1)).as_deref(), Some("Synced"));
        assert_eq!(visuals.color(id(1)), Some(GroupColor::Green));
        visuals.overrides_mut().clear();
        assert_eq!(visuals.title(id(1)).as_deref(), Some("Stored"));
        assert_eq!(visuals.color(id(1)), None);
    }

    #[test]
    fn unset_color_uses_fallback() {
        let visuals = Visuals::new(Box::new(InMemoryVisualStore::new()), GroupColor::Orange);
        assert_eq!(visuals.color_or_fallback(id(3)), GroupColor::Orange);
    }

    #[test]
    fn rename_moves_every_attribute() {
        let mut visuals = Visuals::default();
        visuals.store_mut().set_title(id(2), "Trip");
        visuals.store_mut().set_color(id(2), GroupColor::Red);
        visuals.store_mut().set_collapsed(id(2), true);
        visuals.rename(id(2), id(3));
        assert_eq!(visuals.title(id(3)).as_deref(), Some("Trip"));
        assert_eq!(visuals.color(id(3)), Some(GroupColor::Red));
        assert!(visuals.collapsed(id(3)));
        assert!(visuals.snapshot(id(2)).is_empty());
    }

    #[test]
    fn copy_duplicates_without_deleting() {
        let mut visuals = Visuals::default();
        visuals.store_mut().set_title(id(5), "Shared");
        visuals.copy(id(5), id(6));
        assert_eq!(visuals.title(id(5)).as_deref(), Some("Shared"));
        assert_eq!(visuals.title(id(6)).as_deref(), Some("Shared"));
    }
}
