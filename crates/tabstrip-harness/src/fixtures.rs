//! Reference collections.

use tabstrip_core::{GroupToken, InMemoryVisualStore, Tab, TabId, TabList};
use tabstrip_groups::{GroupPolicy, TabGroupEngine};

#[must_use]
pub fn id(raw: u32) -> TabId {
    TabId::new(raw)
}

#[must_use]
pub fn token(raw: u128) -> GroupToken {
    GroupToken::from_u128(raw)
}

/// `[T1, {T2, T3}, T4, {T5, T6}]`: groups keyed by T2 (token 20) and T5
/// (token 50).
#[must_use]
pub fn six_tab_list() -> TabList {
    let mut tabs = TabList::new();
    tabs.push(Tab::new(1));
    tabs.push(Tab::new(2).with_token(token(20)));
    tabs.push(Tab::new(3).with_root(2).with_token(token(20)));
    tabs.push(Tab::new(4));
    tabs.push(Tab::new(5).with_token(token(50)));
    tabs.push(Tab::new(6).with_root(5).with_token(token(50)));
    tabs
}

/// Restored engine over [`six_tab_list`].
#[must_use]
pub fn six_tab_engine(policy: GroupPolicy) -> TabGroupEngine {
    let mut engine =
        TabGroupEngine::with_store(six_tab_list(), policy, Box::new(InMemoryVisualStore::new()));
    engine.mark_restored();
    engine
}

/// Restored engine over `count` ungrouped tabs `T1..=Tcount`.
#[must_use]
pub fn flat_engine(count: u32, policy: GroupPolicy) -> TabGroupEngine {
    let mut tabs = TabList::new();
    for raw in 1..=count {
        tabs.push(Tab::new(raw));
    }
    let mut engine =
        TabGroupEngine::with_store(tabs, policy, Box::new(InMemoryVisualStore::new()));
    engine.mark_restored();
    engine
}
