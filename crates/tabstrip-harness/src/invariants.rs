//! Structural invariants of a restored engine.

use rustc_hash::{FxHashMap, FxHashSet};
use tabstrip_core::{GroupToken, TabId};
use tabstrip_groups::{GroupIndex, TabGroupEngine, is_order_valid};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A legacy key occupies more than one run of the sequence.
    NotContiguous,
    /// A group key that is not one of its members.
    StaleRoot(TabId),
    /// One stable key carried by several groups.
    SharedToken(GroupToken),
    /// The index differs from a fresh rebuild.
    IndexDrift,
}

/// Collect every violation.
#[must_use]
pub fn check_invariants(engine: &TabGroupEngine) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    if !is_order_valid(engine.tabs()) {
        violations.push(InvariantViolation::NotContiguous);
    }

    let index = engine.index();
    violations.extend(index.stale_roots().into_iter().map(InvariantViolation::StaleRoot));

    let mut owners: FxHashMap<GroupToken, FxHashSet<TabId>> = FxHashMap::default();
    for group in index.groups() {
        if let Some(token) = group.token() {
            owners.entry(token).or_default().insert(group.root());
        }
    }
    let mut shared: Vec<GroupToken> = owners
        .into_iter()
        .filter(|(_, roots)| roots.len() > 1)
        .map(|(token, _)| token)
        .collect();
    shared.sort_by_key(|token| token.as_u128());
    violations.extend(shared.into_iter().map(InvariantViolation::SharedToken));

    let fresh = GroupIndex::build(engine.tabs());
    if fresh.group_roots() != index.group_roots()
        || fresh.representative_count() != index.representative_count()
        || fresh
            .group_roots()
            .iter()
            .any(|root| fresh.members(*root) != index.members(*root))
    {
        violations.push(InvariantViolation::IndexDrift);
    }
    violations
}

/// Panic with the engine state when any invariant is broken.
#[track_caller]
pub fn assert_invariants(engine: &TabGroupEngine) {
    let violations = check_invariants(engine);
    assert!(
        violations.is_empty(),
        "invariants broken: {violations:?}\norder: {:?}",
        engine
            .tabs()
            .iter()
            .map(|tab| (tab.id.get(), tab.root_id.get()))
            .collect::<Vec<_>>()
    );
}
