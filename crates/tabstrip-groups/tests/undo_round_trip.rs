//! Merge followed by undo restores positions and both keys exactly.

use proptest::prelude::*;
use tabstrip_core::{GroupToken, TabId};
use tabstrip_groups::{GroupEvent, GroupPolicy, TabGroupEngine, UndoMetadata};
use tabstrip_harness::{EventLog, assert_invariants, id, six_tab_engine};

type Keys = Vec<(TabId, TabId, Option<GroupToken>)>;

fn keys(engine: &TabGroupEngine) -> Keys {
    engine
        .tabs()
        .iter()
        .map(|tab| (tab.id, tab.root_id, tab.group_token))
        .collect()
}

fn extended_snapshot(log: &EventLog) -> Vec<UndoMetadata> {
    log.events()
        .into_iter()
        .find_map(|event| match event {
            GroupEvent::GroupExtended { snapshot, .. } => Some(snapshot),
            _ => None,
        })
        .expect("merge extended a group")
}

#[test]
fn undo_after_backward_group_merge() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let before = keys(&engine);
    let log = EventLog::attach(&mut engine);

    engine.merge_tabs_to_group(id(2), id(5)).expect("merge");
    let snapshot = extended_snapshot(&log);
    log.clear();
    engine.undo_merge(&snapshot).expect("undo");

    assert_eq!(keys(&engine), before);
    assert_eq!(engine.view().group_roots(), vec![id(2), id(5)]);
    assert_invariants(&engine);
}

#[test]
fn undo_announces_move_out_then_merge() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let log = EventLog::attach(&mut engine);
    engine.merge_tabs_to_group(id(4), id(2)).expect("merge");
    let snapshot = extended_snapshot(&log);
    log.clear();

    let moved = snapshot[1];
    assert_eq!(moved.tab, id(4));
    engine.undo_grouped_tab(moved).expect("undo");

    assert_eq!(
        log.names(),
        vec!["did_move_tab_out_of_group"],
        "an ungrouped original state never re-announces a merge"
    );
    assert!(!engine.view().is_tab_in_group(id(4)));
    assert_invariants(&engine);
}

#[test]
fn undo_into_group_reports_merge() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let log = EventLog::attach(&mut engine);
    engine.merge_tabs_to_group(id(2), id(5)).expect("merge");
    let snapshot = extended_snapshot(&log);
    log.clear();

    engine.undo_grouped_tab(snapshot[2]).expect("undo T3");

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        GroupEvent::DidMoveTabOutOfGroup { tab, .. } if tab == id(3)
    ));
    assert!(matches!(
        events[1],
        GroupEvent::DidMergeTabToGroup { tab, .. } if tab == id(3)
    ));
}

#[test]
fn undo_partial_merge_restores_rekeyed_members() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let before = keys(&engine);
    let log = EventLog::attach(&mut engine);

    engine
        .merge_list_to_group(&[id(2)], id(5), true)
        .expect("merge");
    let snapshot = extended_snapshot(&log);
    assert_eq!(snapshot.len(), 3);
    engine.undo_merge(&snapshot).expect("undo");

    assert_eq!(keys(&engine), before);
    assert_invariants(&engine);
}

#[test]
fn legacy_mode_round_trip() {
    let mut engine = six_tab_engine(GroupPolicy::legacy());
    let before = keys(&engine);
    let log = EventLog::attach(&mut engine);

    engine.merge_tabs_to_group(id(1), id(3)).expect("merge");
    let snapshot = extended_snapshot(&log);
    engine.undo_merge(&snapshot).expect("undo");

    assert_eq!(keys(&engine), before);
    assert_invariants(&engine);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn merge_then_undo_is_identity(source in 1u32..=6, destination in 1u32..=6) {
        let mut engine = six_tab_engine(GroupPolicy::default());
        let before = keys(&engine);
        let log = EventLog::attach(&mut engine);

        engine
            .merge_tabs_to_group(id(source), id(destination))
            .expect("merge");
        let snapshot = log.events().into_iter().find_map(|event| match event {
            GroupEvent::GroupExtended { snapshot, .. } => Some(snapshot),
            _ => None,
        });
        if let Some(snapshot) = snapshot {
            engine.undo_merge(&snapshot).expect("undo");
            prop_assert_eq!(keys(&engine), before);
        }
        assert_invariants(&engine);
    }
}
