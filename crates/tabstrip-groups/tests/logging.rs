//! Metric records and event logs seen through a capturing subscriber.

use tabstrip_core::{InMemoryVisualStore, LaunchType, Tab, TabList};
use tabstrip_groups::{GroupPolicy, TabGroupEngine};
use tabstrip_harness::{id, six_tab_engine, six_tab_list, with_captured_tracing};

fn loading_engine(tabs: TabList) -> TabGroupEngine {
    TabGroupEngine::with_store(
        tabs,
        GroupPolicy::default(),
        Box::new(InMemoryVisualStore::new()),
    )
}

#[test]
fn restore_records_order_validity() {
    let mut engine = loading_engine(six_tab_list());
    let ((), capture) = with_captured_tracing(|| engine.mark_restored());

    let records = capture.events_for("tabstrip.metrics");
    let order = records
        .iter()
        .find(|event| event.message() == Some("order_valid_on_restore"))
        .expect("order validity metric");
    assert_eq!(order.fields.get("order_valid").map(String::as_str), Some("true"));
    assert!(capture.with_message("tabstrip.restore.order_invalid").is_empty());
}

#[test]
fn split_run_is_repaired_and_counted() {
    let mut tabs = TabList::new();
    tabs.push(Tab::new(1).with_root(9));
    tabs.push(Tab::new(2).with_root(9));
    tabs.push(Tab::new(3));
    tabs.push(Tab::new(4).with_root(9));
    let mut engine = loading_engine(tabs);

    let ((), capture) = with_captured_tracing(|| engine.mark_restored());

    assert_eq!(capture.with_message("tabstrip.restore.order_invalid").len(), 1);
    assert_eq!(capture.with_message("tabstrip.fix_root_ids").len(), 1);
    let fixed = capture
        .events_for("tabstrip.metrics")
        .into_iter()
        .find(|event| event.message() == Some("root_ids_fixed"))
        .expect("fix-up metric");
    assert_eq!(fixed.fields.get("count").map(String::as_str), Some("1"));
    assert_eq!(engine.view().related_tab_ids(id(2)), vec![id(1), id(2)]);
    assert!(!engine.view().is_tab_in_group(id(4)));
}

#[test]
fn context_menu_group_records_metric() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let child = Tab::new(7)
        .with_parent(1)
        .with_launch_type(LaunchType::FromLongpressBackgroundInGroup);

    let (result, capture) = with_captured_tracing(|| engine.add_tab(child, None));

    assert_eq!(result, Ok(1));
    assert_eq!(
        capture
            .events_for("tabstrip.metrics")
            .iter()
            .filter(|event| event.message() == Some("group_created_with_context_menu"))
            .count(),
        1
    );
}

#[test]
fn every_emission_is_logged_in_order() {
    let mut engine = six_tab_engine(GroupPolicy::default());
    let ((), capture) = with_captured_tracing(|| {
        engine.move_related_tabs(id(2), 6).expect("move group");
    });

    let names: Vec<String> = capture
        .with_message("tabstrip.event")
        .into_iter()
        .filter_map(|event| event.fields.get("event").cloned())
        .collect();
    assert_eq!(names, vec!["will_move_group", "did_move_group"]);
}
