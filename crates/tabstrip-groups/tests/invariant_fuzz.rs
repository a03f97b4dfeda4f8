//! Random operation streams against the public engine API.
//!
//! After every mutation the sequence must stay contiguous, every group key
//! must be one of its members, no stable key may be shared, and the index
//! must match a fresh rebuild. Rejected operations are fine; broken
//! structure is not.

use proptest::prelude::*;
use tabstrip_core::{Tab, TabId};
use tabstrip_groups::{CloseOptions, GroupPolicy, TabGroupEngine};
use tabstrip_harness::{check_invariants, six_tab_engine};

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

fn visible_ids(engine: &TabGroupEngine) -> Vec<TabId> {
    engine.tabs().ids()
}

fn pending_ids(engine: &TabGroupEngine) -> Vec<TabId> {
    engine
        .view()
        .pending_closures()
        .iter()
        .map(|closure| closure.tab.id)
        .collect()
}

fn pick(rng: &mut Lcg, ids: &[TabId]) -> Option<TabId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[rng.choose_index(ids.len())])
    }
}

/// Apply one random operation. Returns a label for failure messages.
fn step(engine: &mut TabGroupEngine, rng: &mut Lcg, next_id: &mut u32) -> String {
    let visible = visible_ids(engine);
    let len = visible.len();
    match rng.choose_index(11) {
        0 => {
            let (Some(source), Some(destination)) = (pick(rng, &visible), pick(rng, &visible))
            else {
                return "merge_tabs(skip)".into();
            };
            let _ = engine.merge_tabs_to_group(source, destination);
            format!("merge_tabs({source}, {destination})")
        }
        1 => {
            let Some(destination) = pick(rng, &visible) else {
                return "merge_list(skip)".into();
            };
            let count = 1 + rng.choose_index(3);
            let tabs: Vec<TabId> = (0..count).filter_map(|_| pick(rng, &visible)).collect();
            let notify = rng.choose_bool();
            let _ = engine.merge_list_to_group(&tabs, destination, notify);
            format!("merge_list({tabs:?}, {destination})")
        }
        2 => {
            let Some(tab) = pick(rng, &visible) else {
                return "move_out(skip)".into();
            };
            let trailing = rng.choose_bool();
            let _ = engine.move_tab_out_of_group(tab, trailing);
            format!("move_out({tab}, {trailing})")
        }
        3 => {
            let Some(tab) = pick(rng, &visible) else {
                return "move_tab(skip)".into();
            };
            let index = rng.choose_index(len + 2);
            let _ = engine.move_tab(tab, index);
            format!("move_tab({tab}, {index})")
        }
        4 => {
            let Some(tab) = pick(rng, &visible) else {
                return "move_group(skip)".into();
            };
            let index = rng.choose_index(len + 2);
            let _ = engine.move_related_tabs(tab, index);
            format!("move_group({tab}, {index})")
        }
        5 => {
            let Some(tab) = pick(rng, &visible) else {
                return "single_group(skip)".into();
            };
            let _ = engine.create_single_tab_group(tab, None);
            format!("single_group({tab})")
        }
        6 => {
            let count = 1 + rng.choose_index(2);
            let ids: Vec<TabId> = (0..count).filter_map(|_| pick(rng, &visible)).collect();
            let options = CloseOptions {
                allow_undo: rng.choose_bool() || rng.choose_bool(),
                hide_groups: rng.choose_bool(),
            };
            let _ = engine.close_tabs(&ids, options);
            format!("close({ids:?}, {options:?})")
        }
        7 => {
            let pending = pending_ids(engine);
            let Some(tab) = pick(rng, &pending) else {
                return "undo_closure(skip)".into();
            };
            let _ = engine.undo_closure(tab);
            format!("undo_closure({tab})")
        }
        8 => {
            let pending = pending_ids(engine);
            let Some(tab) = pick(rng, &pending) else {
                return "commit(skip)".into();
            };
            let _ = engine.commit_closure(tab);
            format!("commit({tab})")
        }
        9 => {
            let Some(tab) = pick(rng, &visible) else {
                return "select(skip)".into();
            };
            let _ = engine.select_tab(tab);
            format!("select({tab})")
        }
        _ => {
            let id = *next_id;
            *next_id += 1;
            let index = rng.choose_index(len + 1);
            let _ = engine.add_tab(Tab::new(id), Some(index));
            format!("add({id}, {index})")
        }
    }
}

fn structure(engine: &TabGroupEngine) -> Vec<(u32, u32)> {
    engine
        .tabs()
        .iter()
        .map(|tab| (tab.id.get(), tab.root_id.get()))
        .collect()
}

fn run_stream(seed: u64, steps: usize, policy: GroupPolicy) -> Result<TabGroupEngine, String> {
    let mut engine = six_tab_engine(policy);
    let mut rng = Lcg::new(seed);
    let mut next_id = 100;
    let mut trail = Vec::with_capacity(steps);
    for _ in 0..steps {
        trail.push(step(&mut engine, &mut rng, &mut next_id));
        let violations = check_invariants(&engine);
        if !violations.is_empty() {
            return Err(format!(
                "{violations:?} after {trail:?}\nstate: {:?}",
                structure(&engine)
            ));
        }
    }
    Ok(engine)
}

#[test]
fn fixed_seed_stream_keeps_invariants() {
    if let Err(report) = run_stream(0x5EED, 200, GroupPolicy::default()) {
        panic!("{report}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_streams_keep_invariants(
        seed in any::<u64>(),
        steps in 1usize..60,
        legacy in any::<bool>(),
    ) {
        let policy = if legacy { GroupPolicy::legacy() } else { GroupPolicy::default() };
        let result = run_stream(seed, steps, policy);
        prop_assert!(result.is_ok(), "{}", result.err().unwrap_or_default());
    }

    #[test]
    fn replay_is_deterministic(seed in any::<u64>(), steps in 1usize..40) {
        let first = run_stream(seed, steps, GroupPolicy::default());
        let second = run_stream(seed, steps, GroupPolicy::default());
        match (first, second) {
            (Ok(first), Ok(second)) => prop_assert_eq!(structure(&first), structure(&second)),
            (first, second) => prop_assert!(
                first.is_err() && second.is_err(),
                "replay diverged"
            ),
        }
    }
}
