#![forbid(unsafe_code)]

//! Test harness and reference fixtures for tabstrip.
//!
//! - [`EventLog`] records every [`GroupEvent`](tabstrip_groups::GroupEvent)
//!   an engine emits and renders it as JSONL for failure output.
//! - [`fixtures`] builds the reference collections used across tests.
//! - [`assert_invariants`] checks the structural invariants that must hold
//!   after every public engine call.
//! - [`capture`] collects `tracing` output, including metric records.

pub mod capture;
pub mod event_log;
pub mod fixtures;
pub mod invariants;

pub use capture::{CapturedEvent, CaptureHandle, init_test_logging, with_captured_tracing};
pub use event_log::EventLog;
pub use fixtures::{flat_engine, id, six_tab_engine, six_tab_list, token};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
