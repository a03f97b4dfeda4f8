#![forbid(unsafe_code)]

//! Tab group index, mutation engine, and observer protocol.
//!
//! A [`TabGroupEngine`] owns one tab collection and keeps an index of its
//! groups in step with the tab order. Tabs are grouped by two keys:
//!
//! - the *legacy key* (`root_id`), a member id shared by every tab of the
//!   group, equal to the tab's own id when ungrouped;
//! - the optional *stable key* ([`GroupToken`](tabstrip_core::GroupToken)),
//!   an opaque 128-bit identity.
//!
//! Mutations (merge, move out, move group, undo, close) announce themselves
//! through [`GroupEvent`]s on an [`EventBus`] in two phases: will-events
//! before anything changes, did-events and aggregates after the index has
//! been resynced. Listeners may request further mutations through
//! [`EventContext::request`]; those run after the current operation.
//!
//! ```rust,ignore
//! let mut engine = TabGroupEngine::new(false, GroupPolicy::default());
//! engine.add_tab(Tab::new(1), None)?;
//! engine.add_tab(Tab::new(2), None)?;
//! engine.mark_restored();
//! engine.merge_tabs_to_group(TabId::new(2), TabId::new(1))?;
//! assert_eq!(engine.view().group_count(), Some(1));
//! ```

pub mod bus;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod hiding;
pub mod index;
pub mod view;
pub mod visuals;

pub use bus::{EventBus, EventContext, FollowUp, Subscription};
pub use config::GroupPolicy;
pub use context::OpContext;
pub use engine::{CloseOptions, TabGroupEngine};
pub use error::{ConfigError, GroupError};
pub use event::{GroupEvent, RemovalReason, UndoMetadata};
pub use hiding::HidingSet;
pub use index::{GroupIndex, TabGroup, is_order_valid};
pub use view::GroupView;
pub use visuals::{VisualOverrides, Visuals};
