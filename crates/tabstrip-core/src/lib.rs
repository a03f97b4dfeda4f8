#![forbid(unsafe_code)]

//! Core tab model for tabstrip.
//!
//! This crate holds the pieces the group engine treats as collaborators:
//!
//! - [`Tab`] and its identifiers ([`TabId`], [`GroupToken`]);
//! - the ordered sequence [`TabList`] with insert-before move semantics;
//! - [`PendingClosures`], the undoable-closure ledger;
//! - the [`VisualStore`] contract for group title/color/collapsed metadata.

pub mod closure;
pub mod id;
pub mod tab;
pub mod tab_list;
pub mod visual;

pub use closure::{PendingClosure, PendingClosures};
pub use id::{GroupToken, TabId};
pub use tab::{LaunchType, Tab};
pub use tab_list::{TabList, TabMove};
pub use visual::{GroupColor, GroupVisuals, InMemoryVisualStore, VisualStore};
