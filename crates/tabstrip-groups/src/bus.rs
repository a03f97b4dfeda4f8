#![forbid(unsafe_code)]

//! Event bus delivering [`GroupEvent`]s to listeners.
//!
//! # Design
//!
//! Listeners are stored as `Weak` callbacks; [`EventBus::subscribe`] returns
//! a [`Subscription`] guard that owns the strong reference. Dropping the
//! guard (or passing it to [`EventBus::unsubscribe`]) removes the listener.
//! Dead entries are pruned lazily on the next emission.
//!
//! Listeners run synchronously, in registration order, while the engine is
//! mid-operation. They receive an [`EventContext`] exposing a read-only
//! [`GroupView`] and a queue for [`FollowUp`] requests. The engine executes
//! queued requests after the current top-level operation finishes, so a
//! listener never observes a half-applied mutation.
//!
//! # Failure Modes
//!
//! - **Follow-up loops**: a listener that requests a follow-up for every
//!   event it sees can loop forever. The engine caps the number of drained
//!   rounds per operation and logs a warning when it drops requests.

use std::rc::{Rc, Weak};

use tabstrip_core::{GroupColor, TabId};

use crate::event::GroupEvent;
use crate::view::GroupView;

type ListenerRc = Rc<dyn Fn(&GroupEvent, &mut EventContext<'_>)>;
type ListenerWeak = Weak<dyn Fn(&GroupEvent, &mut EventContext<'_>)>;

/// A mutation a listener asks the engine to run once the current operation
/// has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    MergeTabs {
        source: TabId,
        destination: TabId,
    },
    MergeList {
        tabs: Vec<TabId>,
        destination: TabId,
        notify: bool,
    },
    MoveOutOfGroup {
        tab: TabId,
        trailing: bool,
    },
    MoveGroup {
        tab: TabId,
        index: usize,
    },
    CreateGroup {
        tab: TabId,
    },
    SetTitle {
        root: TabId,
        title: Option<String>,
    },
    SetColor {
        root: TabId,
        color: Option<GroupColor>,
    },
    SetCollapsed {
        root: TabId,
        collapsed: bool,
    },
    SelectTab {
        tab: TabId,
    },
}

/// What a listener can see and do while handling an event.
pub struct EventContext<'a> {
    view: GroupView<'a>,
    follow_ups: &'a mut Vec<FollowUp>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(view: GroupView<'a>, follow_ups: &'a mut Vec<FollowUp>) -> Self {
        Self { view, follow_ups }
    }

    /// Engine state at the moment of emission.
    #[must_use]
    pub fn view(&self) -> &GroupView<'a> {
        &self.view
    }

    /// Queue a mutation to run after the current operation.
    pub fn request(&mut self, follow_up: FollowUp) {
        self.follow_ups.push(follow_up);
    }
}

/// Ordered fan-out of group events.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<ListenerWeak>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered while the returned guard lives.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&GroupEvent, &mut EventContext<'_>) + 'static,
    ) -> Subscription {
        let strong: ListenerRc = Rc::new(listener);
        self.listeners.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Remove a listener now rather than at the next emission.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        drop(subscription);
        self.prune();
    }

    /// Number of registered listeners, including dead ones not yet pruned.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn prune(&mut self) {
        self.listeners.retain(|weak| weak.strong_count() > 0);
    }

    /// Deliver `event` to every live listener in registration order.
    pub fn emit(&mut self, event: &GroupEvent, ctx: &mut EventContext<'_>) {
        self.prune();
        let listeners: Vec<ListenerRc> = self.listeners.iter().filter_map(Weak::upgrade).collect();
        tracing::debug!(
            message = "tabstrip.event",
            event = event.name(),
            listeners = listeners.len()
        );
        for listener in listeners {
            listener(event, &mut *ctx);
        }
    }
}

/// RAII guard for a bus listener.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tabstrip_core::{PendingClosures, TabList};

    use super::*;
    use crate::hiding::HidingSet;
    use crate::index::GroupIndex;
    use crate::visuals::Visuals;

    struct Fixture {
        tabs: TabList,
        index: GroupIndex,
        visuals: Visuals,
        hiding: HidingSet,
        pending: PendingClosures,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tabs: TabList::new(),
                index: GroupIndex::default(),
                visuals: Visuals::default(),
                hiding: HidingSet::new(),
                pending: PendingClosures::new(),
            }
        }

        fn view(&self) -> GroupView<'_> {
            GroupView {
                tabs: &self.tabs,
                index: &self.index,
                visuals: &self.visuals,
                hiding: &self.hiding,
                pending: &self.pending,
                restored: true,
            }
        }
    }

    fn created(id: u32) -> GroupEvent {
        GroupEvent::GroupCreated {
            destination: TabId::new(id),
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let fixture = Fixture::new();
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);
        let _a = bus.subscribe(move |_, _| first.borrow_mut().push("a"));
        let _b = bus.subscribe(move |_, _| second.borrow_mut().push("b"));

        let mut follow_ups = Vec::new();
        let mut ctx = EventContext::new(fixture.view(), &mut follow_ups);
        bus.emit(&created(1), &mut ctx);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let fixture = Fixture::new();
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&count);
        let sub = bus.subscribe(move |_, _| *counter.borrow_mut() += 1);

        let mut follow_ups = Vec::new();
        bus.emit(&created(1), &mut EventContext::new(fixture.view(), &mut follow_ups));
        drop(sub);
        bus.emit(&created(2), &mut EventContext::new(fixture.view(), &mut follow_ups));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn unsubscribe_prunes_immediately() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe(|_, _| {});
        assert_eq!(bus.listener_count(), 1);
        bus.unsubscribe(sub);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn listeners_can_queue_follow_ups() {
        let fixture = Fixture::new();
        let mut bus = EventBus::new();
        let _sub = bus.subscribe(|event, ctx| {
            if let GroupEvent::GroupCreated { destination } = event {
                ctx.request(FollowUp::SetTitle {
                    root: *destination,
                    title: Some("New".into()),
                });
            }
        });
        let mut follow_ups = Vec::new();
        bus.emit(&created(4), &mut EventContext::new(fixture.view(), &mut follow_ups));
        assert_eq!(
            follow_ups,
            vec![FollowUp::SetTitle {
                root: TabId::new(4),
                title: Some("New".into()),
            }]
        );
    }
}
