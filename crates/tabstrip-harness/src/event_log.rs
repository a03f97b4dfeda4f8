//! Recording listener for engine events.

use std::cell::RefCell;
use std::rc::Rc;

use tabstrip_groups::{GroupEvent, Subscription, TabGroupEngine};

/// Shared, append-only record of emitted events.
///
/// The log stays attached while the value lives; clones share the record.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GroupEvent>>>,
    _subscription: Rc<Subscription>,
}

impl EventLog {
    /// Subscribe a new log to `engine`.
    pub fn attach(engine: &mut TabGroupEngine) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = engine.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));
        Self {
            events,
            _subscription: Rc::new(subscription),
        }
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<GroupEvent> {
        self.events.borrow().clone()
    }

    /// Event names in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(GroupEvent::name).collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Events matching `predicate`, in order.
    #[must_use]
    pub fn filtered(&self, predicate: impl Fn(&GroupEvent) -> bool) -> Vec<GroupEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }

    /// One JSON object per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| serde_json::to_string(event).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
