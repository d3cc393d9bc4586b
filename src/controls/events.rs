/*
 * Event plumbing shared by all controls. Each control keeps a table of
 * subscriptions keyed by event name. Raising an event snapshots the handlers
 * subscribed at that moment and queues them; the queue is drained by `pump`
 * once the plugin has released every widget borrow, so handlers are free to
 * call back into the host. A handler attached after the event was raised does
 * not see it.
 */
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{WeakWidgetRef, WidgetRef};

pub type EventHandler = Rc<dyn Fn()>;

/// Identifies one subscription so it can be removed again on rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

struct Subscription {
    token: SubscriptionToken,
    event: String,
    handler: EventHandler,
}

#[derive(Default)]
pub struct EventTable {
    subscriptions: Vec<Subscription>,
    next_token: u64,
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.subscriptions.iter().map(|s| (&s.event, s.token)))
            .finish()
    }
}

impl EventTable {
    pub fn subscribe(&mut self, event: &str, handler: EventHandler) -> SubscriptionToken {
        self.next_token += 1;
        let token = SubscriptionToken(self.next_token);
        self.subscriptions.push(Subscription {
            token,
            event: event.to_string(),
            handler,
        });
        token
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.token != token);
        before != self.subscriptions.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.subscriptions.iter().filter(|s| s.event == event).count()
    }

    pub fn handlers(&self, event: &str) -> Vec<EventHandler> {
        self.subscriptions
            .iter()
            .filter(|s| s.event == event)
            .map(|s| s.handler.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

// Upper bound on deliveries per pump, so handlers that keep re-raising
// events cannot spin forever.
const MAX_DELIVERIES_PER_PUMP: usize = 1024;

thread_local! {
    static PENDING_EVENTS: RefCell<VecDeque<PendingEvent>> = RefCell::new(VecDeque::new());
}

struct PendingEvent {
    source: WeakWidgetRef,
    event: String,
    handlers: Vec<EventHandler>,
}

pub(crate) fn enqueue(source: WeakWidgetRef, event: &str, handlers: Vec<EventHandler>) {
    if handlers.is_empty() {
        return;
    }
    PENDING_EVENTS.with(|queue| {
        queue.borrow_mut().push_back(PendingEvent {
            source,
            event: event.to_string(),
            handlers,
        });
    });
}

fn next_pending() -> Option<PendingEvent> {
    PENDING_EVENTS.with(|queue| queue.borrow_mut().pop_front())
}

pub fn pending_count() -> usize {
    PENDING_EVENTS.with(|queue| queue.borrow().len())
}

/*
 * Delivers every queued event to the handlers captured when it was raised.
 * Events whose widget has been dropped or disposed in the meantime are
 * discarded. Returns the number of events delivered.
 */
pub fn pump() -> usize {
    let mut delivered = 0;
    while let Some(pending) = next_pending() {
        if delivered >= MAX_DELIVERIES_PER_PUMP {
            log::warn!("Events: Delivery limit reached, dropping remaining events");
            PENDING_EVENTS.with(|queue| queue.borrow_mut().clear());
            break;
        }
        let Some(widget) = pending.source.upgrade() else {
            continue;
        };
        if is_disposed(&widget) {
            continue;
        }
        log::trace!(
            "Events: Delivering {} to {} handler(s)",
            pending.event,
            pending.handlers.len()
        );
        for handler in pending.handlers {
            handler();
        }
        delivered += 1;
    }
    delivered
}

// A widget that is still borrowed cannot have been disposed in the meantime.
fn is_disposed(widget: &WidgetRef) -> bool {
    widget
        .try_borrow()
        .is_ok_and(|guard| guard.core().is_disposed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn unsubscribe_removes_only_the_given_token() {
        let mut table = EventTable::default();
        let first = table.subscribe("Click", Rc::new(|| {}));
        let _second = table.subscribe("Click", Rc::new(|| {}));
        assert_eq!(table.handler_count("Click"), 2);
        assert!(table.unsubscribe(first));
        assert!(!table.unsubscribe(first));
        assert_eq!(table.handler_count("Click"), 1);
    }

    #[test]
    fn handlers_are_filtered_by_event_name() {
        let mut table = EventTable::default();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        table.subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));
        table.subscribe("TextChanged", Rc::new(|| {}));
        for handler in table.handlers("Click") {
            handler();
        }
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handlers_are_captured_when_the_event_is_raised() {
        let widget = crate::controls::new_widget(crate::controls::panel_handler::Panel::new());
        let early = Rc::new(Cell::new(0));
        let late = Rc::new(Cell::new(0));
        let counter = early.clone();
        widget
            .borrow_mut()
            .core_mut()
            .events_mut()
            .subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));

        widget.borrow().core().raise("Click");
        let counter = late.clone();
        widget
            .borrow_mut()
            .core_mut()
            .events_mut()
            .subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));
        pump();

        assert_eq!(early.get(), 1);
        assert_eq!(late.get(), 0);
    }

    #[test]
    fn events_of_disposed_widgets_are_discarded() {
        let widget = crate::controls::new_widget(crate::controls::panel_handler::Panel::new());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        widget
            .borrow_mut()
            .core_mut()
            .events_mut()
            .subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));
        widget.borrow().core().raise("Click");
        assert_eq!(pending_count(), 1);
        crate::controls::dispose(&widget);
        assert_eq!(pump(), 0);
        assert_eq!(pending_count(), 0);
        assert_eq!(hits.get(), 0);
    }
}
