//! Event surface: the handles UI components subscribe to.
//!
//! Components never reach for a global document. Hosts create the
//! sources (buttons, the page-wide key-up stream, form submits) and hand
//! them to the components, which subscribe and later unsubscribe.
//!
//! Structure:
//! - `EventSource<E>`: a shared, cloneable listener list
//! - Event payloads: `Click`, `KeyUp`, `Submit`, `PageLoad`
//! - Aliases for the common sources: `Trigger`, `KeyBus`
//!
//! Everything here is single-threaded (`Rc`, `RefCell`, `Cell`).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// ============================================================================
// LISTENER IDS
// ============================================================================

/// Identifies one subscription on one source.
///
/// Ids are unique per source, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Listener<E>)>,
}

// ============================================================================
// EVENT SOURCE
// ============================================================================

/// A shared list of listeners for events of type `E`.
///
/// Cloning yields another handle to the same list, so a host can keep
/// one clone to dispatch from while components hold others to subscribe.
pub struct EventSource<E> {
    inner: Rc<RefCell<Listeners<E>>>,
}

impl<E> EventSource<E> {
    pub fn new() -> Self {
        EventSource {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(entry_id, _)| *entry_id != id);
        inner.entries.len() != before
    }

    /// Deliver an event to every listener, returning how many ran.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe,
    /// unsubscribe or dispatch again without a borrow conflict. A listener
    /// added during dispatch first runs on the next event. A listener
    /// removed during dispatch does not run again, this event included.
    pub fn dispatch(&self, event: &E) -> usize {
        let snapshot: Vec<(ListenerId, Listener<E>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        let mut ran = 0;
        for (id, listener) in &snapshot {
            if !self.is_subscribed(*id) {
                continue;
            }
            listener(event);
            ran += 1;
        }
        ran
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|(entry_id, _)| *entry_id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl<E> Clone for EventSource<E> {
    fn clone(&self) -> Self {
        EventSource {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ============================================================================
// PAYLOADS
// ============================================================================

/// A trigger was activated (button click, accelerator key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Click;

/// A form was submitted.
#[derive(Debug, Default)]
pub struct Submit {
    default_prevented: Cell<bool>,
}

impl Submit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// The host finished loading and components may restore state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLoad;

/// Logical key carried by a key-up event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Tab,
    Backspace,
    Space,
    Char(char),
    Other,
}

/// Where keyboard focus was when the key was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// Nothing in particular focused.
    #[default]
    Document,
    Button,
    /// Single-line text field.
    Input,
    /// Multi-line text field.
    TextArea,
}

impl FocusTarget {
    /// Text fields consume arrow and enter keys themselves.
    pub fn accepts_text(self) -> bool {
        matches!(self, FocusTarget::Input | FocusTarget::TextArea)
    }
}

/// A released key, as seen by page-wide listeners.
#[derive(Debug)]
pub struct KeyUp {
    pub key: Key,
    pub target: FocusTarget,
    default_prevented: Cell<bool>,
}

impl KeyUp {
    pub fn new(key: Key, target: FocusTarget) -> Self {
        KeyUp {
            key,
            target,
            default_prevented: Cell::new(false),
        }
    }

    /// Mark the key as handled so the host skips its own default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

// ============================================================================
// COMMON SOURCES
// ============================================================================

/// A clickable trigger such as a button.
pub type Trigger = EventSource<Click>;

/// The page-wide key-up stream. Every subscriber sees every event.
pub type KeyBus = EventSource<KeyUp>;

impl EventSource<Click> {
    /// Activate the trigger, as a click would.
    pub fn activate(&self) -> usize {
        self.dispatch(&Click)
    }
}

impl EventSource<KeyUp> {
    /// Dispatch a key-up and report whether any listener handled it.
    pub fn release(&self, key: Key, target: FocusTarget) -> bool {
        let event = KeyUp::new(key, target);
        self.dispatch(&event);
        event.default_prevented()
    }
}

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

/// An unsubscribe action bound to its source.
pub struct Subscription {
    cancel: Box<dyn FnOnce()>,
}

impl Subscription {
    pub fn new<E: 'static>(source: &EventSource<E>, id: ListenerId) -> Self {
        let source = source.clone();
        Subscription {
            cancel: Box::new(move || {
                source.unsubscribe(id);
            }),
        }
    }

    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// Listeners registered by one component setup, removed together.
///
/// `cancel_all` may be called any number of times; only the first call
/// does anything. Dropping the set does NOT unsubscribe.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
    cancelled: bool,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `source` and remember how to undo it.
    pub fn listen<E: 'static>(&mut self, source: &EventSource<E>, listener: impl Fn(&E) + 'static) {
        let id = source.subscribe(listener);
        self.subscriptions.push(Subscription::new(source, id));
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn cancel_all(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_listeners_in_order() {
        let source: EventSource<u32> = EventSource::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        source.subscribe(move |n| a.borrow_mut().push(("a", *n)));
        let b = Rc::clone(&seen);
        source.subscribe(move |n| b.borrow_mut().push(("b", *n)));

        assert_eq!(source.dispatch(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let source: EventSource<()> = EventSource::new();
        let first = source.subscribe(|_| {});
        source.subscribe(|_| {});

        assert!(source.unsubscribe(first));
        assert!(!source.unsubscribe(first));
        assert_eq!(source.listener_count(), 1);
    }

    #[test]
    fn clones_share_listeners() {
        let source: EventSource<()> = EventSource::new();
        let other = source.clone();
        other.subscribe(|_| {});

        assert_eq!(source.listener_count(), 1);
        assert_eq!(source.dispatch(&()), 1);
        assert_eq!(EventSource::<()>::new().listener_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_dispatch() {
        let source: EventSource<()> = EventSource::new();
        let id_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let calls = Rc::new(Cell::new(0));

        let handle = source.clone();
        let slot = Rc::clone(&id_slot);
        let counter = Rc::clone(&calls);
        let id = source.subscribe(move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = slot.get() {
                handle.unsubscribe(id);
            }
        });
        id_slot.set(Some(id));

        source.dispatch(&());
        source.dispatch(&());
        assert_eq!(calls.get(), 1);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn listener_removed_mid_dispatch_skips_current_event() {
        let source: EventSource<()> = EventSource::new();
        let later_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let later_calls = Rc::new(Cell::new(0));

        let handle = source.clone();
        let slot = Rc::clone(&later_slot);
        source.subscribe(move |_| {
            if let Some(id) = slot.get() {
                handle.unsubscribe(id);
            }
        });
        let counter = Rc::clone(&later_calls);
        let later = source.subscribe(move |_| counter.set(counter.get() + 1));
        later_slot.set(Some(later));

        assert_eq!(source.dispatch(&()), 1);
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn listener_added_mid_dispatch_starts_next_event() {
        let source: EventSource<()> = EventSource::new();
        let added_calls = Rc::new(Cell::new(0));
        let added = Rc::new(Cell::new(false));

        let handle = source.clone();
        let counter = Rc::clone(&added_calls);
        let once = Rc::clone(&added);
        source.subscribe(move |_| {
            if !once.replace(true) {
                let counter = Rc::clone(&counter);
                handle.subscribe(move |_| counter.set(counter.get() + 1));
            }
        });

        assert_eq!(source.dispatch(&()), 1);
        assert_eq!(added_calls.get(), 0);
        assert_eq!(source.dispatch(&()), 2);
        assert_eq!(added_calls.get(), 1);
    }

    #[test]
    fn release_reports_prevented_default() {
        let keys = KeyBus::new();
        assert!(!keys.release(Key::Enter, FocusTarget::Document));

        keys.subscribe(|event: &KeyUp| {
            if event.key == Key::Enter {
                event.prevent_default();
            }
        });
        assert!(keys.release(Key::Enter, FocusTarget::Document));
        assert!(!keys.release(Key::Escape, FocusTarget::Document));
    }

    #[test]
    fn text_fields_accept_text() {
        assert!(FocusTarget::Input.accepts_text());
        assert!(FocusTarget::TextArea.accepts_text());
        assert!(!FocusTarget::Document.accepts_text());
        assert!(!FocusTarget::Button.accepts_text());
    }

    #[test]
    fn subscription_set_cancels_once() {
        let trigger = Trigger::new();
        let mut set = SubscriptionSet::new();
        set.listen(&trigger, |_| {});
        set.listen(&trigger, |_| {});
        assert_eq!(trigger.listener_count(), 2);

        set.cancel_all();
        assert_eq!(trigger.listener_count(), 0);
        assert!(set.is_cancelled());

        // Second call is a no-op, even if the source gained listeners since.
        trigger.subscribe(|_| {});
        set.cancel_all();
        assert_eq!(trigger.listener_count(), 1);
    }

    #[test]
    fn dropping_subscription_set_keeps_listeners() {
        let trigger = Trigger::new();
        {
            let mut set = SubscriptionSet::new();
            set.listen(&trigger, |_| {});
        }
        assert_eq!(trigger.listener_count(), 1);
    }
}
