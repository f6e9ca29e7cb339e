//! Navigation controller: page through an indexed list of items.
//!
//! The controller owns no index. The host supplies an accessor/mutator
//! pair and a show callback; the controller validates each move against
//! the item count and calls back in a fixed order (set, then show).
//!
//! Moves come from three places:
//! - the previous/next triggers (either may be absent, not both)
//! - left/right arrow key-ups on the shared key bus
//! - enter key-ups, when enabled
//!
//! Setup returns a handle whose `cleanup` removes every listener it added.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::event::{Key, KeyBus, KeyUp, SubscriptionSet, Trigger};
use crate::types::{FIRST_ITEM_MESSAGE, LAST_ITEM_MESSAGE};

// ============================================================================
// OPTIONS
// ============================================================================

/// Collaborators and toggles for one controller.
///
/// Built with [`NavigationOptions::new`] plus the chained setters for the
/// optional parts. Defaults: no announce callback, no triggers, arrow
/// keys on, enter key off, always handle keys.
pub struct NavigationOptions {
    get_index: Box<dyn Fn() -> i64>,
    set_index: Box<dyn Fn(i64)>,
    on_show: Box<dyn Fn(i64)>,
    on_announce: Option<Box<dyn Fn(&str)>>,
    total_count: i64,
    prev_button: Option<Trigger>,
    next_button: Option<Trigger>,
    enable_enter_key: bool,
    enable_arrow_keys: bool,
    should_handle: Box<dyn Fn() -> bool>,
}

impl NavigationOptions {
    pub fn new(
        get_index: impl Fn() -> i64 + 'static,
        set_index: impl Fn(i64) + 'static,
        on_show: impl Fn(i64) + 'static,
        total_count: i64,
    ) -> Self {
        NavigationOptions {
            get_index: Box::new(get_index),
            set_index: Box::new(set_index),
            on_show: Box::new(on_show),
            on_announce: None,
            total_count,
            prev_button: None,
            next_button: None,
            enable_enter_key: false,
            enable_arrow_keys: true,
            should_handle: Box::new(|| true),
        }
    }

    /// Called with a message when a move is rejected at either end.
    pub fn on_announce(mut self, on_announce: impl Fn(&str) + 'static) -> Self {
        self.on_announce = Some(Box::new(on_announce));
        self
    }

    pub fn prev_button(mut self, trigger: Trigger) -> Self {
        self.prev_button = Some(trigger);
        self
    }

    pub fn next_button(mut self, trigger: Trigger) -> Self {
        self.next_button = Some(trigger);
        self
    }

    pub fn enable_enter_key(mut self, enabled: bool) -> Self {
        self.enable_enter_key = enabled;
        self
    }

    pub fn enable_arrow_keys(mut self, enabled: bool) -> Self {
        self.enable_arrow_keys = enabled;
        self
    }

    /// Gate keyboard handling; evaluated on every key-up.
    pub fn should_handle(mut self, should_handle: impl Fn() -> bool + 'static) -> Self {
        self.should_handle = Box::new(should_handle);
        self
    }
}

impl fmt::Debug for NavigationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationOptions")
            .field("total_count", &self.total_count)
            .field("has_announce", &self.on_announce.is_some())
            .field("prev_button", &self.prev_button)
            .field("next_button", &self.next_button)
            .field("enable_enter_key", &self.enable_enter_key)
            .field("enable_arrow_keys", &self.enable_arrow_keys)
            .finish()
    }
}

// ============================================================================
// MOVES
// ============================================================================

/// Outcome of a requested move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Index changed; set and show were called with it.
    Moved(i64),
    /// Target equals the current index. Nothing was called.
    Unchanged,
    /// Target below zero. Announced, nothing changed.
    BeforeFirst,
    /// Target at or past the item count. Announced, nothing changed.
    PastLast,
}

/// The move logic, shared by every listener of one setup.
pub struct Navigator {
    get_index: Box<dyn Fn() -> i64>,
    set_index: Box<dyn Fn(i64)>,
    on_show: Box<dyn Fn(i64)>,
    on_announce: Option<Box<dyn Fn(&str)>>,
    total_count: i64,
    enable_enter_key: bool,
    enable_arrow_keys: bool,
    should_handle: Box<dyn Fn() -> bool>,
}

impl Navigator {
    /// Current index as reported by the host.
    pub fn current(&self) -> i64 {
        (self.get_index)()
    }

    /// Move to `new_index` if it is in range and differs from the current index.
    pub fn go_to_index(&self, new_index: i64) -> Move {
        let current = self.current();

        if new_index < 0 {
            debug!(new_index, "rejected move before first item");
            self.announce(FIRST_ITEM_MESSAGE);
            return Move::BeforeFirst;
        }
        if new_index >= self.total_count {
            debug!(new_index, total = self.total_count, "rejected move past last item");
            self.announce(LAST_ITEM_MESSAGE);
            return Move::PastLast;
        }
        if new_index == current {
            return Move::Unchanged;
        }

        (self.set_index)(new_index);
        (self.on_show)(new_index);
        debug!(from = current, to = new_index, "moved");
        Move::Moved(new_index)
    }

    pub fn previous(&self) -> Move {
        self.go_to_index(self.current() - 1)
    }

    pub fn next(&self) -> Move {
        self.go_to_index(self.current() + 1)
    }

    /// React to a key-up. Returns None when the key is not handled.
    pub fn handle_key_up(&self, event: &KeyUp) -> Option<Move> {
        if event.target.accepts_text() {
            return None;
        }
        if !(self.should_handle)() {
            return None;
        }

        let outcome = match event.key {
            Key::ArrowLeft if self.enable_arrow_keys => {
                event.prevent_default();
                self.previous()
            }
            Key::ArrowRight if self.enable_arrow_keys => {
                event.prevent_default();
                self.next()
            }
            Key::Enter if self.enable_enter_key => {
                event.prevent_default();
                self.next()
            }
            _ => return None,
        };
        Some(outcome)
    }

    fn announce(&self, message: &str) {
        if let Some(on_announce) = &self.on_announce {
            on_announce(message);
        }
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("total_count", &self.total_count)
            .field("enable_enter_key", &self.enable_enter_key)
            .field("enable_arrow_keys", &self.enable_arrow_keys)
            .finish()
    }
}

// ============================================================================
// SETUP
// ============================================================================

/// A wired controller. Call [`NavigationHandle::cleanup`] on teardown.
///
/// Dropping the handle leaves the listeners in place.
#[derive(Debug)]
#[must_use = "listeners stay registered until cleanup() is called"]
pub struct NavigationHandle {
    navigator: Rc<Navigator>,
    subscriptions: SubscriptionSet,
}

impl NavigationHandle {
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Number of listeners this setup registered.
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_cancelled()
    }

    /// Remove every listener this setup registered. Safe to call twice.
    pub fn cleanup(&mut self) {
        if self.is_active() {
            debug!(listeners = self.subscriptions.len(), "navigation cleanup");
        }
        self.subscriptions.cancel_all();
    }
}

/// Wire previous/next triggers and key handling for one list.
///
/// Returns None, after logging a warning, when `total_count` is not
/// positive or when neither trigger is supplied. Nothing is registered
/// in that case.
pub fn setup_navigation(options: NavigationOptions, keys: &KeyBus) -> Option<NavigationHandle> {
    if options.total_count <= 0 {
        warn!(total_count = options.total_count, "setup_navigation: total_count must be a positive integer");
        return None;
    }
    if options.prev_button.is_none() && options.next_button.is_none() {
        warn!("setup_navigation: neither prev_button nor next_button supplied, at least one is required");
        return None;
    }

    let NavigationOptions {
        get_index,
        set_index,
        on_show,
        on_announce,
        total_count,
        prev_button,
        next_button,
        enable_enter_key,
        enable_arrow_keys,
        should_handle,
    } = options;

    let navigator = Rc::new(Navigator {
        get_index,
        set_index,
        on_show,
        on_announce,
        total_count,
        enable_enter_key,
        enable_arrow_keys,
        should_handle,
    });

    let mut subscriptions = SubscriptionSet::new();

    if let Some(prev) = &prev_button {
        let nav = Rc::clone(&navigator);
        subscriptions.listen(prev, move |_| {
            nav.previous();
        });
    }
    if let Some(next) = &next_button {
        let nav = Rc::clone(&navigator);
        subscriptions.listen(next, move |_| {
            nav.next();
        });
    }
    {
        let nav = Rc::clone(&navigator);
        subscriptions.listen(keys, move |event: &KeyUp| {
            nav.handle_key_up(event);
        });
    }

    debug!(total_count, listeners = subscriptions.len(), "navigation wired");

    Some(NavigationHandle {
        navigator,
        subscriptions,
    })
}

// ============================================================================
// TESTS
// ============================================================================
