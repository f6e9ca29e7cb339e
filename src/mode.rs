//! Mode select modal: pick a mode from a radio group and persist it.
//!
//! The host hands over every handle the modal touches: the button that
//! opens it, its close button, the form, the page-load signal, the
//! dialog and the radio group. The modal only wires them together.
//!
//! Persisted state is one key-value pair: `selectedMode` holds the value
//! of the checked radio in the `mode` group.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::event::{EventSource, PageLoad, Submit, SubscriptionSet, Trigger};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{ModeOption, MODE_GROUP_NAME, SELECTED_MODE_KEY};

// ============================================================================
// DIALOG
// ============================================================================

/// Shared open/closed flag of a modal dialog.
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    open: Rc<Cell<bool>>,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_modal(&self) {
        self.open.set(true);
    }

    pub fn close(&self) {
        self.open.set(false);
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

// ============================================================================
// RADIO GROUP
// ============================================================================

#[derive(Debug)]
struct RadioState {
    options: Vec<ModeOption>,
    checked: Option<usize>,
}

/// A named group of radio buttons. At most one is checked.
///
/// Clones share the same buttons.
#[derive(Debug, Clone)]
pub struct RadioGroup {
    name: Rc<str>,
    state: Rc<RefCell<RadioState>>,
}

impl RadioGroup {
    pub fn new(name: &str, options: Vec<ModeOption>) -> Self {
        RadioGroup {
            name: Rc::from(name),
            state: Rc::new(RefCell::new(RadioState {
                options,
                checked: None,
            })),
        }
    }

    /// Radio group named `mode`, as the modal expects.
    pub fn modes(options: Vec<ModeOption>) -> Self {
        Self::new(MODE_GROUP_NAME, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.state.borrow().options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().options.is_empty()
    }

    pub fn options(&self) -> Vec<ModeOption> {
        self.state.borrow().options.clone()
    }

    pub fn checked_index(&self) -> Option<usize> {
        self.state.borrow().checked
    }

    /// Value of the checked radio, if any.
    pub fn checked_value(&self) -> Option<String> {
        let state = self.state.borrow();
        state
            .checked
            .and_then(|i| state.options.get(i))
            .map(|option| option.value.clone())
    }

    /// Check the radio at `index`, unchecking the rest. Out of range is ignored.
    pub fn check(&self, index: usize) -> bool {
        let mut state = self.state.borrow_mut();
        if index < state.options.len() {
            state.checked = Some(index);
            true
        } else {
            false
        }
    }

    /// Check the radio whose value is `value`. Unknown values are ignored.
    pub fn check_value(&self, value: &str) -> bool {
        let position = self
            .state
            .borrow()
            .options
            .iter()
            .position(|option| option.value == value);
        match position {
            Some(index) => self.check(index),
            None => false,
        }
    }
}

// ============================================================================
// SETUP
// ============================================================================

/// Handles the modal is wired to.
#[derive(Debug, Clone)]
pub struct ModeSelectElements {
    /// Opens the dialog.
    pub open_button: Trigger,
    /// Closes the dialog without saving.
    pub close_button: Trigger,
    /// Confirms the choice.
    pub form: EventSource<Submit>,
    /// Fired once the host is ready; restores the saved choice.
    pub page_load: EventSource<PageLoad>,
    pub dialog: Dialog,
    pub radios: RadioGroup,
}

impl ModeSelectElements {
    /// Fresh handles around a `mode` radio group with these options.
    pub fn new(options: Vec<ModeOption>) -> Self {
        ModeSelectElements {
            open_button: Trigger::new(),
            close_button: Trigger::new(),
            form: EventSource::new(),
            page_load: EventSource::new(),
            dialog: Dialog::new(),
            radios: RadioGroup::modes(options),
        }
    }
}

/// A wired mode select modal.
#[must_use = "listeners stay registered until cleanup() is called"]
pub struct ModeSelectHandle {
    subscriptions: SubscriptionSet,
}

impl ModeSelectHandle {
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_cancelled()
    }

    /// Remove every listener this setup registered. Safe to call twice.
    pub fn cleanup(&mut self) {
        self.subscriptions.cancel_all();
    }
}

impl fmt::Debug for ModeSelectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeSelectHandle")
            .field("listeners", &self.subscriptions.len())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Wire the modal: open, close, save on submit, restore on load.
///
/// Store failures are logged and otherwise ignored; the modal keeps
/// opening and closing either way.
pub fn setup_mode_select<S>(elements: &ModeSelectElements, store: S) -> ModeSelectHandle
where
    S: KeyValueStore + 'static,
{
    let store = Rc::new(store);
    let mut subscriptions = SubscriptionSet::new();

    {
        let dialog = elements.dialog.clone();
        subscriptions.listen(&elements.open_button, move |_| dialog.show_modal());
    }
    {
        let dialog = elements.dialog.clone();
        subscriptions.listen(&elements.close_button, move |_| dialog.close());
    }
    {
        let dialog = elements.dialog.clone();
        let radios = elements.radios.clone();
        let store = Rc::clone(&store);
        subscriptions.listen(&elements.form, move |event: &Submit| {
            event.prevent_default();
            if let Err(e) = save_mode(&radios, store.as_ref()) {
                warn!(error = %e, "failed to save selected mode");
            }
            dialog.close();
        });
    }
    {
        let radios = elements.radios.clone();
        let store = Rc::clone(&store);
        subscriptions.listen(&elements.page_load, move |_| {
            if let Err(e) = restore_mode(&radios, store.as_ref()) {
                warn!(error = %e, "failed to restore selected mode");
            }
        });
    }

    ModeSelectHandle { subscriptions }
}

/// Persist the checked radio's value. Returns the value saved, if any.
pub fn save_mode(radios: &RadioGroup, store: &dyn KeyValueStore) -> Result<Option<String>, StorageError> {
    let Some(value) = radios.checked_value() else {
        debug!(group = radios.name(), "no mode checked, nothing saved");
        return Ok(None);
    };
    store.set_item(SELECTED_MODE_KEY, &value)?;
    debug!(mode = %value, "saved selected mode");
    Ok(Some(value))
}

/// Check the radio matching the saved mode. Returns the restored value.
///
/// An empty or unknown saved value leaves the group untouched.
pub fn restore_mode(radios: &RadioGroup, store: &dyn KeyValueStore) -> Result<Option<String>, StorageError> {
    let saved = store.get_item(SELECTED_MODE_KEY)?;
    match saved {
        Some(value) if !value.is_empty() => {
            if radios.check_value(&value) {
                Ok(Some(value))
            } else {
                debug!(mode = %value, "saved mode not offered, ignoring");
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

// ============================================================================
// TESTS
// ============================================================================
