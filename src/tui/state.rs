//! TUI state: the host page the components are wired into.
//!
//! The navigation controller and the mode modal own no UI state. This
//! module is the host that owns it: the current index, the last
//! announcement, the note field and the modal cursor. Shared values
//! live behind `Rc` cells so component callbacks can reach them.
//!
//! Design principle: `UiState` is plain data driven by the pure
//! `update` function. `Surface` holds the event sources that the
//! effects layer dispatches into.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use crossterm::event::{KeyEvent, MouseEvent};
use tracing::warn;

use crate::event::{FocusTarget, KeyBus, PageLoad, Trigger};
use crate::mode::{setup_mode_select, ModeSelectElements, ModeSelectHandle};
use crate::navigation::{setup_navigation, NavigationHandle, NavigationOptions};
use crate::storage::KeyValueStore;
use crate::types::BrowseConfig;

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
#[derive(Debug)]
pub enum AppEvent {
    /// A terminal key event from the crossterm reader thread.
    Key(KeyEvent),
    /// A mouse event (clicks on the on-screen buttons).
    Mouse(MouseEvent),
    /// The terminal was resized; redraw.
    Resize,
}

// ============================================================================
// PAGE STATE
// ============================================================================

/// Host-owned values the navigation callbacks read and write.
///
/// Clones share the same cells.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Index written by `set_index`, read by `get_index`.
    pub index: Rc<Cell<i64>>,
    /// Index the view renders, updated by `on_show`.
    pub shown: Rc<Cell<i64>>,
    /// Last boundary announcement, cleared on the next successful move.
    pub status: Rc<RefCell<Option<String>>>,
}

impl PageState {
    pub fn starting_at(index: i64) -> Self {
        let page = PageState::default();
        page.index.set(index);
        page.shown.set(index);
        page
    }

    pub fn status(&self) -> Option<String> {
        self.status.borrow().clone()
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// Event sources of the terminal page.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Page-wide key-up stream.
    pub keys: KeyBus,
    pub prev_button: Trigger,
    pub next_button: Trigger,
    /// Handles of the mode select modal, its open button included.
    pub mode: ModeSelectElements,
}

// ============================================================================
// UI STATE
// ============================================================================

/// Which widget has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The item pane; navigation keys apply.
    #[default]
    Pager,
    /// The single-line note field.
    Note,
}

impl Focus {
    pub fn target(self) -> FocusTarget {
        match self {
            Focus::Pager => FocusTarget::Document,
            Focus::Note => FocusTarget::Input,
        }
    }
}

/// Host-local state driven by the pure update function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub focus: Focus,
    /// Contents of the note field.
    pub note: String,
    /// Highlighted row in the mode modal.
    pub modal_cursor: usize,
    /// Set to true when the app should exit on the next tick.
    pub should_quit: bool,
}

/// Read-only facts the key mapping and update functions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub focus: FocusTarget,
    pub modal_open: bool,
    pub mode_count: usize,
    pub checked_mode: Option<usize>,
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic user action, decoupled from raw key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Activate the previous button.
    PressPrev,
    /// Activate the next button.
    PressNext,
    /// Activate the mode select button.
    OpenModeSelect,
    /// Move focus between the pager and the note field.
    ToggleFocus,
    /// Return focus to the pager.
    LeaveNote,
    /// Type a character into the note field.
    NoteInput(char),
    /// Delete the last character of the note.
    NoteBackspace,
    /// Move the modal cursor up.
    ModalUp,
    /// Move the modal cursor down.
    ModalDown,
    /// Check the radio under the modal cursor.
    ModalCheck,
    /// Submit the modal form.
    ModalSubmit,
    /// Close the modal without saving.
    ModalClose,
    /// Quit the application.
    Quit,
}

/// On-screen control a click or accelerator activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prev,
    Next,
    ModeSelect,
    ModalClose,
}

/// Side effect requested by the pure update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Activate a trigger on the surface.
    Activate(Control),
    /// Check a radio in the mode group.
    CheckMode(usize),
    /// Dispatch a submit on the mode form.
    SubmitMode,
    /// Leave the event loop.
    Quit,
}

// ============================================================================
// APP
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    /// File the items came from.
    pub source: PathBuf,
    pub items: Vec<String>,
    pub page: PageState,
    pub surface: Surface,
    pub ui: UiState,
    /// None when navigation could not be wired (no items).
    pub navigation: Option<NavigationHandle>,
    pub mode_select: ModeSelectHandle,
}

impl App {
    /// Build the page, wire both components and fire page load.
    pub fn new<S>(config: &BrowseConfig, items: Vec<String>, store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let last = items.len().saturating_sub(1);
        let start = config.start.min(last) as i64;
        let page = PageState::starting_at(start);

        let surface = Surface {
            keys: KeyBus::new(),
            prev_button: Trigger::new(),
            next_button: Trigger::new(),
            mode: ModeSelectElements::new(config.modes.clone()),
        };

        let navigation = wire_navigation(config, items.len(), &page, &surface);
        if navigation.is_none() {
            warn!(path = %config.path.display(), "no items to navigate");
        }

        let mode_select = setup_mode_select(&surface.mode, store);
        surface.mode.page_load.dispatch(&PageLoad);

        App {
            source: config.path.clone(),
            items,
            page,
            surface,
            ui: UiState::default(),
            navigation,
            mode_select,
        }
    }

    /// Snapshot of the facts key mapping depends on.
    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            focus: self.ui.focus.target(),
            modal_open: self.surface.mode.dialog.is_open(),
            mode_count: self.surface.mode.radios.len(),
            checked_mode: self.surface.mode.radios.checked_index(),
        }
    }

    /// Item the view should render, if any.
    pub fn shown_item(&self) -> Option<&str> {
        let shown = usize::try_from(self.page.shown.get()).ok()?;
        self.items.get(shown).map(String::as_str)
    }

    /// Label of the checked mode, if any.
    pub fn mode_label(&self) -> Option<String> {
        let radios = &self.surface.mode.radios;
        let index = radios.checked_index()?;
        radios.options().get(index).map(|m| m.label.clone())
    }

    /// Tear down every listener the components registered.
    pub fn teardown(&mut self) {
        if let Some(navigation) = &mut self.navigation {
            navigation.cleanup();
        }
        self.mode_select.cleanup();
    }
}

/// Wire the navigation controller to this page's cells and buttons.
///
/// Keys are gated on the modal being closed, so the modal's own keys
/// never page the list underneath.
fn wire_navigation(
    config: &BrowseConfig,
    item_count: usize,
    page: &PageState,
    surface: &Surface,
) -> Option<NavigationHandle> {
    let total_count = i64::try_from(item_count).unwrap_or(i64::MAX);

    let get = page.clone();
    let set = page.clone();
    let show = page.clone();
    let announce = page.clone();
    let dialog = surface.mode.dialog.clone();

    let options = NavigationOptions::new(
        move || get.index.get(),
        move |i| set.index.set(i),
        move |i| {
            show.shown.set(i);
            *show.status.borrow_mut() = None;
        },
        total_count,
    )
    .on_announce(move |message| {
        *announce.status.borrow_mut() = Some(message.to_string());
    })
    .prev_button(surface.prev_button.clone())
    .next_button(surface.next_button.clone())
    .enable_arrow_keys(config.enable_arrow_keys)
    .enable_enter_key(config.enable_enter_key)
    .should_handle(move || !dialog.is_open());

    setup_navigation(options, &surface.keys)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use crate::storage::MemoryStore;
    use crate::types::{LAST_ITEM_MESSAGE, SELECTED_MODE_KEY};

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item {}", i)).collect()
    }

    fn app(n: usize) -> App {
        App::new(&BrowseConfig::default(), items(n), MemoryStore::new())
    }

    #[test]
    fn app_starts_on_first_item() {
        let app = app(3);
        assert_eq!(app.shown_item(), Some("item 0"));
        assert!(app.navigation.is_some());
        assert_eq!(app.ui, UiState::default());
    }

    #[test]
    fn start_is_clamped_to_last_item() {
        let config = BrowseConfig {
            start: 10,
            ..Default::default()
        };
        let app = App::new(&config, items(3), MemoryStore::new());
        assert_eq!(app.page.index.get(), 2);
        assert_eq!(app.shown_item(), Some("item 2"));
    }

    #[test]
    fn empty_file_degrades_without_navigation() {
        let app = app(0);
        assert!(app.navigation.is_none());
        assert_eq!(app.shown_item(), None);
        assert_eq!(app.surface.keys.listener_count(), 0);
    }

    #[test]
    fn buttons_and_keys_page_through_items() {
        let app = app(3);
        app.surface.next_button.activate();
        assert_eq!(app.shown_item(), Some("item 1"));

        app.surface.keys.release(Key::ArrowRight, FocusTarget::Document);
        assert_eq!(app.shown_item(), Some("item 2"));

        app.surface.prev_button.activate();
        assert_eq!(app.shown_item(), Some("item 1"));
    }

    #[test]
    fn boundary_sets_status_and_next_move_clears_it() {
        let app = app(2);
        app.surface.next_button.activate();
        app.surface.next_button.activate();
        assert_eq!(app.page.status().as_deref(), Some(LAST_ITEM_MESSAGE));

        app.surface.prev_button.activate();
        assert_eq!(app.page.status(), None);
    }

    #[test]
    fn open_modal_blocks_navigation_keys() {
        let app = app(3);
        app.surface.mode.open_button.activate();
        assert!(app.key_context().modal_open);

        assert!(!app.surface.keys.release(Key::ArrowRight, FocusTarget::Document));
        assert_eq!(app.page.index.get(), 0);

        app.surface.mode.close_button.activate();
        assert!(app.surface.keys.release(Key::ArrowRight, FocusTarget::Document));
        assert_eq!(app.page.index.get(), 1);
    }

    #[test]
    fn saved_mode_is_restored_on_load() {
        let store = MemoryStore::new();
        store.set_item(SELECTED_MODE_KEY, "review").unwrap();
        let app = App::new(&BrowseConfig::default(), items(1), store);

        assert_eq!(app.mode_label().as_deref(), Some("Review"));
        assert_eq!(app.key_context().checked_mode, Some(1));
    }

    #[test]
    fn note_focus_targets_text_input() {
        assert_eq!(Focus::Note.target(), FocusTarget::Input);
        assert_eq!(Focus::Pager.target(), FocusTarget::Document);
    }

    #[test]
    fn teardown_removes_all_listeners() {
        let mut app = app(3);
        app.teardown();

        assert_eq!(app.surface.keys.listener_count(), 0);
        assert_eq!(app.surface.next_button.listener_count(), 0);
        assert_eq!(app.surface.mode.open_button.listener_count(), 0);
        assert_eq!(app.surface.mode.page_load.listener_count(), 0);
    }
}
