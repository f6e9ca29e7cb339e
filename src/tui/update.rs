//! Pure input handling: key events → Actions → (UiState, Effect).
//!
//! Fully testable without a terminal. Navigation itself is not decided
//! here: every key also goes to the page-wide key bus, where the
//! navigation controller makes its own call. This module covers the
//! host's widgets (buttons, note field, mode modal).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::event::Key;

use super::state::{Action, Control, Effect, Focus, KeyContext, UiState};
use super::view::Areas;

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Translate a crossterm key code into the key carried on the key bus.
pub fn to_nav_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

/// Map a crossterm key event to a host Action.
///
/// Returns None for keys the host leaves to the key bus (arrows, enter
/// on the pager) or ignores.
pub fn map_key(key: KeyEvent, ctx: &KeyContext) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if ctx.modal_open {
        return match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ModalUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ModalDown),
            KeyCode::Char(' ') => Some(Action::ModalCheck),
            KeyCode::Enter => Some(Action::ModalSubmit),
            KeyCode::Esc => Some(Action::ModalClose),
            _ => None,
        };
    }

    if ctx.focus.accepts_text() {
        return match key.code {
            KeyCode::Tab | KeyCode::BackTab => Some(Action::ToggleFocus),
            KeyCode::Esc => Some(Action::LeaveNote),
            KeyCode::Backspace => Some(Action::NoteBackspace),
            KeyCode::Char(c) => Some(Action::NoteInput(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('p') => Some(Action::PressPrev),
        KeyCode::Char('n') => Some(Action::PressNext),
        KeyCode::Char('m') => Some(Action::OpenModeSelect),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::ToggleFocus),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Map a left click on an on-screen button to an Action.
pub fn map_mouse(mouse: MouseEvent, areas: &Areas, ctx: &KeyContext) -> Option<Action> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let at = Position::new(mouse.column, mouse.row);

    if ctx.modal_open {
        return areas
            .modal_close
            .filter(|area| area.contains(at))
            .map(|_| Action::ModalClose);
    }

    if areas.prev.contains(at) {
        Some(Action::PressPrev)
    } else if areas.next.contains(at) {
        Some(Action::PressNext)
    } else if areas.mode.contains(at) {
        Some(Action::OpenModeSelect)
    } else if areas.note.contains(at) {
        Some(Action::ToggleFocus)
    } else {
        None
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// Apply an action to host-local state, returning any effect to run.
pub fn update(ui: &mut UiState, action: &Action, ctx: &KeyContext) -> Option<Effect> {
    match action {
        Action::PressPrev => Some(Effect::Activate(Control::Prev)),
        Action::PressNext => Some(Effect::Activate(Control::Next)),
        Action::OpenModeSelect => {
            ui.modal_cursor = ctx.checked_mode.unwrap_or(0);
            Some(Effect::Activate(Control::ModeSelect))
        }
        Action::ToggleFocus => {
            ui.focus = match ui.focus {
                Focus::Pager => Focus::Note,
                Focus::Note => Focus::Pager,
            };
            None
        }
        Action::LeaveNote => {
            ui.focus = Focus::Pager;
            None
        }
        Action::NoteInput(c) => {
            ui.note.push(*c);
            None
        }
        Action::NoteBackspace => {
            ui.note.pop();
            None
        }
        Action::ModalUp => {
            ui.modal_cursor = ui.modal_cursor.saturating_sub(1);
            None
        }
        Action::ModalDown => {
            ui.modal_cursor = if ctx.mode_count == 0 {
                0
            } else {
                (ui.modal_cursor + 1).min(ctx.mode_count - 1)
            };
            None
        }
        Action::ModalCheck => {
            if ui.modal_cursor < ctx.mode_count {
                Some(Effect::CheckMode(ui.modal_cursor))
            } else {
                None
            }
        }
        Action::ModalSubmit => Some(Effect::SubmitMode),
        Action::ModalClose => Some(Effect::Activate(Control::ModalClose)),
        Action::Quit => {
            ui.should_quit = true;
            Some(Effect::Quit)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FocusTarget;
    use ratatui::layout::Rect;

    fn pager() -> KeyContext {
        KeyContext {
            focus: FocusTarget::Document,
            modal_open: false,
            mode_count: 3,
            checked_mode: None,
        }
    }

    fn note() -> KeyContext {
        KeyContext {
            focus: FocusTarget::Input,
            ..pager()
        }
    }

    fn modal() -> KeyContext {
        KeyContext {
            modal_open: true,
            ..pager()
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for ctx in [pager(), note(), modal()] {
            assert_eq!(map_key(key, &ctx), Some(Action::Quit));
        }
    }

    #[test]
    fn arrow_keys_are_left_to_the_key_bus() {
        assert_eq!(map_key(press(KeyCode::Left), &pager()), None);
        assert_eq!(map_key(press(KeyCode::Right), &pager()), None);
        assert_eq!(map_key(press(KeyCode::Enter), &pager()), None);
    }

    #[test]
    fn arrow_codes_translate_to_nav_keys() {
        assert_eq!(to_nav_key(KeyCode::Left), Key::ArrowLeft);
        assert_eq!(to_nav_key(KeyCode::Right), Key::ArrowRight);
        assert_eq!(to_nav_key(KeyCode::Enter), Key::Enter);
        assert_eq!(to_nav_key(KeyCode::Char(' ')), Key::Space);
        assert_eq!(to_nav_key(KeyCode::Char('x')), Key::Char('x'));
        assert_eq!(to_nav_key(KeyCode::F(1)), Key::Other);
    }

    #[test]
    fn accelerators_press_buttons_on_pager() {
        assert_eq!(map_key(press(KeyCode::Char('p')), &pager()), Some(Action::PressPrev));
        assert_eq!(map_key(press(KeyCode::Char('n')), &pager()), Some(Action::PressNext));
        assert_eq!(map_key(press(KeyCode::Char('m')), &pager()), Some(Action::OpenModeSelect));
        assert_eq!(map_key(press(KeyCode::Char('q')), &pager()), Some(Action::Quit));
    }

    #[test]
    fn note_field_takes_letters() {
        assert_eq!(map_key(press(KeyCode::Char('n')), &note()), Some(Action::NoteInput('n')));
        assert_eq!(map_key(press(KeyCode::Char('q')), &note()), Some(Action::NoteInput('q')));
        assert_eq!(map_key(press(KeyCode::Backspace), &note()), Some(Action::NoteBackspace));
        assert_eq!(map_key(press(KeyCode::Esc), &note()), Some(Action::LeaveNote));
        assert_eq!(map_key(press(KeyCode::Left), &note()), None);
    }

    #[test]
    fn modal_keys_drive_the_modal() {
        assert_eq!(map_key(press(KeyCode::Down), &modal()), Some(Action::ModalDown));
        assert_eq!(map_key(press(KeyCode::Up), &modal()), Some(Action::ModalUp));
        assert_eq!(map_key(press(KeyCode::Char(' ')), &modal()), Some(Action::ModalCheck));
        assert_eq!(map_key(press(KeyCode::Enter), &modal()), Some(Action::ModalSubmit));
        assert_eq!(map_key(press(KeyCode::Esc), &modal()), Some(Action::ModalClose));
        assert_eq!(map_key(press(KeyCode::Char('n')), &modal()), None);
    }

    #[test]
    fn tab_toggles_focus() {
        let mut ui = UiState::default();
        assert_eq!(update(&mut ui, &Action::ToggleFocus, &pager()), None);
        assert_eq!(ui.focus, Focus::Note);
        update(&mut ui, &Action::ToggleFocus, &note());
        assert_eq!(ui.focus, Focus::Pager);
    }

    #[test]
    fn note_editing() {
        let mut ui = UiState::default();
        for c in "hi!".chars() {
            update(&mut ui, &Action::NoteInput(c), &note());
        }
        update(&mut ui, &Action::NoteBackspace, &note());
        assert_eq!(ui.note, "hi");
    }

    #[test]
    fn opening_modal_puts_cursor_on_checked_mode() {
        let mut ui = UiState::default();
        let ctx = KeyContext {
            checked_mode: Some(2),
            ..pager()
        };
        assert_eq!(
            update(&mut ui, &Action::OpenModeSelect, &ctx),
            Some(Effect::Activate(Control::ModeSelect))
        );
        assert_eq!(ui.modal_cursor, 2);
    }

    #[test]
    fn modal_cursor_stays_in_range() {
        let mut ui = UiState::default();
        update(&mut ui, &Action::ModalUp, &modal());
        assert_eq!(ui.modal_cursor, 0);

        for _ in 0..5 {
            update(&mut ui, &Action::ModalDown, &modal());
        }
        assert_eq!(ui.modal_cursor, 2);
        assert_eq!(update(&mut ui, &Action::ModalCheck, &modal()), Some(Effect::CheckMode(2)));
    }

    #[test]
    fn modal_check_with_no_modes_is_noop() {
        let mut ui = UiState::default();
        let ctx = KeyContext {
            mode_count: 0,
            ..modal()
        };
        update(&mut ui, &Action::ModalDown, &ctx);
        assert_eq!(ui.modal_cursor, 0);
        assert_eq!(update(&mut ui, &Action::ModalCheck, &ctx), None);
    }

    #[test]
    fn quit_sets_flag() {
        let mut ui = UiState::default();
        assert_eq!(update(&mut ui, &Action::Quit, &pager()), Some(Effect::Quit));
        assert!(ui.should_quit);
    }

    fn areas() -> Areas {
        Areas {
            title: Rect::new(0, 0, 80, 1),
            body: Rect::new(0, 1, 80, 18),
            prev: Rect::new(0, 19, 10, 1),
            next: Rect::new(12, 19, 10, 1),
            mode: Rect::new(24, 19, 10, 1),
            note: Rect::new(0, 20, 80, 1),
            status: Rect::new(0, 21, 80, 1),
            help: Rect::new(0, 22, 80, 1),
            modal: None,
            modal_close: None,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn clicks_on_buttons_press_them() {
        let areas = areas();
        assert_eq!(map_mouse(click(3, 19), &areas, &pager()), Some(Action::PressPrev));
        assert_eq!(map_mouse(click(15, 19), &areas, &pager()), Some(Action::PressNext));
        assert_eq!(map_mouse(click(25, 19), &areas, &pager()), Some(Action::OpenModeSelect));
        assert_eq!(map_mouse(click(40, 5), &areas, &pager()), None);
    }

    #[test]
    fn clicks_under_open_modal_are_ignored() {
        let mut areas = areas();
        areas.modal_close = Some(Rect::new(30, 10, 9, 1));
        assert_eq!(map_mouse(click(3, 19), &areas, &modal()), None);
        assert_eq!(map_mouse(click(31, 10), &areas, &modal()), Some(Action::ModalClose));
    }

    #[test]
    fn non_left_clicks_are_ignored() {
        let mut event = click(3, 19);
        event.kind = MouseEventKind::Up(MouseButton::Left);
        assert_eq!(map_mouse(event, &areas(), &pager()), None);
    }
}
