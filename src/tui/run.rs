//! TUI effects boundary: event loop, terminal lifecycle, effect dispatch.
//!
//! This is the only module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui.
//!
//! Architecture: a reader thread forwards crossterm events over an mpsc
//! channel. The loop on the main thread owns every `Rc` handle; for each
//! key it first releases the key on the page-wide key bus, then lets the
//! host map it to an action.

use std::io;
use std::sync::mpsc;
use std::thread;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{debug, info};

use crate::event::Submit;
use crate::storage::KeyValueStore;
use crate::types::{split_items, BrowseConfig};

use super::state::{App, AppEvent, Control, Effect};
use super::update::{map_key, map_mouse, to_nav_key, update};
use super::view::{layout, render};

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// BACKGROUND THREAD
// ============================================================================

/// Spawn a thread that reads crossterm events and forwards them to the channel.
fn spawn_event_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                Ok(_) => continue, // focus, paste
                Err(_) => break,
            };
            if tx.send(forwarded).is_err() {
                break; // receiver dropped, TUI is shutting down
            }
        }
    });
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Load items from the configured file and run the pager until the user quits.
pub fn run<S>(config: &BrowseConfig, store: S) -> io::Result<()>
where
    S: KeyValueStore + 'static,
{
    let text = std::fs::read_to_string(&config.path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", config.path.display(), e)))?;
    let items = split_items(&text, config.split);
    info!(path = %config.path.display(), items = items.len(), "loaded items");

    let mut app = App::new(config, items, store);

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let (tx, rx) = mpsc::channel::<AppEvent>();
    spawn_event_reader(tx);

    let result = event_loop(&mut terminal, &mut app, &rx);

    app.teardown();
    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mpsc::Receiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(app, frame))?;

        if app.ui.should_quit {
            return Ok(());
        }

        // Block on the next event
        let event = match rx.recv() {
            Ok(e) => e,
            Err(_) => return Ok(()), // reader thread gone
        };

        match event {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => {
                let size = terminal.size()?;
                let area = Rect::new(0, 0, size.width, size.height);
                let ctx = app.key_context();
                let areas = layout(area, ctx.modal_open, ctx.mode_count);
                if let Some(action) = map_mouse(mouse, &areas, &ctx) {
                    if let Some(effect) = update(&mut app.ui, &action, &ctx) {
                        handle_effect(effect, app);
                    }
                }
            }
            AppEvent::Resize => {}
        }
    }
}

/// Route one key press: key bus first, then the host's own widgets.
///
/// Terminals report presses, not releases, so a press stands in for the
/// key-up. Release and repeat events are dropped so a key moves once.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    let ctx = app.key_context();
    let handled = app.surface.keys.release(to_nav_key(key.code), ctx.focus);
    if handled {
        debug!(key = ?key.code, "key handled on key bus");
    }

    if let Some(action) = map_key(key, &ctx) {
        if let Some(effect) = update(&mut app.ui, &action, &ctx) {
            handle_effect(effect, app);
        }
    }
}

// ============================================================================
// EFFECT HANDLING
// ============================================================================

/// Run a side effect requested by the pure update function.
pub fn handle_effect(effect: Effect, app: &mut App) {
    let surface = &app.surface;
    match effect {
        Effect::Activate(Control::Prev) => {
            surface.prev_button.activate();
        }
        Effect::Activate(Control::Next) => {
            surface.next_button.activate();
        }
        Effect::Activate(Control::ModeSelect) => {
            surface.mode.open_button.activate();
        }
        Effect::Activate(Control::ModalClose) => {
            surface.mode.close_button.activate();
        }
        Effect::CheckMode(index) => {
            surface.mode.radios.check(index);
        }
        Effect::SubmitMode => {
            surface.mode.form.dispatch(&Submit::new());
        }
        Effect::Quit => {
            app.ui.should_quit = true;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
