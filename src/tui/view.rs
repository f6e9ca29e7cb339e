//! Pure rendering: map App state to ratatui widget trees.
//!
//! `layout()` is shared with the effects layer so mouse clicks can be
//! hit-tested against the same rectangles that were drawn.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::state::{App, Focus};
use super::theme;

const PREV_LABEL: &str = " ◀ Prev ";
const NEXT_LABEL: &str = " Next ▶ ";
const MODE_LABEL: &str = " Mode ";
const CLOSE_LABEL: &str = " Close ";

/// Width of the mode modal, borders included.
const MODAL_WIDTH: u16 = 36;

// ============================================================================
// LAYOUT
// ============================================================================

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub title: Rect,
    pub body: Rect,
    pub prev: Rect,
    pub next: Rect,
    pub mode: Rect,
    pub note: Rect,
    pub status: Rect,
    pub help: Rect,
    /// Modal box, when the dialog is open.
    pub modal: Option<Rect>,
    /// Close button inside the modal.
    pub modal_close: Option<Rect>,
}

fn label_width(label: &str) -> u16 {
    Span::raw(label).width() as u16
}

/// Compute screen regions for a terminal of size `area`.
pub fn layout(area: Rect, modal_open: bool, mode_count: usize) -> Areas {
    let rows = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Min(0),    // item
        Constraint::Length(1), // buttons
        Constraint::Length(1), // note
        Constraint::Length(1), // status
        Constraint::Length(1), // help
    ])
    .split(area);

    let buttons = Layout::horizontal([
        Constraint::Length(label_width(PREV_LABEL)),
        Constraint::Length(1),
        Constraint::Length(label_width(NEXT_LABEL)),
        Constraint::Length(2),
        Constraint::Length(label_width(MODE_LABEL)),
        Constraint::Min(0),
    ])
    .split(rows[2]);

    let (modal, modal_close) = if modal_open {
        let rows = u16::try_from(mode_count).unwrap_or(u16::MAX).saturating_add(5);
        let modal = centered(area, MODAL_WIDTH, rows);
        let close = Rect::new(
            modal.x + 2,
            modal.y + modal.height.saturating_sub(2),
            label_width(CLOSE_LABEL).min(modal.width.saturating_sub(4)),
            1,
        )
        .intersection(modal);
        (Some(modal), Some(close))
    } else {
        (None, None)
    };

    Areas {
        title: rows[0],
        body: rows[1],
        prev: buttons[0],
        next: buttons[2],
        mode: buttons[4],
        note: rows[3],
        status: rows[4],
        help: rows[5],
        modal,
        modal_close,
    }
}

/// A `width` x `height` box centered in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the whole page, modal on top when open.
pub fn render(app: &App, frame: &mut Frame) {
    let ctx = app.key_context();
    let areas = layout(frame.area(), ctx.modal_open, ctx.mode_count);

    frame.render_widget(render_title(app), areas.title);
    render_item(app, frame, areas.body);
    render_buttons(app, frame, &areas);
    frame.render_widget(render_note(app), areas.note);
    frame.render_widget(render_status(app), areas.status);
    frame.render_widget(render_help(app), areas.help);

    if let (Some(modal), Some(close)) = (areas.modal, areas.modal_close) {
        render_modal(app, frame, modal, close);
    }
}

// ============================================================================
// PAGE
// ============================================================================

fn render_title(app: &App) -> Paragraph<'static> {
    let name = app
        .source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| app.source.display().to_string());

    let mut spans = vec![
        Span::styled("pagenav", theme::STYLE_TITLE),
        Span::raw("  "),
        Span::raw(name),
    ];
    if let Some(mode) = app.mode_label() {
        spans.push(Span::styled(format!("  mode: {}", mode), theme::STYLE_DIM));
    }
    Paragraph::new(Line::from(spans))
}

fn render_item(app: &App, frame: &mut Frame, area: Rect) {
    let Some(item) = app.shown_item() else {
        let empty = Paragraph::new(Span::styled("  No items to page through.", theme::STYLE_DIM))
            .block(Block::bordered());
        frame.render_widget(empty, area);
        return;
    };

    let counter = format!(" {}/{} ", app.page.shown.get() + 1, app.items.len());
    let block = Block::bordered().title(Span::styled(counter, theme::STYLE_DIM));
    let paragraph = Paragraph::new(item.to_string())
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_buttons(app: &App, frame: &mut Frame, areas: &Areas) {
    let style = if app.navigation.is_some() {
        theme::STYLE_BUTTON
    } else {
        theme::STYLE_DIM
    };

    frame.render_widget(Paragraph::new(Span::styled(PREV_LABEL, style)), areas.prev);
    frame.render_widget(Paragraph::new(Span::styled(NEXT_LABEL, style)), areas.next);
    frame.render_widget(
        Paragraph::new(Span::styled(MODE_LABEL, theme::STYLE_BUTTON)),
        areas.mode,
    );
}

fn render_note(app: &App) -> Paragraph<'static> {
    let focused = app.ui.focus == Focus::Note;
    let label_style = if focused {
        theme::STYLE_FOCUSED
    } else {
        theme::STYLE_DIM
    };

    let mut spans = vec![Span::styled("Note: ", label_style)];
    if app.ui.note.is_empty() && !focused {
        spans.push(Span::styled("[Tab] to write", theme::STYLE_DIM));
    } else {
        spans.push(Span::raw(app.ui.note.clone()));
    }
    if focused {
        spans.push(Span::styled("█", theme::STYLE_INTERACTIVE));
    }
    Paragraph::new(Line::from(spans))
}

fn render_status(app: &App) -> Paragraph<'static> {
    match app.page.status() {
        Some(message) => Paragraph::new(Span::styled(message, theme::STYLE_WARNING)),
        None => Paragraph::new(""),
    }
}

/// Help line showing available keybindings for the current focus.
fn render_help(app: &App) -> Paragraph<'static> {
    let ctx = app.key_context();
    let help_text = if ctx.modal_open {
        "[j/k] move  [Space] check  [Enter] save  [Esc] close"
    } else if app.ui.focus == Focus::Note {
        "[Tab/Esc] leave note  ^C quit"
    } else {
        "[←/→] page  [p/n] prev/next  [m] mode  [Tab] note  [q] quit"
    };

    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

// ============================================================================
// MODAL
// ============================================================================

fn render_modal(app: &App, frame: &mut Frame, area: Rect, close: Rect) {
    let radios = &app.surface.mode.radios;
    let checked = radios.checked_index();

    let mut lines = vec![Line::from("")];
    for (i, option) in radios.options().iter().enumerate() {
        let radio = if checked == Some(i) {
            Span::styled("(•) ", theme::STYLE_CHECKED)
        } else {
            Span::styled("( ) ", theme::STYLE_UNCHECKED)
        };
        let line = Line::from(vec![Span::raw(" "), radio, Span::raw(option.label.clone())]);
        lines.push(if i == app.ui.modal_cursor {
            line.style(theme::STYLE_CURSOR)
        } else {
            line
        });
    }

    let block = Block::bordered().title(Span::styled(" Select mode ", theme::STYLE_TITLE));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
    frame.render_widget(
        Paragraph::new(Span::styled(CLOSE_LABEL, theme::STYLE_BUTTON)),
        close,
    );
}

// ============================================================================
// TESTS
// ============================================================================
