//! TUI color semantics and style constants.
//!
//! Color semantics:
//! - Yellow: boundary announcements
//! - Cyan: interactive elements (buttons, keybinding hints)
//! - Green: the checked mode
//! - Dim: de-emphasized (counters, placeholders)

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// SEMANTIC STYLES
// ============================================================================

/// Boundary announcement (yellow).
pub const STYLE_WARNING: Style = Style::new().fg(Color::Yellow);

/// Interactive element or keybinding hint (cyan).
pub const STYLE_INTERACTIVE: Style = Style::new().fg(Color::Cyan);

/// De-emphasized metadata.
pub const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// UI ELEMENT STYLES
// ============================================================================

/// Title bar / header.
pub const STYLE_TITLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

/// On-screen button.
pub const STYLE_BUTTON: Style = Style::new().fg(Color::Black).bg(Color::Cyan);

/// Widget that holds keyboard focus.
pub const STYLE_FOCUSED: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

/// Cursor row in the modal list.
pub const STYLE_CURSOR: Style = Style::new().add_modifier(Modifier::REVERSED);

/// Radio: checked.
pub const STYLE_CHECKED: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

/// Radio: unchecked.
pub const STYLE_UNCHECKED: Style = Style::new().fg(Color::DarkGray);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================
