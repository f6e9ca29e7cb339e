//! Shared types and constants for pagenav.

use std::path::PathBuf;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Announced when a move before the first item is rejected.
pub const FIRST_ITEM_MESSAGE: &str = "처음 항목이므로 이전으로 이동할 수 없습니다.";

/// Announced when a move past the last item is rejected.
pub const LAST_ITEM_MESSAGE: &str = "마지막 항목이므로 다음으로 이동할 수 없습니다.";

/// Storage key holding the selected mode.
pub const SELECTED_MODE_KEY: &str = "selectedMode";

/// Name of the radio group the modal reads the mode from.
pub const MODE_GROUP_NAME: &str = "mode";

// ============================================================================
// MODES
// ============================================================================

/// One choice in the mode select modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOption {
    /// Value persisted when this option is submitted.
    pub value: String,
    /// Text shown next to the radio button.
    pub label: String,
}

impl ModeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        ModeOption {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        ModeOption {
            label: value.clone(),
            value,
        }
    }
}

/// Modes offered when none are configured.
pub fn default_modes() -> Vec<ModeOption> {
    vec![
        ModeOption::new("sequential", "Sequential"),
        ModeOption::new("review", "Review"),
        ModeOption::new("quiz", "Quiz"),
    ]
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// How a text file is cut into navigable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSplit {
    /// Blocks separated by one or more blank lines.
    #[default]
    Paragraphs,
    /// Every non-empty line is an item.
    Lines,
}

/// Configuration for the `browse` command.
#[derive(Debug, Clone)]
pub struct BrowseConfig {
    /// File whose items are paged through.
    pub path: PathBuf,
    /// How the file is split into items.
    pub split: ItemSplit,
    /// Index shown first (clamped to the last item).
    pub start: usize,
    /// Enter moves to the next item.
    pub enable_enter_key: bool,
    /// Left/right arrows move between items.
    pub enable_arrow_keys: bool,
    /// Choices in the mode select modal.
    pub modes: Vec<ModeOption>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            split: ItemSplit::default(),
            start: 0,
            enable_enter_key: false,
            enable_arrow_keys: true,
            modes: default_modes(),
        }
    }
}

/// Split text into items according to `split`.
///
/// Trailing whitespace is trimmed; empty items are dropped.
pub fn split_items(text: &str, split: ItemSplit) -> Vec<String> {
    match split {
        ItemSplit::Lines => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        ItemSplit::Paragraphs => {
            let mut items = Vec::new();
            let mut current: Vec<&str> = Vec::new();
            for line in text.lines() {
                if line.trim().is_empty() {
                    if !current.is_empty() {
                        items.push(current.join("\n"));
                        current.clear();
                    }
                } else {
                    current.push(line.trim_end());
                }
            }
            if !current.is_empty() {
                items.push(current.join("\n"));
            }
            items
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
