//! pagenav: keyboard and button paging navigation with a persisted mode selector.

pub mod event;
pub mod mode;
pub mod navigation;
pub mod storage;
pub mod tui;
pub mod types;
