//! TUI module: a terminal host for the navigation controller and the
//! mode select modal.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: the host page (cells, handles, actions, effects)
//! - `update`: pure key/mouse mapping and host transitions
//! - `view`: pure rendering
//! - `run`: effects (terminal, event loop)

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;
