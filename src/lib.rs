//! TUI Match-3 (workspace facade crate).
//!
//! Re-exports the workspace crates as `tui_match3::{core,input,term,types}`
//! and hosts the binary's I/O helpers: high-score persistence and the JSON
//! lines event log.

pub mod event_log;
pub mod highscore;

pub use tui_match3_core as core;
pub use tui_match3_input as input;
pub use tui_match3_term as term;
pub use tui_match3_types as types;
