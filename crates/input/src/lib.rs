//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into [`Command`]s and keeps the board
//! [`Cursor`]. Cursor movement stays in this crate; only board activations,
//! hints and restarts reach the engine as [`crate::types::GameAction`]s.

pub mod cursor;
pub mod map;

pub use tui_match3_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, left_click, should_quit, Command, Direction};
