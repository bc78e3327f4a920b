//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and renders into a plain framebuffer that is flushed to the
//! terminal with diffing.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Control the aspect ratio (2 chars wide per board cell)
//! - Map mouse clicks back to board cells with the same layout math

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
