//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules, the session state machine and the
//! scoring. It has **no dependencies** on terminal, audio or file I/O:
//!
//! - **Deterministic**: the same seed produces the same boards and refills
//! - **Testable**: fixture boards can be loaded with [`Grid::from_kinds`]
//! - **Headless**: time only enters through [`GameState::tick`]
//!
//! # Module Structure
//!
//! - [`grid`]: board model, match detection, swap simulation, collapse and hint search
//! - [`game_state`]: the match/cascade controller producing [`types::GameEvent`]s
//! - [`scoring`]: batch, cascade and milestone scoring
//! - [`rng`]: seeded kind source used by generation and refill
//! - [`config`]: session settings and their validation
//! - [`snapshot`]: read-only view for renderers
//!
//! # Game Rules
//!
//! - Swapping two adjacent tiles is only accepted when it forms a run of 3+
//! - Runs are cleared, tiles above fall one row per collapse pass, and new
//!   tiles enter from the top
//! - Cascading matches during one turn raise a chain counter that pays bonuses
//! - A board without legal swaps is regenerated
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{GameConfig, GameState};
//! use tui_match3_types::GameAction;
//!
//! let mut game = GameState::new(GameConfig::instant(12345)).unwrap();
//!
//! // Generated boards always have a legal move
//! let (a, b) = game.grid().find_potential_match().unwrap();
//! game.apply_action(GameAction::Activate(a));
//! let events = game.apply_action(GameAction::Activate(b));
//! assert!(!events.is_empty());
//!
//! // Let the cascade run to completion
//! game.settle();
//! assert!(game.score() >= 50);
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with the
//! elapsed time. It drives the countdown, one collapse pass per
//! `cascade_step_ms`, the idle hint and the idle penalty.

pub mod config;
pub mod game_state;
pub mod grid;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tui_match3_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameConfig};
pub use game_state::GameState;
pub use grid::{Collapse, Grid, MatchSet};
pub use rng::{KindSource, SimpleRng};
pub use scoring::{basic_score, cascade_bonus, milestone_bonus, ScoreUpdate, Scoring};
pub use snapshot::{GameSnapshot, TimersSnapshot};
