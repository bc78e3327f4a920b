//! Session configuration.
//!
//! Defaults mirror the reference game (see the constants in
//! [`crate::types`]). Front-ends build a [`GameConfig`] from their own
//! settings layer and call [`GameConfig::validate`] before starting a game.

use thiserror::Error;

use crate::types::{
    CASCADE_STEP_MS, DEFAULT_COLS, DEFAULT_KIND_COUNT, DEFAULT_ROWS, GAME_TIME_MS, HINT_DELAY_MS,
    IDLE_PENALTY_INTERVAL_MS, IDLE_PENALTY_POINTS, MAX_KINDS, MILESTONE_THRESHOLD,
    MIN_BOARD_SIDE, MIN_KINDS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must be at least {min}x{min}, got {rows}x{cols}")]
    BoardTooSmall { rows: u16, cols: u16, min: u16 },
    #[error("kind count must be between {min} and {max}, got {got}")]
    KindCount { got: u8, min: u8, max: u8 },
    #[error("milestone threshold must be positive")]
    ZeroMilestoneThreshold,
    #[error("game time must be positive")]
    ZeroGameTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: u16,
    pub cols: u16,
    pub kind_count: u8,
    pub seed: u32,
    /// Start from an empty board and let the pre-rolled tiles fall in.
    pub fill_in: bool,
    /// Refill colouring memo: avoid repeating the last kind spawned in a column.
    pub avoid_column_repeats: bool,
    pub game_time_ms: u32,
    pub hint_delay_ms: u32,
    pub idle_penalty_interval_ms: u32,
    pub idle_penalty_points: u32,
    pub milestone_threshold: u32,
    /// Delay between collapse passes driven by `tick`; 0 steps every tick.
    pub cascade_step_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            kind_count: DEFAULT_KIND_COUNT,
            seed: 1,
            fill_in: true,
            avoid_column_repeats: true,
            game_time_ms: GAME_TIME_MS,
            hint_delay_ms: HINT_DELAY_MS,
            idle_penalty_interval_ms: IDLE_PENALTY_INTERVAL_MS,
            idle_penalty_points: IDLE_PENALTY_POINTS,
            milestone_threshold: MILESTONE_THRESHOLD,
            cascade_step_ms: CASCADE_STEP_MS,
        }
    }
}

impl GameConfig {
    /// Reference settings with a fully populated board (no fill-in) and the given seed.
    ///
    /// Handy for tests and headless runs.
    pub fn instant(seed: u32) -> Self {
        Self {
            seed,
            fill_in: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_BOARD_SIDE || self.cols < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall {
                rows: self.rows,
                cols: self.cols,
                min: MIN_BOARD_SIDE,
            });
        }
        if !(MIN_KINDS..=MAX_KINDS).contains(&self.kind_count) {
            return Err(ConfigError::KindCount {
                got: self.kind_count,
                min: MIN_KINDS,
                max: MAX_KINDS,
            });
        }
        if self.milestone_threshold == 0 {
            return Err(ConfigError::ZeroMilestoneThreshold);
        }
        if self.game_time_ms == 0 {
            return Err(ConfigError::ZeroGameTime);
        }
        Ok(())
    }
}
