//! Game state module - the match/cascade controller
//!
//! [`GameState`] owns the grid, the scoring state, the current selection and
//! the session timers. Player input arrives as [`GameState::activate`] (or
//! [`GameAction`]s), time arrives as [`GameState::tick`], and every call
//! returns the [`GameEvent`]s the presentation layer should animate.
//!
//! One turn runs through:
//!
//! ```text
//! IDLE -> swap requested -> simulate --no match--> revert (grid untouched) -> IDLE
//!                                   \--match--> commit -> clear -> collapse
//! collapse --matches--> clear -> collapse ...
//!          --stable---> IDLE
//! ```

use crate::config::{ConfigError, GameConfig};
use crate::grid::{Grid, MatchSet};
use crate::scoring::{milestone_bonus, Scoring};
use crate::snapshot::{GameSnapshot, TimersSnapshot};
use crate::types::{GameAction, GameEvent, Position, SoundCue, HURRY_UP_MS};
use tracing::instrument;

/// Upper bound on collapse passes for [`GameState::settle`].
const MAX_SETTLE_STEPS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the player.
    Idle,
    /// Collapse passes pending (after a clear, during fill-in or after regeneration).
    Cascading,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    grid: Grid,
    scoring: Scoring,
    phase: Phase,
    selected: Option<Position>,
    hint: Option<(Position, Position)>,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    time_left_ms: u32,
    /// Time since the player last did something.
    idle_ms: u32,
    penalty_ms: u32,
    cascade_ms: u32,
    auto_hint_shown: bool,
    hurry_up_sent: bool,
    game_over: bool,
}

impl GameState {
    /// Start a session with a generated board.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(&config, config.seed);
        Ok(Self::from_grid(config, grid))
    }

    /// Start a session on an existing board (fixtures, replays).
    pub fn from_grid(config: GameConfig, grid: Grid) -> Self {
        let phase = if grid.is_filling() {
            Phase::Cascading
        } else {
            Phase::Idle
        };
        Self {
            scoring: Scoring::new(config.milestone_threshold),
            time_left_ms: config.game_time_ms,
            config,
            grid,
            phase,
            selected: None,
            hint: None,
            episode_id: 0,
            idle_ms: 0,
            penalty_ms: 0,
            cascade_ms: 0,
            auto_hint_shown: false,
            hurry_up_sent: false,
            game_over: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn high_score(&self) -> u32 {
        self.scoring.high_score()
    }

    /// Seed the high score (loaded from persistence by the front-end).
    pub fn set_high_score(&mut self, high_score: u32) {
        self.scoring.set_high_score(high_score);
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Swap currently highlighted as a hint, if any.
    pub fn shown_hint(&self) -> Option<(Position, Position)> {
        self.hint
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn time_left_ms(&self) -> u32 {
        self.time_left_ms
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_filling(&self) -> bool {
        self.grid.is_filling()
    }

    pub fn is_cascading(&self) -> bool {
        self.phase == Phase::Cascading
    }

    /// The board takes clicks right now.
    pub fn accepts_input(&self) -> bool {
        !self.game_over && !self.grid.is_filling() && self.phase == Phase::Idle
    }

    /// Handle a click on `p`.
    ///
    /// Silently ignored while the game is over, the board is filling or a
    /// cascade is running, and for positions outside the board.
    pub fn activate(&mut self, p: Position) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.accepts_input() || !self.grid.contains(p) {
            return events;
        }
        self.note_activity();

        match self.selected.take() {
            None => {
                self.grid.select(p);
                self.selected = Some(p);
                events.push(GameEvent::Selected { at: p });
            }
            Some(first) if first == p => {
                self.grid.deselect(p);
                events.push(GameEvent::Deselected { at: p });
            }
            Some(first) if first.is_adjacent(p) => {
                self.grid.deselect(first);
                let matches = self.grid.matches_after_swap(first, p);
                if matches.is_empty() {
                    tracing::debug!(?first, second = ?p, "swap rejected");
                    events.push(GameEvent::SwapAttempted {
                        from: first,
                        to: p,
                        accepted: false,
                    });
                    events.push(GameEvent::Sound {
                        cue: SoundCue::SwapFailed,
                    });
                } else {
                    tracing::debug!(?first, second = ?p, chains = matches.chains, "swap accepted");
                    self.grid.swap(first, p);
                    self.scoring.begin_turn();
                    events.push(GameEvent::SwapAttempted {
                        from: first,
                        to: p,
                        accepted: true,
                    });
                    events.push(GameEvent::Sound {
                        cue: SoundCue::SwapSucceeded,
                    });
                    self.clear_matches(&matches, &mut events);
                    self.phase = Phase::Cascading;
                    self.cascade_ms = 0;
                }
            }
            Some(first) => {
                self.grid.deselect(first);
                events.push(GameEvent::Deselected { at: first });
            }
        }

        events
    }

    fn clear_matches(&mut self, matches: &MatchSet, events: &mut Vec<GameEvent>) {
        let update = self.scoring.record_clear(matches.len(), matches.chains);
        self.grid.clear(&matches.positions);

        events.push(GameEvent::TilesCleared {
            positions: matches.positions.iter().copied().collect(),
            chains: matches.chains,
            points: update.total,
        });
        if let Some(cue) = SoundCue::for_chains(matches.chains) {
            events.push(GameEvent::Sound { cue });
        }
        if let Some((first, last)) = update.milestones_reached {
            for step in first..=last {
                events.push(GameEvent::MilestoneReached {
                    step,
                    bonus: milestone_bonus(step),
                });
            }
            events.push(GameEvent::Sound {
                cue: SoundCue::MilestoneReached,
            });
        }
    }

    /// Run one collapse pass.
    pub fn step(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let pass = self.grid.collapse();
        let stable = pass.is_stable();

        if !pass.moves.is_empty() {
            events.push(GameEvent::TilesMoved { moves: pass.moves });
        }
        if pass.regenerated {
            events.push(GameEvent::BoardRegenerated);
        }
        if !pass.matches.is_empty() {
            self.clear_matches(&pass.matches, &mut events);
        }

        if stable {
            if self.phase == Phase::Cascading {
                // Cascade time does not count as idle time.
                self.note_activity();
            }
            self.phase = Phase::Idle;
        }

        events
    }

    /// Run collapse passes until the board is at rest.
    pub fn settle(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..MAX_SETTLE_STEPS {
            events.extend(self.step());
            if self.phase == Phase::Idle {
                return events;
            }
        }
        tracing::warn!(steps = MAX_SETTLE_STEPS, "board did not settle");
        events
    }

    /// Highlight the first legal swap.
    pub fn hint(&mut self) -> Vec<GameEvent> {
        if !self.accepts_input() {
            return Vec::new();
        }
        match self.grid.find_potential_match() {
            Some((first, second)) => {
                self.hint = Some((first, second));
                vec![
                    GameEvent::HintShown { first, second },
                    GameEvent::Sound {
                        cue: SoundCue::Hint,
                    },
                ]
            }
            None => Vec::new(),
        }
    }

    /// Advance the session clock by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        self.time_left_ms = self.time_left_ms.saturating_sub(elapsed_ms);
        if self.time_left_ms == 0 {
            self.finish(&mut events);
            return events;
        }
        if !self.hurry_up_sent && self.time_left_ms <= HURRY_UP_MS {
            self.hurry_up_sent = true;
            events.push(GameEvent::Sound {
                cue: SoundCue::HurryUp,
            });
        }

        if self.phase == Phase::Cascading {
            self.cascade_ms = self.cascade_ms.saturating_add(elapsed_ms);
            if self.cascade_ms >= self.config.cascade_step_ms {
                self.cascade_ms = 0;
                events.extend(self.step());
            }
            return events;
        }

        self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
        self.penalty_ms = self.penalty_ms.saturating_add(elapsed_ms);

        if !self.auto_hint_shown && self.idle_ms >= self.config.hint_delay_ms {
            self.auto_hint_shown = true;
            events.extend(self.hint());
        }

        let interval = self.config.idle_penalty_interval_ms;
        if interval > 0 && self.penalty_ms >= interval {
            self.penalty_ms -= interval;
            let removed = self.scoring.apply_idle_penalty(self.config.idle_penalty_points);
            if removed > 0 {
                events.push(GameEvent::IdlePenalty { points: removed });
            }
        }

        events
    }

    /// Time is up: finish any running cascade, then end the session.
    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase == Phase::Cascading {
            events.extend(self.settle());
        }
        if let Some(p) = self.selected.take() {
            self.grid.deselect(p);
        }
        self.hint = None;
        self.game_over = true;

        let new_high_score = self.scoring.is_new_high_score();
        tracing::info!(
            score = self.scoring.score(),
            new_high_score,
            episode = self.episode_id,
            "game over"
        );
        events.push(GameEvent::Sound {
            cue: SoundCue::TimesUp,
        });
        if new_high_score {
            events.push(GameEvent::Sound {
                cue: SoundCue::HighScore,
            });
        }
        events.push(GameEvent::GameOver {
            score: self.scoring.score(),
            new_high_score,
        });
    }

    /// Start a new session on a fresh board. The high score is kept.
    #[instrument(level = "debug", skip(self), fields(episode = self.episode_id))]
    pub fn restart(&mut self) {
        let seed = self.grid.next_seed();
        self.grid = Grid::new(&self.config, seed);
        self.scoring.reset();
        self.phase = if self.grid.is_filling() {
            Phase::Cascading
        } else {
            Phase::Idle
        };
        self.selected = None;
        self.hint = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.time_left_ms = self.config.game_time_ms;
        self.idle_ms = 0;
        self.penalty_ms = 0;
        self.cascade_ms = 0;
        self.auto_hint_shown = false;
        self.hurry_up_sent = false;
        self.game_over = false;
        tracing::info!(episode = self.episode_id, seed, "restarted");
    }

    pub fn apply_action(&mut self, action: GameAction) -> Vec<GameEvent> {
        match action {
            GameAction::Activate(p) => self.activate(p),
            GameAction::Hint => self.hint(),
            GameAction::Restart => {
                self.restart();
                Vec::new()
            }
        }
    }

    fn note_activity(&mut self) {
        self.idle_ms = 0;
        self.penalty_ms = 0;
        self.auto_hint_shown = false;
        self.hint = None;
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.rows = self.grid.rows() as u16;
        out.cols = self.grid.cols() as u16;
        out.tiles.clear();
        out.tiles.extend_from_slice(self.grid.tiles());
        out.selected = self.selected;
        out.hint = self.hint;
        out.score = self.scoring.score();
        out.high_score = self.scoring.high_score();
        out.cleared_total = self.scoring.cleared_total();
        out.milestone_step = self.scoring.milestone_step();
        out.next_milestone_at = self.scoring.next_milestone_at();
        out.last_chains = self.scoring.last_chains();
        out.game_over = self.game_over;
        out.filling = self.grid.is_filling();
        out.cascading = self.phase == Phase::Cascading;
        out.episode_id = self.episode_id;
        out.seed = self.grid.seed();
        out.timers = TimersSnapshot {
            time_left_ms: self.time_left_ms,
            idle_ms: self.idle_ms,
            cascade_ms: self.cascade_ms,
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }
}
