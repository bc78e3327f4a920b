//! Scoring module - batch, cascade and milestone rules
//!
//! Every cleared batch earns three things:
//! - a basic score from the number of unique tiles cleared ([`basic_score`])
//! - a cascade bonus from the running chain counter of the turn ([`cascade_bonus`])
//! - a milestone bonus each time the cumulative tile count crosses a multiple
//!   of the milestone threshold ([`milestone_bonus`])
//!
//! The counters live in [`Scoring`], which the controller resets at the start
//! of every committed swap via [`Scoring::begin_turn`].

use crate::types::{
    BASIC_SCORES, CASCADE_SCORES, CASCADE_SCORE_CAP, INITIAL_MILESTONE_STEP,
    MILESTONE_BASE_BONUS, MILESTONE_STEP_BONUS, MILESTONE_THRESHOLD,
};

/// Points for one batch of `unique_tiles` cleared tiles (7+ is capped).
pub fn basic_score(unique_tiles: usize) -> u32 {
    BASIC_SCORES[unique_tiles.min(BASIC_SCORES.len() - 1)]
}

/// Bonus for the running chain counter of the current turn.
pub fn cascade_bonus(counter: u32) -> u32 {
    CASCADE_SCORES
        .get(counter as usize)
        .copied()
        .unwrap_or(CASCADE_SCORE_CAP)
}

/// Bonus for reaching milestone `step` (1-based).
pub fn milestone_bonus(step: u32) -> u32 {
    let extra = step.saturating_sub(INITIAL_MILESTONE_STEP);
    MILESTONE_BASE_BONUS.saturating_add(extra.saturating_mul(MILESTONE_STEP_BONUS))
}

/// Breakdown of the points awarded for one cleared batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    pub basic: u32,
    pub cascade_bonus: u32,
    /// Sum of every milestone bonus awarded by this batch.
    pub milestone_bonus: u32,
    /// Milestone steps reached by this batch, in order (`first..=last`).
    pub milestones_reached: Option<(u32, u32)>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoring {
    score: u32,
    high_score: u32,
    /// High score loaded from persistence at session start.
    seeded_high_score: u32,
    cleared_total: u32,
    milestone_step: u32,
    milestone_threshold: u32,
    counter: u32,
    previous_counter: u32,
    last_chains: u32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self::new(MILESTONE_THRESHOLD)
    }
}

impl Scoring {
    pub fn new(milestone_threshold: u32) -> Self {
        Self {
            score: 0,
            high_score: 0,
            seeded_high_score: 0,
            cleared_total: 0,
            milestone_step: INITIAL_MILESTONE_STEP,
            milestone_threshold: milestone_threshold.max(1),
            counter: 0,
            previous_counter: 0,
            last_chains: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn cleared_total(&self) -> u32 {
        self.cleared_total
    }

    /// Next milestone step to be reached.
    pub fn milestone_step(&self) -> u32 {
        self.milestone_step
    }

    /// Cumulative tile count at which the next milestone is awarded.
    pub fn next_milestone_at(&self) -> u32 {
        self.milestone_step.saturating_mul(self.milestone_threshold)
    }

    /// Running chain counter of the current turn.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Chains in the most recent cleared batch.
    pub fn last_chains(&self) -> u32 {
        self.last_chains
    }

    /// Start a new turn (a committed player swap).
    pub fn begin_turn(&mut self) {
        self.counter = 0;
        self.previous_counter = 0;
    }

    /// Score one cleared batch.
    ///
    /// The cascade bonus is only paid when the counter moved since the last
    /// batch of this turn.
    pub fn record_clear(&mut self, unique_tiles: usize, chains: u32) -> ScoreUpdate {
        if unique_tiles == 0 {
            return ScoreUpdate::default();
        }

        self.counter = self.counter.saturating_add(chains);
        self.last_chains = chains;

        let basic = basic_score(unique_tiles);
        let cascade = if self.counter != self.previous_counter {
            self.previous_counter = self.counter;
            cascade_bonus(self.counter)
        } else {
            0
        };

        self.cleared_total = self.cleared_total.saturating_add(unique_tiles as u32);

        let mut milestone = 0u32;
        let mut reached = None;
        while self.cleared_total >= self.next_milestone_at() {
            let step = self.milestone_step;
            milestone = milestone.saturating_add(milestone_bonus(step));
            reached = Some(match reached {
                Some((first, _)) => (first, step),
                None => (step, step),
            });
            self.milestone_step += 1;
        }

        let total = basic.saturating_add(cascade).saturating_add(milestone);
        self.add(total);

        ScoreUpdate {
            basic,
            cascade_bonus: cascade,
            milestone_bonus: milestone,
            milestones_reached: reached,
            total,
        }
    }

    /// Remove up to `points`, never going below zero. Returns the amount removed.
    pub fn apply_idle_penalty(&mut self, points: u32) -> u32 {
        let removed = points.min(self.score);
        self.score -= removed;
        removed
    }

    /// Seed the high score from persistence.
    pub fn set_high_score(&mut self, high_score: u32) {
        self.seeded_high_score = high_score;
        self.high_score = self.high_score.max(high_score);
    }

    /// This session beat the high score it started with.
    pub fn is_new_high_score(&self) -> bool {
        self.score > self.seeded_high_score
    }

    /// New session; the high score survives.
    pub fn reset(&mut self) {
        let high_score = self.high_score;
        *self = Self::new(self.milestone_threshold);
        self.high_score = high_score;
        self.seeded_high_score = high_score;
    }

    fn add(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }
}
