//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no behaviour beyond small helpers, so they can
//! be shared by the engine, the terminal view and the event log alike.
//!
//! # Board Dimensions
//!
//! The reference board is 9 rows by 8 columns filled with 5 tile kinds.
//! Rows grow downwards (row 0 is the top, where refills appear).
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `GAME_TIME_MS` | 180000 | Length of one session |
//! | `HURRY_UP_MS` | 10000 | Remaining time that triggers the hurry-up cue |
//! | `HINT_DELAY_MS` | 10000 | Idle time before a hint is shown |
//! | `IDLE_PENALTY_INTERVAL_MS` | 5000 | Idle time between score penalties |
//! | `CASCADE_STEP_MS` | 60 | Delay between two collapse passes |
//!
//! # Scoring Tables
//!
//! | Table | Values |
//! |-------|--------|
//! | `BASIC_SCORES` | 0, 0, 0, 50, 100, 150, 250, 500 (7+ tiles capped) |
//! | `CASCADE_SCORES` | 0, 0, 50, 100, 150, 250, 350, 500, 750 (9+ gives 1000) |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{Kind, Position, Tile, DEFAULT_COLS, DEFAULT_ROWS};
//!
//! let tile = Tile::new(Kind::RED);
//! assert!(tile.matches(&Tile::new(Kind::RED)));
//! assert!(!tile.matches(&Tile::EMPTY));
//!
//! let p = Position::new(2, 3);
//! assert!(p.is_adjacent(Position::new(2, 4)));
//! assert!(!p.is_adjacent(Position::new(3, 4)));
//!
//! assert_eq!(DEFAULT_ROWS, 9);
//! assert_eq!(DEFAULT_COLS, 8);
//! ```

use serde::{Deserialize, Serialize};

/// Board height in rows (9 rows)
pub const DEFAULT_ROWS: u16 = 9;

/// Board width in columns (8 columns)
pub const DEFAULT_COLS: u16 = 8;

/// Number of tile kinds on the reference board (Blue, Green, Red, Yellow, Purple)
pub const DEFAULT_KIND_COUNT: u8 = 5;

/// Fewest kinds a board can be generated with without forced matches.
pub const MIN_KINDS: u8 = 3;

/// Upper bound on kinds (candidate lists are stack allocated).
pub const MAX_KINDS: u8 = 16;

/// Minimum run length that counts as a match.
pub const MATCH_LENGTH: usize = 3;

/// Smallest board side that can hold a run.
pub const MIN_BOARD_SIDE: u16 = MATCH_LENGTH as u16;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Session length (3 minutes)
pub const GAME_TIME_MS: u32 = 180_000;

/// Remaining time at which the hurry-up cue fires
pub const HURRY_UP_MS: u32 = 10_000;

/// Idle time before a hint is shown automatically
pub const HINT_DELAY_MS: u32 = 10_000;

/// Idle time between two idle penalties
pub const IDLE_PENALTY_INTERVAL_MS: u32 = 5_000;

/// Points removed by one idle penalty
pub const IDLE_PENALTY_POINTS: u32 = 10;

/// Delay between two collapse passes while a cascade is running
pub const CASCADE_STEP_MS: u32 = 60;

/// Cleared tiles needed per milestone step
pub const MILESTONE_THRESHOLD: u32 = 100;

/// Milestone step a new session starts on
pub const INITIAL_MILESTONE_STEP: u32 = 1;

/// Bonus for the first milestone
pub const MILESTONE_BASE_BONUS: u32 = 500;

/// Extra bonus added for every milestone after the first
pub const MILESTONE_STEP_BONUS: u32 = 250;

/// Basic score indexed by the number of unique tiles cleared in one batch.
///
/// Batches of 7 or more tiles use the last entry.
pub const BASIC_SCORES: [u32; 8] = [0, 0, 0, 50, 100, 150, 250, 500];

/// Cascade bonus indexed by the running chain counter of the current turn.
pub const CASCADE_SCORES: [u32; 9] = [0, 0, 50, 100, 150, 250, 350, 500, 750];

/// Cascade bonus for a counter of 9 or more
pub const CASCADE_SCORE_CAP: u32 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_board_defaults() {
        assert_eq!(DEFAULT_ROWS, 9);
        assert_eq!(DEFAULT_COLS, 8);
        assert_eq!(DEFAULT_KIND_COUNT, 5);
        assert_eq!(MATCH_LENGTH, 3);
        assert!(MIN_KINDS <= DEFAULT_KIND_COUNT && DEFAULT_KIND_COUNT <= MAX_KINDS);
    }

    #[test]
    fn score_tables_are_non_decreasing() {
        assert!(BASIC_SCORES.windows(2).all(|w| w[0] <= w[1]));
        assert!(CASCADE_SCORES.windows(2).all(|w| w[0] <= w[1]));
        assert!(CASCADE_SCORES[CASCADE_SCORES.len() - 1] <= CASCADE_SCORE_CAP);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in Kind::COLORS {
            assert_eq!(Kind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::from_str("PURPLE"), Some(Kind::PURPLE));
        assert_eq!(Kind::from_str("teal"), None);
        assert_eq!(Kind(42).as_str(), "kind");
    }

    #[test]
    fn selection_does_not_affect_matching() {
        let mut a = Tile::new(Kind::GREEN);
        let b = Tile::new(Kind::GREEN);
        a.selected = true;
        assert!(a.matches(&b));
        assert!(!Tile::EMPTY.matches(&Tile::EMPTY));
    }

    #[test]
    fn adjacency_is_manhattan_one() {
        let p = Position::new(4, 4);
        assert!(p.is_adjacent(Position::new(3, 4)));
        assert!(p.is_adjacent(Position::new(5, 4)));
        assert!(p.is_adjacent(Position::new(4, 3)));
        assert!(p.is_adjacent(Position::new(4, 5)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Position::new(5, 5)));
        assert!(!p.is_adjacent(Position::new(4, 6)));
    }

    #[test]
    fn positions_order_row_major() {
        let mut v = vec![
            Position::new(1, 0),
            Position::new(0, 7),
            Position::new(0, 2),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![Position::new(0, 2), Position::new(0, 7), Position::new(1, 0)]
        );
    }

    #[test]
    fn sound_cue_for_chain_counts() {
        assert_eq!(SoundCue::for_chains(0), None);
        assert_eq!(SoundCue::for_chains(1), Some(SoundCue::OneChain));
        assert_eq!(SoundCue::for_chains(2), Some(SoundCue::TwoChains));
        assert_eq!(SoundCue::for_chains(5), Some(SoundCue::ManyChains));
    }
}

/// Symbolic colour of a tile
///
/// Two tiles of the same kind are interchangeable for matching. The engine
/// draws kinds `0..kind_count`; the first five have colour names:
/// - **0**: Blue
/// - **1**: Green
/// - **2**: Red
/// - **3**: Yellow
/// - **4**: Purple
///
/// Any other id is still a valid kind (fixtures use distinct ids freely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(pub u8);

impl Kind {
    pub const BLUE: Kind = Kind(0);
    pub const GREEN: Kind = Kind(1);
    pub const RED: Kind = Kind(2);
    pub const YELLOW: Kind = Kind(3);
    pub const PURPLE: Kind = Kind(4);

    /// The five named colours, in id order.
    pub const COLORS: [Kind; 5] = [
        Kind::BLUE,
        Kind::GREEN,
        Kind::RED,
        Kind::YELLOW,
        Kind::PURPLE,
    ];

    /// Parse a colour name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::Kind;
    ///
    /// assert_eq!(Kind::from_str("red"), Some(Kind::RED));
    /// assert_eq!(Kind::from_str("Blue"), Some(Kind::BLUE));
    /// assert_eq!(Kind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(Kind::BLUE),
            "green" => Some(Kind::GREEN),
            "red" => Some(Kind::RED),
            "yellow" => Some(Kind::YELLOW),
            "purple" => Some(Kind::PURPLE),
            _ => None,
        }
    }

    /// Lowercase colour name, or `"kind"` for ids without a name.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "blue",
            1 => "green",
            2 => "red",
            3 => "yellow",
            4 => "purple",
            _ => "kind",
        }
    }

    pub fn id(&self) -> u8 {
        self.0
    }
}

/// Content of one board cell
///
/// `kind == None` is the empty cell: a cleared tile waiting for gravity, or a
/// slot the fill-in has not reached yet. `selected` is presentation state only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub kind: Option<Kind>,
    pub selected: bool,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        kind: None,
        selected: false,
    };

    pub fn new(kind: Kind) -> Self {
        Self {
            kind: Some(kind),
            selected: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }

    /// True when both tiles hold the same kind. Empty tiles never match.
    pub fn matches(&self, other: &Tile) -> bool {
        match (self.kind, other.kind) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Board coordinate, row-major ordered
///
/// "Nothing selected" is `Option<Position>::None`; there is no sentinel value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// 4-neighbourhood test (Manhattan distance exactly 1).
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// Player actions accepted by the controller
///
/// Cursor movement is an input-layer concern and never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Click/activate a board cell (select, swap or cancel)
    Activate(Position),
    /// Ask for a hint
    Hint,
    /// Start a new session
    Restart,
}

/// Named sound-effect triggers
///
/// The engine only emits the tag; mapping to audio assets is external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    SwapSucceeded,
    SwapFailed,
    OneChain,
    TwoChains,
    ManyChains,
    MilestoneReached,
    TimesUp,
    Hint,
    HighScore,
    HurryUp,
}

impl SoundCue {
    /// Cue for a cleared batch with `chains` independent runs.
    pub fn for_chains(chains: u32) -> Option<Self> {
        match chains {
            0 => None,
            1 => Some(SoundCue::OneChain),
            2 => Some(SoundCue::TwoChains),
            _ => Some(SoundCue::ManyChains),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::SwapSucceeded => "swap_succeeded",
            SoundCue::SwapFailed => "swap_failed",
            SoundCue::OneChain => "one_chain",
            SoundCue::TwoChains => "two_chains",
            SoundCue::ManyChains => "many_chains",
            SoundCue::MilestoneReached => "milestone_reached",
            SoundCue::TimesUp => "times_up",
            SoundCue::Hint => "hint",
            SoundCue::HighScore => "high_score",
            SoundCue::HurryUp => "hurry_up",
        }
    }
}

/// One tile moving during a collapse pass.
///
/// `from == None` means the tile entered the board from above (refill).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMove {
    pub from: Option<Position>,
    pub to: Position,
}

/// Presentation events emitted by the controller
///
/// The renderer owns how each event becomes an animation; the engine knows
/// nothing about frames or pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Selected {
        at: Position,
    },
    Deselected {
        at: Position,
    },
    SwapAttempted {
        from: Position,
        to: Position,
        accepted: bool,
    },
    TilesCleared {
        positions: Vec<Position>,
        chains: u32,
        points: u32,
    },
    MilestoneReached {
        step: u32,
        bonus: u32,
    },
    TilesMoved {
        moves: Vec<TileMove>,
    },
    BoardRegenerated,
    HintShown {
        first: Position,
        second: Position,
    },
    IdlePenalty {
        points: u32,
    },
    GameOver {
        score: u32,
        new_high_score: bool,
    },
    Sound {
        cue: SoundCue,
    },
}
