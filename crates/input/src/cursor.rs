//! Board cursor for keyboard play.

use crate::map::{Command, Direction};
use crate::types::{GameAction, Position};

/// Cursor position, always inside a `rows x cols` board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    rows: u16,
    cols: u16,
}

impl Cursor {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            pos: Position::new(0, 0),
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Jump to `p` (mouse click). Positions outside the board are ignored.
    pub fn set(&mut self, p: Position) {
        if p.row < self.rows && p.col < self.cols {
            self.pos = p;
        }
    }

    pub fn move_by(&mut self, dir: Direction) {
        let Position { row, col } = self.pos;
        self.pos = match dir {
            Direction::Up => Position::new(row.saturating_sub(1), col),
            Direction::Down => Position::new((row + 1).min(self.rows - 1), col),
            Direction::Left => Position::new(row, col.saturating_sub(1)),
            Direction::Right => Position::new(row, (col + 1).min(self.cols - 1)),
        };
    }

    /// Apply a command; cursor moves are absorbed, everything else becomes
    /// an engine action.
    pub fn apply(&mut self, command: Command) -> Option<GameAction> {
        match command {
            Command::Move(dir) => {
                self.move_by(dir);
                None
            }
            Command::Activate => Some(GameAction::Activate(self.pos)),
            Command::Hint => Some(GameAction::Hint),
            Command::Restart => Some(GameAction::Restart),
        }
    }
}
