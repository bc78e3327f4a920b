use crate::types::{Position, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimersSnapshot {
    pub time_left_ms: u32,
    pub idle_ms: u32,
    pub cascade_ms: u32,
}

/// Read-only view of a session for presentation
///
/// `tiles` is row-major (`row * cols + col`) and reused across frames by
/// [`crate::GameState::snapshot_into`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub rows: u16,
    pub cols: u16,
    pub tiles: Vec<Tile>,
    pub selected: Option<Position>,
    pub hint: Option<(Position, Position)>,
    pub score: u32,
    pub high_score: u32,
    pub cleared_total: u32,
    pub milestone_step: u32,
    pub next_milestone_at: u32,
    pub last_chains: u32,
    pub game_over: bool,
    pub filling: bool,
    pub cascading: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub timers: TimersSnapshot,
}

impl GameSnapshot {
    pub fn tile(&self, p: Position) -> Option<&Tile> {
        if p.row >= self.rows || p.col >= self.cols {
            return None;
        }
        self.tiles
            .get(p.row as usize * self.cols as usize + p.col as usize)
    }

    /// Board accepts player input right now.
    pub fn playable(&self) -> bool {
        !self.game_over && !self.filling && !self.cascading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    #[test]
    fn tile_lookup_is_bounds_checked() {
        let snap = GameSnapshot {
            rows: 1,
            cols: 2,
            tiles: vec![Tile::new(Kind::RED), Tile::EMPTY],
            ..GameSnapshot::default()
        };
        assert_eq!(snap.tile(Position::new(0, 0)), Some(&Tile::new(Kind::RED)));
        assert_eq!(snap.tile(Position::new(0, 2)), None);
        assert_eq!(snap.tile(Position::new(1, 0)), None);
    }

    #[test]
    fn playable_only_when_idle() {
        let mut snap = GameSnapshot::default();
        assert!(snap.playable());
        snap.cascading = true;
        assert!(!snap.playable());
        snap.cascading = false;
        snap.game_over = true;
        assert!(!snap.playable());
    }
}
