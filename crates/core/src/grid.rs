//! Grid module - the match/cascade engine
//!
//! The grid is a `rows x cols` matrix of [`Tile`]s stored as a flat row-major
//! vector. It is the sole authority over tile placement and exposes the whole
//! board rule set:
//!
//! - generation with no pre-existing runs and at least one legal swap
//! - full match detection ([`Grid::all_matches`]) with chain counting
//! - pure swap simulation ([`Grid::matches_after_swap`])
//! - single-step gravity with refill ([`Grid::collapse`])
//! - hint / solvability search ([`Grid::find_potential_match`])
//!
//! Row 0 is the top of the board; tiles fall towards higher row numbers and
//! refills enter through row 0.
//!
//! Coordinates outside the board are a programming error: accessors panic
//! instead of clamping.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use tracing::instrument;

use crate::config::GameConfig;
use crate::rng::KindSource;
use crate::types::{Kind, Position, Tile, TileMove, MATCH_LENGTH};

/// Generation attempts before an unsolvable board is accepted as is.
const MAX_GENERATION_ATTEMPTS: u32 = 1000;

/// Result of one detection pass
///
/// `positions` is deduplicated; `chains` counts independent runs, so an L or T
/// shape contributes two chains while its shared cell is cleared once.
/// `memberships` sums the run lengths and counts a shared cell once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub positions: BTreeSet<Position>,
    pub chains: u32,
    pub memberships: usize,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Outcome of one [`Grid::collapse`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collapse {
    /// Tiles that moved down one row, plus refills entering row 0.
    pub moves: Vec<TileMove>,
    /// Matches found once the board came to rest. The caller clears them.
    pub matches: MatchSet,
    /// The board deadlocked and was replaced by a fresh one.
    pub regenerated: bool,
}

impl Collapse {
    /// Nothing fell and nothing matched: the cascade is over.
    pub fn is_stable(&self) -> bool {
        self.moves.is_empty() && self.matches.is_empty() && !self.regenerated
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells (row * cols + col)
    cells: Vec<Tile>,
    /// Pre-rolled tiles waiting to fall in from above (popped from the back).
    fill_queue: Vec<Tile>,
    fill_in: bool,
    /// Something changed since the last full detection.
    dirty: bool,
    source: KindSource,
}

impl Grid {
    /// Generate a new board for `config` using `seed`.
    ///
    /// With `config.fill_in` the visible board starts empty and the generated
    /// tiles are queued to fall in during the first collapse passes.
    pub fn new(config: &GameConfig, seed: u32) -> Self {
        let rows = config.rows as usize;
        let cols = config.cols as usize;
        let mut grid = Self {
            rows,
            cols,
            cells: vec![Tile::EMPTY; rows * cols],
            fill_queue: Vec::new(),
            fill_in: config.fill_in,
            dirty: false,
            source: KindSource::new(seed, config.kind_count, cols, config.avoid_column_repeats),
        };
        grid.generate();
        grid
    }

    /// Build a board from a fixed layout of kind ids (tests and benches).
    ///
    /// No generation or invariant checks are performed. Refills draw from
    /// `kind_count` kinds seeded with `seed`.
    pub fn from_kinds<R: AsRef<[u8]>>(layout: &[R], kind_count: u8, seed: u32) -> Self {
        let rows = layout.len();
        assert!(rows > 0, "layout must have at least one row");
        let cols = layout[0].as_ref().len();
        assert!(
            layout.iter().all(|r| r.as_ref().len() == cols),
            "layout rows must have equal length"
        );

        let cells = layout
            .iter()
            .flat_map(|r| r.as_ref().iter().map(|&id| Tile::new(Kind(id))))
            .collect();

        Self {
            rows,
            cols,
            cells,
            fill_queue: Vec::new(),
            fill_in: false,
            dirty: true,
            source: KindSource::new(seed, kind_count, cols, false),
        }
    }

    /// Replace the board with a freshly generated one.
    ///
    /// Every cell is drawn so that it does not complete a run with the cells
    /// already placed before it. The whole board is redrawn until at least
    /// one swap produces a match.
    #[instrument(level = "debug", skip(self), fields(rows = self.rows, cols = self.cols))]
    pub fn generate(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            self.cells.fill(Tile::EMPTY);
            for idx in 0..rows * cols {
                let (row, col) = (idx / cols, idx % cols);
                let cells = &self.cells;
                let kind = self
                    .source
                    .pick(|k| completes_run(cells, rows, cols, row, col, k));
                self.cells[idx] = Tile::new(kind);
            }

            if self.find_potential_match().is_some() {
                break;
            }
            if attempts >= MAX_GENERATION_ATTEMPTS {
                tracing::warn!(attempts, "giving up on a solvable board");
                break;
            }
            tracing::debug!(attempts, "generated board has no legal swap, retrying");
        }

        self.source.reset_columns();
        self.dirty = false;
        self.fill_queue.clear();
        if self.fill_in {
            self.fill_queue =
                std::mem::replace(&mut self.cells, vec![Tile::EMPTY; rows * cols]);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn seed(&self) -> u32 {
        self.source.seed()
    }

    /// Draw 32 random bits from the board's generator.
    pub fn next_seed(&mut self) -> u32 {
        self.source.next_u32()
    }

    pub fn contains(&self, p: Position) -> bool {
        (p.row as usize) < self.rows && (p.col as usize) < self.cols
    }

    #[inline]
    fn index(&self, p: Position) -> usize {
        assert!(
            self.contains(p),
            "position ({}, {}) outside {}x{} grid",
            p.row,
            p.col,
            self.rows,
            self.cols
        );
        p.row as usize * self.cols + p.col as usize
    }

    pub fn tile(&self, p: Position) -> &Tile {
        &self.cells[self.index(p)]
    }

    pub fn kind(&self, p: Position) -> Option<Kind> {
        self.tile(p).kind
    }

    /// Row-major view of all cells.
    pub fn tiles(&self) -> &[Tile] {
        &self.cells
    }

    pub fn select(&mut self, p: Position) {
        let i = self.index(p);
        self.cells[i].selected = true;
    }

    pub fn deselect(&mut self, p: Position) {
        let i = self.index(p);
        self.cells[i].selected = false;
    }

    /// True while pre-rolled tiles are still falling in.
    pub fn is_filling(&self) -> bool {
        !self.fill_queue.is_empty()
    }

    /// Tiles still waiting in the fill-in queue.
    pub fn pending_fill(&self) -> usize {
        self.fill_queue.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().any(Tile::is_empty)
    }

    /// Local check used while generating: does the tile at `p` sit in a run
    /// of three with its contiguous neighbours (two cells each way)?
    pub fn is_match(&self, p: Position) -> bool {
        let i = self.index(p);
        match self.cells[i].kind {
            Some(kind) => completes_run(
                &self.cells,
                self.rows,
                self.cols,
                p.row as usize,
                p.col as usize,
                kind,
            ),
            None => false,
        }
    }

    /// Every run of three or more on the board.
    pub fn all_matches(&self) -> MatchSet {
        scan_runs(self.rows, self.cols, |i| self.cells[i].kind)
    }

    /// Matches the board would have with `p1` and `p2` exchanged.
    ///
    /// Pure query: the board is read through a swapped view and never mutated.
    pub fn matches_after_swap(&self, p1: Position, p2: Position) -> MatchSet {
        let (a, b) = (self.index(p1), self.index(p2));
        scan_runs(self.rows, self.cols, |i| {
            let src = if i == a {
                b
            } else if i == b {
                a
            } else {
                i
            };
            self.cells[src].kind
        })
    }

    /// Exchange two tiles for real. Selection marks are dropped.
    pub fn swap(&mut self, p1: Position, p2: Position) {
        let (a, b) = (self.index(p1), self.index(p2));
        self.cells.swap(a, b);
        self.cells[a].selected = false;
        self.cells[b].selected = false;
        self.dirty = true;
    }

    /// Empty the given cells (cleared matches).
    pub fn clear<'a>(&mut self, positions: impl IntoIterator<Item = &'a Position>) {
        for &p in positions {
            let i = self.index(p);
            self.cells[i] = Tile::EMPTY;
        }
        self.dirty = true;
    }

    /// Swap partners worth testing for `p`: right and below only, since a
    /// swap is symmetric.
    fn swap_candidates(&self, p: Position) -> ArrayVec<Position, 2> {
        let mut out = ArrayVec::new();
        if (p.col as usize) + 1 < self.cols {
            out.push(Position::new(p.row, p.col + 1));
        }
        if (p.row as usize) + 1 < self.rows {
            out.push(Position::new(p.row + 1, p.col));
        }
        out
    }

    /// First swap (row-major, right before below) that produces a match.
    pub fn find_potential_match(&self) -> Option<(Position, Position)> {
        for row in 0..self.rows as u16 {
            for col in 0..self.cols as u16 {
                let p = Position::new(row, col);
                for q in self.swap_candidates(p) {
                    if !self.matches_after_swap(p, q).is_empty() {
                        return Some((p, q));
                    }
                }
            }
        }
        None
    }

    /// One incremental gravity step.
    ///
    /// 1. Bottom-up, every empty cell takes the tile directly above it, so
    ///    each column drops by at most one row per call.
    /// 2. Empty top-row cells are refilled from the fill-in queue, or with a
    ///    random kind that does not complete a run where it lands.
    /// 3. When nothing moved and the board changed since the last detection,
    ///    matches are detected once and returned. A resting board without
    ///    matches or legal swaps is regenerated.
    ///
    /// Callers loop until [`Collapse::is_stable`], clearing the returned
    /// matches in between.
    pub fn collapse(&mut self) -> Collapse {
        let (rows, cols) = (self.rows, self.cols);
        let mut moves = Vec::new();

        for row in (1..rows).rev() {
            for col in 0..cols {
                let below = row * cols + col;
                let above = below - cols;
                if self.cells[below].is_empty() {
                    self.cells.swap(below, above);
                    if !self.cells[below].is_empty() {
                        moves.push(TileMove {
                            from: Some(Position::new(row as u16 - 1, col as u16)),
                            to: Position::new(row as u16, col as u16),
                        });
                    }
                }
            }
        }

        for col in (0..cols).rev() {
            if !self.cells[col].is_empty() {
                continue;
            }
            let tile = match self.fill_queue.pop() {
                Some(tile) => tile,
                None => {
                    let cells = &self.cells;
                    let kind = self
                        .source
                        .pick_for_column(col, |k| completes_run(cells, rows, cols, 0, col, k));
                    Tile::new(kind)
                }
            };
            self.cells[col] = tile;
            moves.push(TileMove {
                from: None,
                to: Position::new(0, col as u16),
            });
        }

        if !moves.is_empty() {
            tracing::trace!(moved = moves.len(), "collapse pass");
            self.dirty = true;
            return Collapse {
                moves,
                ..Collapse::default()
            };
        }

        if !self.dirty {
            return Collapse::default();
        }
        self.dirty = false;

        let matches = self.all_matches();
        if matches.is_empty() && self.find_potential_match().is_none() {
            tracing::info!(
                rows = self.rows,
                cols = self.cols,
                "no legal swap left, regenerating board"
            );
            self.generate();
            return Collapse {
                regenerated: true,
                ..Collapse::default()
            };
        }

        Collapse {
            moves,
            matches,
            regenerated: false,
        }
    }
}

/// Would `kind` at (`row`, `col`) sit in a run of [`MATCH_LENGTH`] with its
/// contiguous neighbours? The cell's own content is ignored, so this works
/// for candidates as well as placed tiles.
fn completes_run(
    cells: &[Tile],
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    kind: Kind,
) -> bool {
    let reach = MATCH_LENGTH - 1;
    let count = |dr: isize, dc: isize| -> usize {
        let (mut r, mut c) = (row as isize, col as isize);
        let mut n = 0;
        while n < reach {
            r += dr;
            c += dc;
            if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                break;
            }
            if cells[r as usize * cols + c as usize].kind != Some(kind) {
                break;
            }
            n += 1;
        }
        n
    };

    count(-1, 0) + count(1, 0) >= reach || count(0, -1) + count(0, 1) >= reach
}

/// Collect every maximal run of at least [`MATCH_LENGTH`] equal, non-empty
/// kinds along rows and columns. `kind_at` maps a flat row-major index to the
/// kind stored there.
fn scan_runs(rows: usize, cols: usize, kind_at: impl Fn(usize) -> Option<Kind>) -> MatchSet {
    let mut set = MatchSet::default();

    for row in 0..rows {
        scan_line(cols, |i| kind_at(row * cols + i), &mut set, |i| {
            Position::new(row as u16, i as u16)
        });
    }
    for col in 0..cols {
        scan_line(rows, |i| kind_at(i * cols + col), &mut set, |i| {
            Position::new(i as u16, col as u16)
        });
    }

    set
}

fn scan_line(
    len: usize,
    kind_at: impl Fn(usize) -> Option<Kind>,
    set: &mut MatchSet,
    position: impl Fn(usize) -> Position,
) {
    let mut start = 0;
    while start < len {
        let Some(kind) = kind_at(start) else {
            start += 1;
            continue;
        };
        let mut end = start + 1;
        while end < len && kind_at(end) == Some(kind) {
            end += 1;
        }
        if end - start >= MATCH_LENGTH {
            set.chains += 1;
            set.memberships += end - start;
            set.positions.extend((start..end).map(&position));
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: u16, col: u16) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_completes_run_needs_contiguous_neighbours() {
        let grid = Grid::from_kinds(&[[1, 9, 1, 1], [7, 8, 7, 8], [5, 6, 5, 6]], 5, 1);
        // A gap breaks the run: 1 _ 1 1 does not count for column 1.
        assert!(!completes_run(&grid.cells, 3, 4, 0, 0, Kind(1)));
        // Dropping a 1 into the gap would complete it.
        assert!(completes_run(&grid.cells, 3, 4, 0, 1, Kind(1)));
    }

    #[test]
    fn test_l_shape_counts_two_chains() {
        let grid = Grid::from_kinds(
            &[
                [1, 2, 3, 4],
                [1, 5, 6, 7],
                [1, 1, 1, 8],
                [9, 10, 11, 12],
            ],
            5,
            1,
        );
        let m = grid.all_matches();
        assert_eq!(m.chains, 2);
        assert_eq!(m.len(), 5);
        assert_eq!(m.memberships, 6);
        assert!(m.positions.contains(&p(2, 0)));
    }

    #[test]
    fn test_long_run_is_one_chain() {
        let grid = Grid::from_kinds(&[[3, 3, 3, 3, 3], [0, 1, 0, 1, 0], [1, 0, 1, 0, 1]], 5, 1);
        let m = grid.all_matches();
        assert_eq!(m.chains, 1);
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn test_empty_cells_never_match() {
        let mut grid = Grid::from_kinds(&[[2, 2, 2], [0, 1, 0], [1, 0, 1]], 5, 1);
        grid.clear(&[p(0, 1)]);
        assert!(grid.all_matches().is_empty());
        assert!(!grid.is_match(p(0, 1)));
    }

    #[test]
    fn test_swap_candidates_at_edges() {
        let grid = Grid::from_kinds(&[[0, 1, 2], [1, 2, 0], [2, 0, 1]], 3, 1);
        assert_eq!(grid.swap_candidates(p(0, 0)).as_slice(), &[p(0, 1), p(1, 0)]);
        assert_eq!(grid.swap_candidates(p(0, 2)).as_slice(), &[p(1, 2)]);
        assert_eq!(grid.swap_candidates(p(2, 0)).as_slice(), &[p(2, 1)]);
        assert!(grid.swap_candidates(p(2, 2)).is_empty());
    }

    #[test]
    fn test_swap_and_clear_mark_dirty() {
        let mut grid = Grid::from_kinds(&[[0, 1, 2], [1, 2, 0], [2, 0, 1]], 3, 1);
        grid.dirty = false;
        grid.select(p(0, 0));
        grid.swap(p(0, 0), p(0, 1));
        assert!(grid.is_dirty());
        assert_eq!(grid.kind(p(0, 0)), Some(Kind(1)));
        assert!(!grid.tile(p(0, 1)).selected);

        grid.dirty = false;
        grid.clear(&[p(1, 1)]);
        assert!(grid.is_dirty());
        assert!(grid.tile(p(1, 1)).is_empty());
    }

    #[test]
    fn test_fill_in_reproduces_pre_rolled_board() {
        let config = GameConfig {
            fill_in: true,
            ..GameConfig::default()
        };
        let mut grid = Grid::new(&config, 42);
        assert!(grid.is_filling());
        assert!(grid.tiles().iter().all(Tile::is_empty));

        // The queue is the pre-rolled board in row-major order.
        let expected = grid.fill_queue.clone();

        for _ in 0..grid.rows() {
            let pass = grid.collapse();
            assert_eq!(pass.moves.iter().filter(|m| m.from.is_none()).count(), grid.cols());
        }
        assert!(!grid.is_filling());
        assert_eq!(grid.tiles(), expected.as_slice());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_access_panics() {
        let grid = Grid::from_kinds(&[[0, 1, 2], [1, 2, 0], [2, 0, 1]], 3, 1);
        let _ = grid.tile(p(3, 0));
    }
}
