//! RNG module - seeded tile kind generation
//!
//! Everything random on the board goes through [`KindSource`], which wraps a
//! small LCG so a seed fully determines a session (generation, refills and
//! deadlock regenerations alike).
//!
//! Draws are "uniform among allowed kinds": callers pass a predicate that
//! rejects kinds which would create an immediate match, and the source picks
//! one of the survivors. This has the same distribution as redrawing until the
//! predicate passes, but it cannot spin forever on a crowded neighbourhood.

use arrayvec::ArrayVec;

use crate::types::{Kind, MAX_KINDS};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate a value in `[0, max)`.
    ///
    /// Uses the high bits (multiply-shift); the low bits of a power-of-two LCG
    /// cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0);
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Kind generator shared by generation and refill.
#[derive(Debug, Clone)]
pub struct KindSource {
    rng: SimpleRng,
    seed: u32,
    kind_count: u8,
    avoid_column_repeats: bool,
    /// Last kind spawned per column (refill colouring memo).
    previous: Vec<Option<Kind>>,
}

impl KindSource {
    pub fn new(seed: u32, kind_count: u8, cols: usize, avoid_column_repeats: bool) -> Self {
        assert!(
            (1..=MAX_KINDS).contains(&kind_count),
            "kind_count must be in 1..={MAX_KINDS}"
        );
        Self {
            rng: SimpleRng::new(seed),
            seed,
            kind_count,
            avoid_column_repeats,
            previous: vec![None; cols],
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Raw 32 bits from the underlying RNG (used to derive restart seeds).
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Draw any kind uniformly.
    pub fn any(&mut self) -> Kind {
        Kind(self.rng.next_range(self.kind_count as u32) as u8)
    }

    /// Draw uniformly among kinds for which `rejected` is false.
    ///
    /// Falls back to an unconstrained draw if every kind is rejected.
    pub fn pick(&mut self, rejected: impl Fn(Kind) -> bool) -> Kind {
        let allowed: ArrayVec<Kind, { MAX_KINDS as usize }> = (0..self.kind_count)
            .map(Kind)
            .filter(|&k| !rejected(k))
            .collect();
        if allowed.is_empty() {
            return self.any();
        }
        allowed[self.rng.next_range(allowed.len() as u32) as usize]
    }

    /// Draw a refill kind for `col`.
    ///
    /// With the column memo enabled, the kind last spawned in this column and
    /// in the column to its right are avoided as well, so fresh tiles rarely
    /// land next to a twin. The memo is dropped before the match constraint
    /// when both cannot be satisfied.
    pub fn pick_for_column(&mut self, col: usize, rejected: impl Fn(Kind) -> bool) -> Kind {
        let kind = if self.avoid_column_repeats {
            let here = self.previous.get(col).copied().flatten();
            let right = self.previous.get(col + 1).copied().flatten();
            let memo_ok = (0..self.kind_count)
                .map(Kind)
                .any(|k| !rejected(k) && Some(k) != here && Some(k) != right);
            if memo_ok {
                self.pick(|k| rejected(k) || Some(k) == here || Some(k) == right)
            } else {
                self.pick(&rejected)
            }
        } else {
            self.pick(&rejected)
        };
        if let Some(slot) = self.previous.get_mut(col) {
            *slot = Some(kind);
        }
        kind
    }

    /// Forget the column memo (new board).
    pub fn reset_columns(&mut self) {
        self.previous.fill(None);
    }
}
