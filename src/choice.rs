//! Random decisions shared by the automata.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How one of several candidate cells is picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Product of two uniforms, scaled by `2n`, rounded, reduced mod `n`.
    /// Quadratically favours low indices.
    #[default]
    Biased,
    /// Every candidate equally likely.
    Uniform,
}

impl TieBreak {
    /// Pick an index in `0..n`. `n` must be non-zero.
    pub fn pick_index<R: Rng + ?Sized>(self, rng: &mut R, n: usize) -> usize {
        debug_assert!(n > 0, "cannot pick from an empty candidate list");
        match self {
            TieBreak::Biased => {
                let a: f64 = rng.gen();
                let b: f64 = rng.gen();
                (a * b * 2.0 * n as f64).round() as usize % n
            }
            TieBreak::Uniform => rng.gen_range(0..n),
        }
    }

    /// Pick one candidate, or `None` when there are none.
    pub fn pick<'a, T, R: Rng + ?Sized>(self, rng: &mut R, candidates: &'a [T]) -> Option<&'a T> {
        if candidates.is_empty() {
            return None;
        }
        Some(&candidates[self.pick_index(rng, candidates.len())])
    }
}

/// Bernoulli trial: true with probability `p`.
#[inline]
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}
