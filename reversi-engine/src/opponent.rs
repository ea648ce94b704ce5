use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::Point;
use crate::board::Board;
use crate::stone::Stone;

/// Move selection for the automated side.
pub trait Strategy {
    /// Pick a legal placement for `stone`, or `None` if it has to pass.
    fn select(&mut self, board: &Board, stone: Stone) -> Option<Point>;

    /// Display name.
    fn name(&self) -> &str;
}

/// Picks uniformly at random among the legal moves.
#[derive(Debug)]
pub struct RandomOpponent {
    rng: StdRng,
}

impl RandomOpponent {
    #[cfg(feature = "thread-rng")]
    pub fn new() -> Self {
        Self::seeded(rand::rng().random())
    }

    /// Reproducible move sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        RandomOpponent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

#[cfg(feature = "thread-rng")]
impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomOpponent {
    fn select(&mut self, board: &Board, stone: Stone) -> Option<Point> {
        let moves = board.legal_moves(stone);
        if moves.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..moves.len());
        Some(moves[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}
