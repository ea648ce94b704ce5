use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Board;
use crate::stone::Stone;

/// Stones on the board indexed by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoneCounts {
    pub player: u32,
    pub opponent: u32,
}

impl StoneCounts {
    pub fn of(board: &Board) -> Self {
        StoneCounts {
            player: board.count(Stone::Player),
            opponent: board.count(Stone::Opponent),
        }
    }

    pub fn total(&self) -> u32 {
        self.player + self.opponent
    }

    pub fn outcome(&self) -> Outcome {
        match self.player.cmp(&self.opponent) {
            std::cmp::Ordering::Greater => Outcome::PlayerWins,
            std::cmp::Ordering::Less => Outcome::OpponentWins,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

/// Result of a finished game.
///
/// Losing is what proves the player is human: only [`Outcome::OpponentWins`]
/// satisfies the challenge. A player win is treated as suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PlayerWins,
    OpponentWins,
    Tie,
}

impl Outcome {
    pub fn satisfies_challenge(self) -> bool {
        self == Outcome::OpponentWins
    }

    /// Whether the player is offered another attempt.
    pub fn offers_restart(self) -> bool {
        self == Outcome::PlayerWins
    }

}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::PlayerWins => write!(f, "player_wins"),
            Outcome::OpponentWins => write!(f, "opponent_wins"),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

/// Format a final score as `"P 20 - 16 O"`.
pub fn format_result(counts: StoneCounts) -> String {
    format!("P {} - {} O", counts.player, counts.opponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(player: u32, opponent: u32) -> StoneCounts {
        StoneCounts { player, opponent }
    }

    #[test]
    fn initial_counts() {
        let c = StoneCounts::of(&Board::initial());
        assert_eq!(c, counts(2, 2));
        assert_eq!(c.total(), 4);
    }

    #[test]
    fn outcome_from_counts() {
        assert_eq!(counts(20, 16).outcome(), Outcome::PlayerWins);
        assert_eq!(counts(10, 26).outcome(), Outcome::OpponentWins);
        assert_eq!(counts(18, 18).outcome(), Outcome::Tie);
    }

    #[test]
    fn only_losing_satisfies_the_challenge() {
        assert!(Outcome::OpponentWins.satisfies_challenge());
        assert!(!Outcome::PlayerWins.satisfies_challenge());
        assert!(!Outcome::Tie.satisfies_challenge());
    }

    #[test]
    fn restart_is_offered_after_a_win() {
        assert!(Outcome::PlayerWins.offers_restart());
        assert!(!Outcome::Tie.offers_restart());
        assert!(!Outcome::OpponentWins.offers_restart());
    }

    #[test]
    fn result_formatting() {
        assert_eq!(format_result(counts(20, 16)), "P 20 - 16 O");
        assert_eq!(Outcome::OpponentWins.to_string(), "opponent_wins");
    }
}
