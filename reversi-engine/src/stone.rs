use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use std::ops::Neg;

/// A placed disc. The player is the human side, the opponent is automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Stone {
    Player = 1,
    Opponent = -1,
}

impl Stone {
    pub fn from_int(v: i8) -> Option<Self> {
        match v.signum() {
            1 => Some(Stone::Player),
            -1 => Some(Stone::Opponent),
            _ => None,
        }
    }

    pub fn to_int(self) -> i8 {
        self as i8
    }

    pub fn opp(self) -> Self {
        match self {
            Stone::Player => Stone::Opponent,
            Stone::Opponent => Stone::Player,
        }
    }

    /// Glyph used when drawing the board: filled for the player, hollow for the opponent.
    pub fn symbol(self) -> char {
        match self {
            Stone::Player => '●',
            Stone::Opponent => '○',
        }
    }
}

impl Neg for Stone {
    type Output = Self;

    fn neg(self) -> Self {
        self.opp()
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stone::Player => write!(f, "Player"),
            Stone::Opponent => write!(f, "Opponent"),
        }
    }
}
