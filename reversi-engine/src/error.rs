use std::fmt;

/// Misuse of the engine contract. A rejected action never changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReversiError {
    OutOfTurn,
    Overwrite,
    NotOnBoard,
    NoCaptures,
    PassNotAllowed,
    GameOver,
    Dismissed,
}

impl fmt::Display for ReversiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReversiError::OutOfTurn => write!(f, "out of turn"),
            ReversiError::Overwrite => write!(f, "overwrite"),
            ReversiError::NotOnBoard => write!(f, "not on board"),
            ReversiError::NoCaptures => write!(f, "move captures nothing"),
            ReversiError::PassNotAllowed => write!(f, "pass not allowed while a move exists"),
            ReversiError::GameOver => write!(f, "game over"),
            ReversiError::Dismissed => write!(f, "challenge dismissed"),
        }
    }
}

impl std::error::Error for ReversiError {}
