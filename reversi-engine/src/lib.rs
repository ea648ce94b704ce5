pub mod board;
pub mod challenge;
pub mod engine;
pub mod error;
pub mod opponent;
pub mod score;
pub mod stone;
pub mod turn;

/// A `(row, col)` coordinate on the board.
pub type Point = (u8, u8);

/// Side length of the square board.
pub const BOARD_SIZE: u8 = 6;

pub use board::Board;
pub use challenge::{Challenge, Effect, RenderData, Status, Ticket, TimerKind, Timings};
pub use engine::{Engine, Stage};
pub use error::ReversiError;
pub use opponent::{RandomOpponent, Strategy};
pub use score::{Outcome, StoneCounts};
pub use stone::Stone;
pub use turn::{Move, Turn};
