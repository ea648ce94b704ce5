use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::board::{Board, Moves};
use crate::error::ReversiError;
use crate::score::{Outcome, StoneCounts};
use crate::stone::Stone;
use crate::turn::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PlayerTurn,
    OpponentTurn,
    GameOver,
}

impl Stage {
    pub fn for_stone(stone: Stone) -> Self {
        match stone {
            Stone::Player => Stage::PlayerTurn,
            Stone::Opponent => Stage::OpponentTurn,
        }
    }

    /// The side expected to act, if the game is still running.
    pub fn stone(&self) -> Option<Stone> {
        match self {
            Stage::PlayerTurn => Some(Stone::Player),
            Stage::OpponentTurn => Some(Stone::Opponent),
            Stage::GameOver => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PlayerTurn => write!(f, "player_turn"),
            Stage::OpponentTurn => write!(f, "opponent_turn"),
            Stage::GameOver => write!(f, "game_over"),
        }
    }
}

/// Board plus turn state machine.
///
/// The stage is re-evaluated after every applied turn: once neither side can
/// move the game is over, otherwise the turn passes to the other side even if
/// that side has no legal move (it must then pass explicitly).
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    stage: Stage,
    moves: Vec<Turn>,
    /// Board before each entry in `moves`.
    history: Vec<Board>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_board(Board::initial(), Stone::Player)
    }

    /// Start from an arbitrary position with `to_move` on turn.
    pub fn with_board(board: Board, to_move: Stone) -> Self {
        let stage = Self::stage_for(&board, to_move);
        Engine {
            board,
            stage,
            moves: Vec::new(),
            history: Vec::new(),
        }
    }

    fn stage_for(board: &Board, to_move: Stone) -> Stage {
        if board.is_terminal() {
            Stage::GameOver
        } else {
            Stage::for_stone(to_move)
        }
    }

    // -- Accessors --

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn moves(&self) -> &[Turn] {
        &self.moves
    }

    pub fn history(&self) -> &[Board] {
        &self.history
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        self.board.stone_at(point)
    }

    pub fn counts(&self) -> StoneCounts {
        self.board.counts()
    }

    pub fn current_turn_stone(&self) -> Option<Stone> {
        self.stage.stone()
    }

    pub fn legal_moves(&self, stone: Stone) -> Moves {
        self.board.legal_moves(stone)
    }

    pub fn is_legal(&self, point: Point, stone: Stone) -> bool {
        self.board.is_legal_move(point, stone)
    }

    /// The side on turn has no legal move and has to pass.
    pub fn must_pass(&self) -> bool {
        self.stage
            .stone()
            .is_some_and(|stone| !self.board.has_legal_move(stone))
    }

    /// Recomputed from the board; only available once the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        (self.stage == Stage::GameOver).then(|| self.board.counts().outcome())
    }

    // -- Game actions --

    pub fn try_play(&mut self, stone: Stone, point: Point) -> Result<Stage, ReversiError> {
        self.check_turn(stone)?;

        let board = self.board.play(point, stone)?;
        self.advance(board, Turn::play(stone, point));
        Ok(self.stage)
    }

    pub fn try_pass(&mut self, stone: Stone) -> Result<Stage, ReversiError> {
        self.check_turn(stone)?;

        if self.board.has_legal_move(stone) {
            return Err(ReversiError::PassNotAllowed);
        }

        let board = self.board.clone();
        self.advance(board, Turn::pass(stone));
        Ok(self.stage)
    }

    /// Back to the starting position with the player on turn.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn check_turn(&self, stone: Stone) -> Result<(), ReversiError> {
        match self.stage.stone() {
            None => Err(ReversiError::GameOver),
            Some(s) if s == stone => Ok(()),
            Some(_) => Err(ReversiError::OutOfTurn),
        }
    }

    fn advance(&mut self, board: Board, turn: Turn) {
        let next = turn.stone.opp();
        let previous = std::mem::replace(&mut self.board, board);
        self.history.push(previous);
        self.moves.push(turn);
        self.stage = Self::stage_for(&self.board, next);
    }
}
