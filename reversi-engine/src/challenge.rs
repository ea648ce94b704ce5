use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::board::Board;
use crate::engine::{Engine, Stage};
use crate::error::ReversiError;
use crate::opponent::{RandomOpponent, Strategy};
use crate::score::{Outcome, StoneCounts};
use crate::stone::Stone;

/// Default pause before the opponent answers.
pub const OPPONENT_DELAY: Duration = Duration::from_millis(700);

/// Default pause between a lost game and the success signal.
pub const SUCCESS_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub opponent_delay: Duration,
    pub success_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            opponent_delay: OPPONENT_DELAY,
            success_delay: SUCCESS_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    OpponentMove,
    ChallengeSatisfied,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::OpponentMove => write!(f, "opponent_move"),
            TimerKind::ChallengeSatisfied => write!(f, "challenge_satisfied"),
        }
    }
}

impl std::str::FromStr for TimerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opponent_move" => Ok(TimerKind::OpponentMove),
            "challenge_satisfied" => Ok(TimerKind::ChallengeSatisfied),
            _ => Err(format!("unknown timer kind: {s}")),
        }
    }
}

/// Identity of one scheduled callback. Serials are never reused within a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub kind: TimerKind,
    pub serial: u64,
}

/// Instruction for whoever drives the challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Call [`Challenge::fire`] with `ticket` once `delay_ms` have elapsed.
    Schedule { ticket: Ticket, delay_ms: u64 },
    /// The timer for `ticket` must not fire any more.
    Cancel { ticket: Ticket },
    /// The challenge has been passed; notify the caller.
    Satisfied,
}

impl Effect {
    fn schedule(ticket: Ticket, delay: Duration) -> Self {
        Effect::Schedule {
            ticket,
            delay_ms: delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    YourTurn,
    OpponentThinking,
    OpponentPassed,
    YouPassed,
    SuspectedRobot,
    Human,
    /// Lost again after the success signal already fired.
    Verified,
    Tie,
}

impl Status {
    pub fn message(self, timings: &Timings) -> String {
        match self {
            Status::YourTurn => "Your turn".to_string(),
            Status::OpponentThinking => "Opponent is thinking…".to_string(),
            Status::OpponentPassed => "The opponent passed. Your turn".to_string(),
            Status::YouPassed => "You passed. Opponent is thinking…".to_string(),
            Status::SuspectedRobot => "Suspected robot.".to_string(),
            Status::Human => format!(
                "You are human. Continuing in {} seconds.",
                timings.success_delay.as_secs()
            ),
            Status::Verified => "You are human. Already verified.".to_string(),
            Status::Tie => "It's a tie.".to_string(),
        }
    }
}

/// Everything a view needs to draw the challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderData {
    /// Row-major cells: 1 player, -1 opponent, 0 empty.
    pub board: Vec<i8>,
    pub size: u8,
    pub stage: Stage,
    pub status: Status,
    pub status_text: String,
    pub counts: StoneCounts,
    pub pass_available: bool,
    /// Cells the player may click right now.
    pub legal_moves: Vec<Point>,
    pub outcome: Option<Outcome>,
    pub can_restart: bool,
    pub satisfied: bool,
    pub dismissed: bool,
}

/// The human-verification game: an [`Engine`] plus the timers around it.
///
/// Performs no I/O. Every operation returns the [`Effect`]s its driver must
/// carry out. At most one timer of each [`TimerKind`] is pending, and
/// [`Challenge::fire`] ignores any ticket that is not the pending one, so a
/// timer that outlives a reset can never touch the new game.
#[derive(Debug)]
pub struct Challenge<S = RandomOpponent> {
    engine: Engine,
    strategy: S,
    timings: Timings,
    status: Status,
    next_serial: u64,
    pending_move: Option<Ticket>,
    pending_success: Option<Ticket>,
    satisfied: bool,
    dismissed: bool,
}

impl<S: Strategy> Challenge<S> {
    pub fn new(strategy: S, timings: Timings) -> Self {
        Self::with_engine(Engine::new(), strategy, timings)
    }

    /// Start from an arbitrary position. Call [`Challenge::start`] before use.
    pub fn with_board(board: Board, to_move: Stone, strategy: S, timings: Timings) -> Self {
        Self::with_engine(Engine::with_board(board, to_move), strategy, timings)
    }

    fn with_engine(engine: Engine, strategy: S, timings: Timings) -> Self {
        let status = match engine.stage() {
            Stage::OpponentTurn => Status::OpponentThinking,
            _ => Status::YourTurn,
        };
        Challenge {
            engine,
            strategy,
            timings,
            status,
            next_serial: 0,
            pending_move: None,
            pending_success: None,
            satisfied: false,
            dismissed: false,
        }
    }

    // -- Accessors --

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn stage(&self) -> Stage {
        self.engine.stage()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn pending(&self, kind: TimerKind) -> Option<Ticket> {
        match kind {
            TimerKind::OpponentMove => self.pending_move,
            TimerKind::ChallengeSatisfied => self.pending_success,
        }
    }

    pub fn render(&self) -> RenderData {
        let engine = &self.engine;
        let awaiting_player = !self.dismissed && engine.stage() == Stage::PlayerTurn;
        let outcome = engine.outcome();
        RenderData {
            board: engine.board().cells().to_vec(),
            size: engine.board().size(),
            stage: engine.stage(),
            status: self.status,
            status_text: self.status.message(&self.timings),
            counts: engine.counts(),
            pass_available: awaiting_player && engine.must_pass(),
            legal_moves: if awaiting_player {
                engine.legal_moves(Stone::Player).to_vec()
            } else {
                Vec::new()
            },
            outcome,
            can_restart: outcome.is_some_and(Outcome::offers_restart),
            satisfied: self.satisfied,
            dismissed: self.dismissed,
        }
    }

    // -- Actions --

    /// Evaluate the position on entry. Safe to call more than once.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.dismissed {
            return Vec::new();
        }
        self.settle()
    }

    pub fn place_stone(&mut self, point: Point) -> Result<Vec<Effect>, ReversiError> {
        self.ensure_open()?;
        self.engine.try_play(Stone::Player, point)?;
        self.status = Status::OpponentThinking;
        Ok(self.settle())
    }

    /// Only accepted on the player's turn when no placement exists.
    pub fn pass(&mut self) -> Result<Vec<Effect>, ReversiError> {
        self.ensure_open()?;
        self.engine.try_pass(Stone::Player)?;
        self.status = Status::YouPassed;
        Ok(self.settle())
    }

    /// Run the callback behind `ticket`. Stale or unknown tickets are ignored.
    pub fn fire(&mut self, ticket: Ticket) -> Vec<Effect> {
        if self.dismissed || self.pending(ticket.kind) != Some(ticket) {
            return Vec::new();
        }

        match ticket.kind {
            TimerKind::OpponentMove => {
                self.pending_move = None;
                self.opponent_move()
            }
            TimerKind::ChallengeSatisfied => {
                self.pending_success = None;
                if self.satisfied {
                    return Vec::new();
                }
                self.satisfied = true;
                vec![Effect::Satisfied]
            }
        }
    }

    /// Cancel outstanding timers and start a fresh game. Also reopens a dismissed challenge.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = self.cancel_pending();
        self.engine.reset();
        self.status = Status::YourTurn;
        self.dismissed = false;
        effects.extend(self.settle());
        effects
    }

    /// Close the challenge. Outstanding timers are cancelled and further actions rejected.
    pub fn dismiss(&mut self) -> Vec<Effect> {
        self.dismissed = true;
        self.cancel_pending()
    }

    // -- State machine --

    fn ensure_open(&self) -> Result<(), ReversiError> {
        if self.dismissed {
            Err(ReversiError::Dismissed)
        } else {
            Ok(())
        }
    }

    fn opponent_move(&mut self) -> Vec<Effect> {
        if self.engine.stage() != Stage::OpponentTurn {
            return self.settle();
        }

        let board = self.engine.board().clone();
        if let Some(point) = self.strategy.select(&board, Stone::Opponent)
            && self.engine.try_play(Stone::Opponent, point).is_ok()
        {
            self.status = Status::YourTurn;
        }
        self.settle()
    }

    /// Drive the machine until it waits on the player or a timer.
    fn settle(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        loop {
            match self.engine.stage() {
                Stage::PlayerTurn => break,
                Stage::OpponentTurn if self.engine.must_pass() => {
                    // Not terminal, so the player can answer after this pass.
                    if self.engine.try_pass(Stone::Opponent).is_err() {
                        break;
                    }
                    self.status = Status::OpponentPassed;
                }
                Stage::OpponentTurn => {
                    if self.pending_move.is_none() {
                        let ticket = self.issue(TimerKind::OpponentMove);
                        self.pending_move = Some(ticket);
                        effects.push(Effect::schedule(ticket, self.timings.opponent_delay));
                    }
                    break;
                }
                Stage::GameOver => {
                    effects.extend(self.finish());
                    break;
                }
            }
        }
        effects
    }

    fn finish(&mut self) -> Option<Effect> {
        let outcome = self.engine.outcome()?;
        self.status = match outcome {
            Outcome::PlayerWins => Status::SuspectedRobot,
            Outcome::OpponentWins if self.satisfied => Status::Verified,
            Outcome::OpponentWins => Status::Human,
            Outcome::Tie => Status::Tie,
        };

        if !outcome.satisfies_challenge() || self.satisfied || self.pending_success.is_some() {
            return None;
        }

        let ticket = self.issue(TimerKind::ChallengeSatisfied);
        self.pending_success = Some(ticket);
        Some(Effect::schedule(ticket, self.timings.success_delay))
    }

    fn issue(&mut self, kind: TimerKind) -> Ticket {
        let ticket = Ticket {
            kind,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        ticket
    }

    fn cancel_pending(&mut self) -> Vec<Effect> {
        [self.pending_move.take(), self.pending_success.take()]
            .into_iter()
            .flatten()
            .map(|ticket| Effect::Cancel { ticket })
            .collect()
    }
}
