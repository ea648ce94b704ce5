use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Point;
use crate::stone::Stone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Play,
    Pass,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play => write!(f, "play"),
            Move::Pass => write!(f, "pass"),
        }
    }
}

/// A single action applied to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub kind: Move,
    pub stone: Stone,
    pub pos: Option<Point>,
}

impl Turn {
    pub fn play(stone: Stone, point: Point) -> Self {
        Turn {
            kind: Move::Play,
            stone,
            pos: Some(point),
        }
    }

    pub fn pass(stone: Stone) -> Self {
        Turn {
            kind: Move::Pass,
            stone,
            pos: None,
        }
    }

    pub fn is_play(&self) -> bool {
        self.kind == Move::Play
    }

    pub fn is_pass(&self) -> bool {
        self.kind == Move::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_move() {
        let t = Turn::play(Stone::Player, (1, 4));
        assert_eq!(t.kind, Move::Play);
        assert_eq!(t.stone, Stone::Player);
        assert_eq!(t.pos, Some((1, 4)));
        assert!(t.is_play());
        assert!(!t.is_pass());
    }

    #[test]
    fn pass_move() {
        let t = Turn::pass(Stone::Opponent);
        assert_eq!(t.stone, Stone::Opponent);
        assert_eq!(t.pos, None);
        assert!(t.is_pass());
    }

    #[test]
    fn move_kind_displays_like_its_json() {
        for kind in [Move::Play, Move::Pass] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.to_string());
        }
    }

    #[test]
    fn turn_json_shape() {
        let json = serde_json::to_value(Turn::play(Stone::Opponent, (2, 5))).unwrap();
        assert_eq!(json["kind"], "play");
        assert_eq!(json["stone"], -1);
        assert_eq!(json["pos"], serde_json::json!([2, 5]));
    }
}
