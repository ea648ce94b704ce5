use std::fmt;

use arrayvec::ArrayVec;

use crate::error::ReversiError;
use crate::score::StoneCounts;
use crate::stone::Stone;
use crate::{BOARD_SIZE, Point};

pub const CELL_COUNT: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

/// Longest straight walk from a cell to the edge.
const MAX_RAY: usize = BOARD_SIZE as usize - 1;

/// Upper bound on stones captured by a single placement.
pub const MAX_FLIPS: usize = 8 * (BOARD_SIZE as usize - 2);

pub type Flips = ArrayVec<Point, MAX_FLIPS>;
pub type Moves = ArrayVec<Point, CELL_COUNT>;

/// The 8 compass offsets as `(d_row, d_col)`.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// The Reversi board stored as a flat row-major array.
///
/// Boards are values: [`Board::play`] returns a new board and leaves the
/// receiver untouched, so earlier positions stay valid as snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [i8; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// Create a board from a matrix (rows x cols of i8 values).
    pub fn new(board: Vec<Vec<i8>>) -> Self {
        assert!(
            board.len() == BOARD_SIZE as usize
                && board.iter().all(|row| row.len() == BOARD_SIZE as usize),
            "malformed board matrix"
        );

        let mut cells = [0i8; CELL_COUNT];
        for (cell, v) in cells.iter_mut().zip(board.into_iter().flatten()) {
            *cell = v.signum();
        }
        Board { cells }
    }

    pub fn empty() -> Self {
        Board {
            cells: [0i8; CELL_COUNT],
        }
    }

    /// The starting position: two stones per side in the centre 2x2 block,
    /// opponent on the main diagonal, player on the anti-diagonal.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        let mid = BOARD_SIZE / 2;
        board.set_stone((mid - 1, mid - 1), Stone::Opponent);
        board.set_stone((mid, mid), Stone::Opponent);
        board.set_stone((mid - 1, mid), Stone::Player);
        board.set_stone((mid, mid - 1), Stone::Player);
        board
    }

    /// Restore a board from its flat representation.
    pub fn from_cells(cells: &[i8]) -> Option<Self> {
        let cells: [i8; CELL_COUNT] = cells.try_into().ok()?;
        Some(Board {
            cells: cells.map(i8::signum),
        })
    }

    // -- Accessors --

    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    pub fn size(&self) -> u8 {
        BOARD_SIZE
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        if self.on_board(point) {
            Stone::from_int(self.cells[Self::idx(point)])
        } else {
            None
        }
    }

    pub fn on_board(&self, (row, col): Point) -> bool {
        row < BOARD_SIZE && col < BOARD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&s| s == 0)
    }

    pub fn count(&self, stone: Stone) -> u32 {
        let v = stone.to_int();
        self.cells.iter().filter(|&&s| s == v).count() as u32
    }

    /// Total stones of either colour.
    pub fn stone_count(&self) -> u32 {
        self.cells.iter().filter(|&&s| s != 0).count() as u32
    }

    pub fn counts(&self) -> StoneCounts {
        StoneCounts::of(self)
    }

    // -- Move generation --

    /// Opposing stones captured if `stone` were placed at `point`.
    ///
    /// Empty when the point is off the board or occupied.
    pub fn flips(&self, point: Point, stone: Stone) -> Flips {
        let mut flips = Flips::new();
        if !self.on_board(point) || self.stone_at(point).is_some() {
            return flips;
        }

        for dir in DIRECTIONS {
            let mut run = ArrayVec::<Point, MAX_RAY>::new();
            let mut cursor = self.step(point, dir);
            while let Some(p) = cursor {
                match self.stone_at(p) {
                    Some(s) if s == stone => {
                        flips.extend(run);
                        break;
                    }
                    Some(_) => {
                        run.push(p);
                        cursor = self.step(p, dir);
                    }
                    None => break,
                }
            }
        }

        flips
    }

    pub fn is_legal_move(&self, point: Point, stone: Stone) -> bool {
        !self.flips(point, stone).is_empty()
    }

    /// Every legal placement for `stone`, in row-major order.
    pub fn legal_moves(&self, stone: Stone) -> Moves {
        Self::points()
            .filter(|&p| self.is_legal_move(p, stone))
            .collect()
    }

    pub fn has_legal_move(&self, stone: Stone) -> bool {
        Self::points().any(|p| self.is_legal_move(p, stone))
    }

    /// Neither side can move.
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_move(Stone::Player) && !self.has_legal_move(Stone::Opponent)
    }

    // -- Game actions --

    /// Place a stone and flip every captured stone. Returns a new Board, or an error.
    pub fn play(&self, point: Point, stone: Stone) -> Result<Board, ReversiError> {
        if !self.on_board(point) {
            return Err(ReversiError::NotOnBoard);
        }

        if self.stone_at(point).is_some() {
            return Err(ReversiError::Overwrite);
        }

        let flips = self.flips(point, stone);
        if flips.is_empty() {
            return Err(ReversiError::NoCaptures);
        }

        let mut board = self.clone();
        board.set_stone(point, stone);
        for &p in &flips {
            board.set_stone(p, stone);
        }

        Ok(board)
    }

    // -- Internal helpers --

    fn points() -> impl Iterator<Item = Point> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
    }

    fn step(&self, (row, col): Point, (dr, dc): (i8, i8)) -> Option<Point> {
        let next = (row.checked_add_signed(dr)?, col.checked_add_signed(dc)?);
        self.on_board(next).then_some(next)
    }

    #[inline]
    fn idx((row, col): Point) -> usize {
        row as usize * BOARD_SIZE as usize + col as usize
    }

    fn set_stone(&mut self, point: Point, stone: Stone) {
        if self.on_board(point) {
            self.cells[Self::idx(point)] = stone.to_int();
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {col}")?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE {
            write!(f, "{row}")?;
            for col in 0..BOARD_SIZE {
                let c = self.stone_at((row, col)).map_or('·', Stone::symbol);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
