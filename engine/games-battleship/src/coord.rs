//! Grid coordinates and ship orientations.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::board::BoardError;
use crate::{BOARD_SIZE, NUM_CELLS};

/// A cell on the grid. `x` is the row, `y` the column.
///
/// A `Coord` is always in bounds: the only ways to build one are the checked
/// constructors below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    x: u8,
    y: u8,
}

impl Coord {
    /// Create a coordinate, rejecting anything outside the grid.
    pub fn new(x: usize, y: usize) -> Result<Self, BoardError> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(BoardError::OutOfBounds { x, y })
        }
    }

    /// Coordinate for a row-major cell index.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < NUM_CELLS {
            Some(Self {
                x: (index / BOARD_SIZE) as u8,
                y: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn x(self) -> usize {
        self.x as usize
    }

    #[inline]
    pub fn y(self) -> usize {
        self.y as usize
    }

    /// Row-major index into a flat grid or policy vector.
    #[inline]
    pub fn index(self) -> usize {
        self.x() * BOARD_SIZE + self.y()
    }

    /// Every coordinate on the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..NUM_CELLS).filter_map(Coord::from_index)
    }

    /// The up to four orthogonal neighbours that lie on the grid.
    pub fn orthogonal_neighbors(self) -> impl Iterator<Item = Coord> {
        const DELTAS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        DELTAS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// The up to eight surrounding cells (orthogonal and diagonal).
    pub fn surrounding(self) -> impl Iterator<Item = Coord> {
        const DELTAS: [(isize, isize); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];
        DELTAS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    fn offset(self, dx: isize, dy: isize) -> Option<Coord> {
        let x = self.x().checked_add_signed(dx)?;
        let y = self.y().checked_add_signed(dy)?;
        Coord::new(x, y).ok()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction a ship extends from its origin cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    /// Extends along the row: `(x, y + i)`.
    Horizontal,
    /// Extends down the column: `(x + i, y)`.
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// The `i`-th cell of a ship starting at `(x, y)`, without bounds checks.
    #[inline]
    pub(crate) fn step(self, x: usize, y: usize, i: usize) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (x, y + i),
            Orientation::Vertical => (x + i, y),
        }
    }
}

impl TryFrom<char> for Orientation {
    type Error = BoardError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'H' => Ok(Orientation::Horizontal),
            'V' => Ok(Orientation::Vertical),
            other => Err(BoardError::UnknownOrientation(other)),
        }
    }
}

impl FromStr for Orientation {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Orientation::try_from(c),
            _ => Err(BoardError::UnknownOrientation(
                s.trim().chars().next().unwrap_or(' '),
            )),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "H"),
            Orientation::Vertical => write!(f, "V"),
        }
    }
}
