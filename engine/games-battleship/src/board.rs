//! Board state: the shot grid plus the fleet placed on it.

use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::coord::{Coord, Orientation};
use crate::fleet::{Fleet, Ship, ShipStatus};
use crate::{BOARD_SIZE, FLEET, NUM_CELLS, OBS_SIZE};

/// Random origins tried for a single ship before the whole fleet is restarted.
const MAX_PLACEMENT_ATTEMPTS: u32 = 1_000;

/// Full fleet restarts before [`BoardState::place_fleet`] gives up.
const MAX_FLEET_RESTARTS: u32 = 100;

/// Errors raised by board operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: usize, y: usize },

    #[error("Cannot place a ship of length {length} at ({x}, {y}) facing {orientation}")]
    InvalidPlacement {
        x: usize,
        y: usize,
        orientation: Orientation,
        length: u8,
    },

    #[error("Unknown orientation '{0}', expected 'H' or 'V'")]
    UnknownOrientation(char),

    #[error("Fleet could not be placed after {0} restarts")]
    FleetDoesNotFit(u32),
}

/// Contents of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Unknown or empty water.
    #[default]
    Sea,
    /// Unshot part of a ship of the given length.
    Ship(u8),
    /// A ship part that has been shot.
    Hit,
    /// Water that has been shot.
    Miss,
}

impl Cell {
    /// Hit and Miss cells can never be fired at again.
    #[inline]
    pub fn is_resolved(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss)
    }

    fn symbol(self, reveal_ships: bool) -> char {
        match self {
            Cell::Sea if reveal_ships => '.',
            Cell::Ship(len) if reveal_ships => char::from_digit(len as u32, 10).unwrap_or('#'),
            Cell::Sea | Cell::Ship(_) => '?',
            Cell::Hit => 'X',
            Cell::Miss => 'O',
        }
    }
}

/// Board state for one side of the game
///
/// Cloning produces a fully independent copy (grid and fleet), which is what
/// every search node relies on to explore a hypothetical future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    cells: [Cell; NUM_CELLS],
    fleet: Fleet,
}

impl BoardState {
    /// Create an empty board with no fleet.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Sea; NUM_CELLS],
            fleet: Fleet::new(),
        }
    }

    #[inline]
    pub fn cell(&self, coord: Coord) -> Cell {
        self.cells[coord.index()]
    }

    /// Checked cell lookup by raw coordinates.
    pub fn get(&self, x: usize, y: usize) -> Result<Cell, BoardError> {
        Coord::new(x, y).map(|coord| self.cell(coord))
    }

    pub fn cells(&self) -> &[Cell; NUM_CELLS] {
        &self.cells
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Randomly place the standard fleet, replacing anything already on the board.
    ///
    /// Each ship samples origins and orientations until a legal spot is found.
    /// A ship that cannot be placed within [`MAX_PLACEMENT_ATTEMPTS`] restarts
    /// the whole fleet, so an unlucky early layout cannot wedge the loop.
    pub fn place_fleet<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        self.place_fleet_with(&FLEET, rng)
    }

    /// Randomly place an arbitrary list of ship lengths.
    pub fn place_fleet_with<R: Rng + ?Sized>(
        &mut self,
        lengths: &[u8],
        rng: &mut R,
    ) -> Result<(), BoardError> {
        'restart: for _ in 0..MAX_FLEET_RESTARTS {
            *self = Self::new();
            for &length in lengths {
                if !self.place_random_ship(length, rng) {
                    continue 'restart;
                }
            }
            return Ok(());
        }
        *self = Self::new();
        Err(BoardError::FleetDoesNotFit(MAX_FLEET_RESTARTS))
    }

    fn place_random_ship<R: Rng + ?Sized>(&mut self, length: u8, rng: &mut R) -> bool {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let x = rng.gen_range(0..BOARD_SIZE);
            let y = rng.gen_range(0..BOARD_SIZE);
            let orientation = if rng.gen_bool(0.5) {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            if self.can_place(x, y, orientation, length) {
                if let Ok(cells) = self.place(x, y, orientation, length) {
                    self.register_ship(Ship::new(length, cells));
                    return true;
                }
            }
        }
        false
    }

    /// Whether a ship fits at `(x, y)`: every covered cell is on the grid and
    /// still Sea, and no covered cell touches a non-Sea cell (8-connected).
    pub fn can_place(&self, x: usize, y: usize, orientation: Orientation, length: u8) -> bool {
        if length == 0 {
            return false;
        }
        (0..length as usize).all(|i| {
            let (cx, cy) = orientation.step(x, y, i);
            match Coord::new(cx, cy) {
                Ok(coord) => {
                    self.cell(coord) == Cell::Sea
                        && coord
                            .surrounding()
                            .all(|neighbor| self.cell(neighbor) == Cell::Sea)
                }
                Err(_) => false,
            }
        })
    }

    /// Mark the cells of a ship and return them.
    ///
    /// Overlap and adjacency are not re-checked here; callers validate with
    /// [`can_place`](Self::can_place) first. Off-grid cells are still rejected
    /// before anything is written.
    pub fn place(
        &mut self,
        x: usize,
        y: usize,
        orientation: Orientation,
        length: u8,
    ) -> Result<Vec<Coord>, BoardError> {
        let cells = (0..length as usize)
            .map(|i| {
                let (cx, cy) = orientation.step(x, y, i);
                Coord::new(cx, cy)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for &coord in &cells {
            self.cells[coord.index()] = Cell::Ship(length);
        }
        Ok(cells)
    }

    /// Add an already placed ship to the fleet.
    pub fn register_ship(&mut self, ship: Ship) {
        self.fleet.push(ship);
    }

    /// Validate, place and register a ship in one step.
    pub fn place_ship(
        &mut self,
        x: usize,
        y: usize,
        orientation: Orientation,
        length: u8,
    ) -> Result<Ship, BoardError> {
        if !self.can_place(x, y, orientation, length) {
            return Err(BoardError::InvalidPlacement {
                x,
                y,
                orientation,
                length,
            });
        }
        let cells = self.place(x, y, orientation, length)?;
        let ship = Ship::new(length, cells);
        self.register_ship(ship.clone());
        Ok(ship)
    }

    /// Fire at `(x, y)`. Returns `true` on a hit.
    ///
    /// Shooting a cell that is already Hit or Miss is a no-op returning `false`.
    pub fn shoot(&mut self, x: usize, y: usize) -> Result<bool, BoardError> {
        Coord::new(x, y).map(|coord| self.shoot_at(coord))
    }

    /// Fire at a coordinate that is known to be on the grid.
    pub fn shoot_at(&mut self, coord: Coord) -> bool {
        let cell = &mut self.cells[coord.index()];
        match *cell {
            Cell::Hit | Cell::Miss => false,
            Cell::Ship(_) => {
                *cell = Cell::Hit;
                true
            }
            Cell::Sea => {
                *cell = Cell::Miss;
                false
            }
        }
    }

    /// True once every registered ship cell has been hit.
    pub fn has_won(&self) -> bool {
        self.fleet.cells().all(|coord| self.cell(coord) == Cell::Hit)
    }

    #[inline]
    pub fn is_legal(&self, coord: Coord) -> bool {
        !self.cell(coord).is_resolved()
    }

    /// Every cell that has not been shot yet, in row-major order.
    pub fn legal_moves(&self) -> Vec<Coord> {
        Coord::all().filter(|&coord| self.is_legal(coord)).collect()
    }

    /// Bit mask of legal cells. Bit `i` corresponds to cell index `i`.
    pub fn legal_mask(&self) -> u64 {
        self.cells
            .iter()
            .enumerate()
            .fold(0u64, |mask, (idx, cell)| {
                if cell.is_resolved() {
                    mask
                } else {
                    mask | (1u64 << idx)
                }
            })
    }

    pub fn num_legal_moves(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_resolved()).count()
    }

    /// Ship cells that have not been hit yet.
    pub fn remaining_ship_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Cell::Ship(_)))
            .count()
    }

    pub fn ship_statuses(&self) -> Vec<ShipStatus> {
        self.fleet
            .ships()
            .iter()
            .map(|ship| ShipStatus {
                length: ship.length(),
                sunk: ship.cells().iter().all(|&c| self.cell(c) == Cell::Hit),
            })
            .collect()
    }

    /// Evaluator input: three stacked planes (hit, miss, unknown), row-major.
    pub fn observation(&self) -> [f32; OBS_SIZE] {
        let mut obs = [0.0; OBS_SIZE];
        for (idx, cell) in self.cells.iter().enumerate() {
            let plane = match cell {
                Cell::Hit => 0,
                Cell::Miss => 1,
                Cell::Sea | Cell::Ship(_) => 2,
            };
            obs[plane * NUM_CELLS + idx] = 1.0;
        }
        obs
    }

    /// Render the grid, optionally hiding everything that has not been shot.
    pub fn render(&self, reveal_ships: bool) -> String {
        let mut out = String::with_capacity((BOARD_SIZE * 3 + 4) * (BOARD_SIZE + 1));
        out.push_str("  ");
        for y in 0..BOARD_SIZE {
            out.push_str(&format!(" {y}"));
        }
        out.push('\n');
        for (x, row) in self.cells.chunks(BOARD_SIZE).enumerate() {
            out.push_str(&format!("{x} "));
            for cell in row {
                out.push(' ');
                out.push(cell.symbol(reveal_ships));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}
