//! Ships and the fleet registered on a board.

use serde::Serialize;

use crate::coord::Coord;

/// A placed ship: its length and the cells it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ship {
    length: u8,
    cells: Vec<Coord>,
}

impl Ship {
    pub fn new(length: u8, cells: Vec<Coord>) -> Self {
        debug_assert_eq!(length as usize, cells.len());
        Self { length, cells }
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }
}

/// Whether a ship has been sunk, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShipStatus {
    pub length: u8,
    pub sunk: bool,
}

/// Ordered collection of the ships registered on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ship: Ship) {
        self.ships.push(ship);
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// All cells covered by any ship, in registration order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.ships.iter().flat_map(|ship| ship.cells.iter().copied())
    }

    /// Total number of cells covered by the fleet.
    pub fn total_cells(&self) -> usize {
        self.ships.iter().map(|ship| ship.cells.len()).sum()
    }
}
