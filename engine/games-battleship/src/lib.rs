//! Battleship state model for the Salvo search engines
//!
//! This crate owns the board the engines reason over: a fixed 6x6 grid of
//! [`Cell`]s plus the [`Fleet`] that was placed on it. Everything else in the
//! workspace treats a [`BoardState`] as an opaque, cheaply clonable snapshot
//! that can only move forward through [`BoardState::shoot`].
//!
//! # Usage
//!
//! ```rust
//! use games_battleship::{BoardState, Orientation, Ship};
//!
//! let mut board = BoardState::new();
//! let cells = board.place(0, 0, Orientation::Horizontal, 1).unwrap();
//! board.register_ship(Ship::new(1, cells));
//!
//! assert!(!board.has_won());
//! assert!(board.shoot(0, 0).unwrap());
//! assert!(board.has_won());
//! ```
//!
//! # Invariants
//!
//! - Ships never overlap and never touch, not even diagonally.
//! - The `Ship` cells on the grid are exactly the fleet cells that have not
//!   been hit yet.
//! - `Ship -> Hit` and `Sea -> Miss` are the only transitions after placement.

mod board;
mod coord;
mod fleet;

pub use board::{BoardError, BoardState, Cell};
pub use coord::{Coord, Orientation};
pub use fleet::{Fleet, Ship, ShipStatus};

/// Side length of the square grid.
pub const BOARD_SIZE: usize = 6;

/// Number of cells on the grid, and therefore the size of every policy vector.
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Ship lengths placed by [`BoardState::place_fleet`], in placement order.
pub const FLEET: [u8; 5] = [3, 2, 2, 1, 1];

/// Number of observation planes (hit, miss, unknown).
pub const OBS_PLANES: usize = 3;

/// Flat observation size fed to policy/value evaluators.
pub const OBS_SIZE: usize = OBS_PLANES * NUM_CELLS;
