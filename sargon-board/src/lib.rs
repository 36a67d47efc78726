//! Sargon II on a VICE-emulated VIC-20, seen through its screen memory.
//!
//! [`BoardReader`] turns screen bytes into [`Square`]s using the glyph table
//! in [`square`]; [`Game`] drives the start menu, types moves and polls the
//! turn bytes until the computer has replied. Both work against any
//! [`vice_monitor::Monitor`].

pub mod board;
pub mod coord;
mod error;
pub mod game;
pub mod layout;
pub mod square;

#[cfg(test)]
mod fake;

pub use board::{Board, BoardReader};
pub use coord::BoardCoordinate;
pub use error::{BoardError, GameError};
pub use game::{Game, GameState, Move};
pub use layout::{ScreenLayout, TurnSignal};
pub use square::{Color, Piece, Square, Style};
