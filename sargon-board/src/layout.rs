//! Where Sargon II keeps the board and game state in VIC-20 memory.
//!
//! Defaults are for the 8K expanded VIC-20 build of Sargon II.

use serde::Deserialize;
use vice_monitor::{MemoryRange, MonitorError};

use crate::coord::BoardCoordinate;

/// How the two turn bytes say whose move it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSignal {
    /// Human's colour equals colour to move on the human's turn
    #[default]
    Equal,
    /// Human's colour differs from colour to move on the human's turn
    Different,
}

impl TurnSignal {
    pub fn is_human_turn(self, human_color: u8, to_move: u8) -> bool {
        match self {
            TurnSignal::Equal => human_color == to_move,
            TurnSignal::Different => human_color != to_move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenLayout {
    /// Screen memory base address
    pub screen_start: u16,
    /// Characters per screen row
    pub screen_width: u16,
    /// Characters per piece glyph, horizontally
    pub piece_width: u16,
    /// Characters per piece glyph, vertically
    pub piece_height: u16,
    /// Two bytes: human's colour, then colour to move
    pub turn_addr: u16,
    pub move_number_addr: u16,
    pub turn_signal: TurnSignal,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        ScreenLayout {
            screen_start: 0x1e00,
            screen_width: 22,
            piece_width: 2,
            piece_height: 2,
            turn_addr: 0x15,
            move_number_addr: 0x18,
            turn_signal: TurnSignal::Equal,
        }
    }
}

impl ScreenLayout {
    /// Screen address of the top-left character of `coord`'s glyph
    pub fn address_of(&self, coord: BoardCoordinate) -> u16 {
        let row = (coord.rank() as u16)
            .wrapping_mul(self.piece_height)
            .wrapping_mul(self.screen_width);
        let col = (coord.file() as u16).wrapping_mul(self.piece_width);
        self.screen_start.wrapping_add(row).wrapping_add(col)
    }

    /// Screen bytes from the a8 glyph to the h1 glyph
    pub fn board_range(&self) -> Result<MemoryRange, MonitorError> {
        let first = self.address_of(BoardCoordinate::TOP_LEFT);
        let last = self.address_of(BoardCoordinate::BOTTOM_RIGHT);
        MemoryRange::new(first as u32, last as u32)
    }

    pub fn turn_range(&self) -> Result<MemoryRange, MonitorError> {
        let start = self.turn_addr as u32;
        MemoryRange::new(start, start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> BoardCoordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_addresses() {
        let layout = ScreenLayout::default();
        assert_eq!(layout.address_of(at("a8")), 0x1e00);
        assert_eq!(layout.address_of(at("h1")), 0x1e00 + 7 * 2 + 7 * 2 * 22);
        assert_eq!(layout.address_of(at("b8")), 0x1e02);
        assert_eq!(layout.address_of(at("a7")), 0x1e00 + 44);
    }

    #[test]
    fn test_ranges() {
        let layout = ScreenLayout::default();
        let board = layout.board_range().unwrap();
        assert_eq!(board.start(), 0x1e00);
        assert_eq!(board.end(), 0x1e00 + 14 + 308);
        let turn = layout.turn_range().unwrap();
        assert_eq!((turn.start(), turn.end()), (0x15, 0x16));
    }

    #[test]
    fn test_turn_signal() {
        assert!(TurnSignal::Equal.is_human_turn(1, 1));
        assert!(!TurnSignal::Equal.is_human_turn(1, 0));
        assert!(TurnSignal::Different.is_human_turn(1, 0));
    }
}
