//! Board reader: screen memory to squares.

use vice_monitor::{MemoryRange, Monitor};

use crate::coord::BoardCoordinate;
use crate::layout::ScreenLayout;
use crate::square::{lookup, Square};
use crate::BoardError;

/// Decoded 8x8 board, indexed top-left origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Square; 8]; 8],
}

impl Board {
    pub fn get(&self, coord: BoardCoordinate) -> Square {
        self.squares[coord.rank() as usize][coord.file() as usize]
    }

    /// Squares with their coordinates, a8 to h1
    pub fn iter(&self) -> impl Iterator<Item = (BoardCoordinate, Square)> + '_ {
        BoardCoordinate::all().map(move |coord| (coord, self.get(coord)))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (rank, row) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - rank)?;
            for square in row {
                write!(f, " {}", square.symbol())?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardReader {
    layout: ScreenLayout,
}

impl BoardReader {
    pub fn new(layout: ScreenLayout) -> Self {
        BoardReader { layout }
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn address_of(&self, coord: BoardCoordinate) -> u16 {
        self.layout.address_of(coord)
    }

    /// Read the one screen byte at `coord` and decode it
    pub fn square_at<M: Monitor>(
        &self,
        monitor: &mut M,
        coord: BoardCoordinate,
    ) -> Result<Square, BoardError> {
        let address = self.address_of(coord);
        let bytes = monitor.read_memory(MemoryRange::single(address))?;
        let code = bytes.first().copied().ok_or(BoardError::Monitor(
            vice_monitor::MonitorError::ShortBody { got: 0, need: 1 },
        ))?;
        decode(code, address)
    }

    /// Read the whole board with one memory read and decode all 64 cells
    pub fn dump_board<M: Monitor>(&self, monitor: &mut M) -> Result<Board, BoardError> {
        let range = self.layout.board_range()?;
        let screen = monitor.read_memory(range)?;
        self.decode_board(range.start(), &screen)
    }

    /// Decode a board from screen bytes starting at address `base`
    pub fn decode_board(&self, base: u16, screen: &[u8]) -> Result<Board, BoardError> {
        let mut squares = [[Square::Empty(crate::Color::White); 8]; 8];
        for coord in BoardCoordinate::all() {
            let address = self.address_of(coord);
            let offset = address.wrapping_sub(base) as usize;
            let code = *screen.get(offset).ok_or(BoardError::Monitor(
                vice_monitor::MonitorError::ShortBody {
                    got: screen.len(),
                    need: offset + 1,
                },
            ))?;
            squares[coord.rank() as usize][coord.file() as usize] = decode(code, address)?;
        }
        Ok(Board { squares })
    }
}

fn decode(code: u8, address: u16) -> Result<Square, BoardError> {
    lookup(code).ok_or(BoardError::UnknownGlyph { code, address })
}
