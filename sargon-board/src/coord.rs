//! Board coordinates, top-left origin as drawn on screen (a8 is 0,0).

use crate::square::Color;
use crate::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardCoordinate {
    file: u8,
    rank: u8,
}

impl BoardCoordinate {
    /// a8
    pub const TOP_LEFT: BoardCoordinate = BoardCoordinate { file: 0, rank: 0 };
    /// h1
    pub const BOTTOM_RIGHT: BoardCoordinate = BoardCoordinate { file: 7, rank: 7 };

    /// `file` 0-7 left to right (a-h), `rank` 0-7 top to bottom (8-1)
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(BoardCoordinate { file, rank })
        } else {
            None
        }
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Colour of the board square, fixed by geometry: a8 is white
    pub fn square_color(&self) -> Color {
        if (self.file + self.rank) % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// All 64 squares, row by row from a8 to h1
    pub fn all() -> impl Iterator<Item = BoardCoordinate> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| BoardCoordinate { file, rank }))
    }
}

impl std::str::FromStr for BoardCoordinate {
    type Err = BoardError;

    /// Algebraic notation, case-insensitive file: `a1`..`h8`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(BoardError::InvalidCoordinate(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(BoardError::InvalidCoordinate(s.to_string()));
        }
        Ok(BoardCoordinate {
            file: file - b'a',
            rank: b'8' - rank,
        })
    }
}

impl std::fmt::Display for BoardCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file) as char,
            (b'8' - self.rank) as char
        )
    }
}
