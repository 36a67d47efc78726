//! Squares and the screen code table.
//!
//! Sargon II draws every piece as a 2x2 block of custom characters. The
//! top-left character of each block is unique per (piece, style, colour), so
//! one screen byte identifies a square. Bit 7 (reverse video) is set for
//! white pieces; an empty cell uses reverse video for a black square.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Pawn,
}

impl Piece {
    /// Lowercase letter as used in FEN
    pub fn letter(self) -> char {
        match self {
            Piece::Rook => 'r',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Queen => 'q',
            Piece::King => 'k',
            Piece::Pawn => 'p',
        }
    }
}

/// Glyph rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Solid,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err(format!("unknown colour '{}', expected white or black", s)),
        }
    }
}

/// What one board cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    Empty(Color),
    Occupied {
        piece: Piece,
        style: Style,
        color: Color,
    },
}

impl Square {
    pub fn piece(&self) -> Option<Piece> {
        match self {
            Square::Empty(_) => None,
            Square::Occupied { piece, .. } => Some(*piece),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Square::Empty(color) | Square::Occupied { color, .. } => *color,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Square::Empty(_))
    }

    /// Diagram character: uppercase white, lowercase black, `.` empty
    pub fn symbol(&self) -> char {
        match self {
            Square::Empty(_) => '.',
            Square::Occupied {
                piece,
                color: Color::White,
                ..
            } => piece.letter().to_ascii_uppercase(),
            Square::Occupied { piece, .. } => piece.letter(),
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Square::Empty(color) => write!(f, "empty {}", color),
            Square::Occupied {
                piece,
                style,
                color,
            } => write!(f, "{} {:?} ({:?})", color, piece, style),
        }
    }
}

/// Reverse video bit
const REVERSE: u8 = 0x80;

/// Screen code of an empty cell (`@`)
pub const EMPTY_CODE: u8 = 0x00;

/// Screen codes of each piece glyph: top-left, top-right, bottom-left, bottom-right.
///
/// Only the top-left code is unique; queen and king share their bottom row.
pub const GLYPHS: [(Piece, Style, [u8; 4]); 12] = [
    (Piece::Rook, Style::Solid, [0x05, 0x06, 0x07, 0x08]),
    (Piece::Rook, Style::Outline, [0x1f, 0x21, 0x22, 0x23]),
    (Piece::Knight, Style::Solid, [0x09, 0x0a, 0x0b, 0x0c]),
    (Piece::Knight, Style::Outline, [0x24, 0x25, 0x26, 0x27]),
    (Piece::Bishop, Style::Solid, [0x0d, 0x0e, 0x0f, 0x10]),
    (Piece::Bishop, Style::Outline, [0x28, 0x29, 0x2a, 0x2b]),
    (Piece::Queen, Style::Solid, [0x11, 0x12, 0x13, 0x14]),
    (Piece::Queen, Style::Outline, [0x2c, 0x2d, 0x2e, 0x2f]),
    (Piece::King, Style::Solid, [0x15, 0x16, 0x13, 0x14]),
    (Piece::King, Style::Outline, [0x30, 0x31, 0x2e, 0x2f]),
    (Piece::Pawn, Style::Solid, [0x01, 0x02, 0x03, 0x04]),
    (Piece::Pawn, Style::Outline, [0x1b, 0x1c, 0x1d, 0x1e]),
];

/// Number of screen codes that decode to a square
pub const SCREEN_CODE_COUNT: usize = GLYPHS.len() * 2 + 2;

const fn build_screen_codes() -> [Option<Square>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < GLYPHS.len() {
        let (piece, style, cells) = GLYPHS[i];
        let top_left = cells[0];
        table[top_left as usize] = Some(Square::Occupied {
            piece,
            style,
            color: Color::Black,
        });
        table[(top_left | REVERSE) as usize] = Some(Square::Occupied {
            piece,
            style,
            color: Color::White,
        });
        i += 1;
    }
    table[EMPTY_CODE as usize] = Some(Square::Empty(Color::White));
    table[(EMPTY_CODE | REVERSE) as usize] = Some(Square::Empty(Color::Black));
    table
}

/// Top-left screen code to square, `None` for codes no glyph starts with
pub static SCREEN_CODES: [Option<Square>; 256] = build_screen_codes();

pub fn lookup(code: u8) -> Option<Square> {
    SCREEN_CODES[code as usize]
}

/// Screen code whose glyph shows `square`
pub fn screen_code_of(square: Square) -> u8 {
    match square {
        Square::Empty(Color::White) => EMPTY_CODE,
        Square::Empty(Color::Black) => EMPTY_CODE | REVERSE,
        Square::Occupied {
            piece,
            style,
            color,
        } => {
            let top_left = GLYPHS
                .iter()
                .find(|(p, s, _)| *p == piece && *s == style)
                .map(|(_, _, cells)| cells[0])
                .unwrap_or(EMPTY_CODE);
            match color {
                Color::Black => top_left,
                Color::White => top_left | REVERSE,
            }
        }
    }
}
