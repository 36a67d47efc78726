use thiserror::Error;
use vice_monitor::MonitorError;

use crate::game::GameState;

/// Errors while reading the board out of screen memory
#[derive(Debug, Error)]
pub enum BoardError {
    /// Screen byte that is not the top-left cell of any glyph
    #[error("unknown glyph 0x{code:02x} at {address:#06x}")]
    UnknownGlyph { code: u8, address: u16 },

    #[error("invalid square '{0}', expected a1..h8")]
    InvalidCoordinate(String),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Errors from driving a game
#[derive(Debug, Error)]
pub enum GameError {
    #[error("level {0} out of range, expected 0-6")]
    InvalidLevel(u32),

    #[error("move '{0}' is not in from-to form such as d2-d4")]
    InvalidMoveSyntax(String),

    /// Computer still thinking after every poll
    #[error("computer did not move after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("poll attempts must be at least 1")]
    NoPollAttempts,

    #[error("no game started")]
    NotStarted,

    /// Move submitted while it is not the human's turn
    #[error("cannot move while {0}")]
    OutOfTurn(GameState),

    #[error("game is over")]
    Finished,

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}
