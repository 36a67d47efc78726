use thiserror::Error;

use crate::protocol::RESPONSE_HEADER_LEN;

/// Errors raised while talking to the remote monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    /// I/O error during connect/read/write
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// Peer closed the connection before a full frame arrived
    #[error("connection closed by monitor")]
    ConnectionClosed,

    /// Fewer bytes than a response header
    #[error("malformed response header: {got} bytes, need {}", RESPONSE_HEADER_LEN)]
    MalformedHeader { got: usize },

    /// Wrong API start byte or version; the session cannot continue
    #[error("protocol mismatch: start 0x{magic:02x}, version 0x{version:02x}")]
    ProtocolMismatch { magic: u8, version: u8 },

    /// The monitor reported a non-zero error code
    #[error("monitor error 0x{code:02x}: {message}")]
    DeviceError { code: u8, message: String },

    /// A command reply carried another request's id
    #[error("response for request {got}, expected {expected}")]
    RequestIdMismatch { expected: u32, got: u32 },

    /// Memory range outside 0..=0xFFFF or reversed
    #[error("invalid memory range 0x{start:x}-0x{end:x}")]
    InvalidRange { start: u32, end: u32 },

    /// Memory segment length disagrees with the requested range
    #[error("memory segment length {got}, expected {expected}")]
    SegmentLength { expected: usize, got: usize },

    /// Response body shorter than its content requires
    #[error("response body too short: {got} bytes, need {need}")]
    ShortBody { got: usize, need: usize },

    /// Declared body length over the guardrail
    #[error("response body too large: {0} bytes")]
    BodyTooLarge(u32),

    /// Keyboard feed text does not fit its one byte length
    #[error("key sequence too long: {0} bytes (max 255)")]
    KeysTooLong(usize),
}

impl From<std::io::Error> for MonitorError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            MonitorError::ConnectionClosed
        } else {
            MonitorError::Io(e)
        }
    }
}

impl MonitorError {
    /// Error for a non-zero monitor error code; unknown codes keep the raw value
    pub fn device(code: u8) -> Self {
        let message = match crate::protocol::error_message(code) {
            Some(m) => m.to_string(),
            None => format!("unknown error code 0x{:02x}", code),
        };
        MonitorError::DeviceError { code, message }
    }
}
