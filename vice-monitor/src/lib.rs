//! # VICE Monitor
//!
//! Client side of the VICE remote monitor: the binary protocol used for
//! memory reads and keyboard feed, and the line-oriented text monitor.
//!
//! ## Wire Format
//!
//! All integers are little-endian.
//! ```text
//! request:  [0x02][0x02][body_len:u32][request_id:u32][command:u8][body...]
//! response: [0x02][0x02][body_len:u32][kind:u8][error:u8][request_id:u32][body...]
//! ```
//!
//! A response whose request id is `0xFFFFFFFF` is an event (the emulator
//! stopped, registers changed, ...). Events can arrive before the reply to
//! any command and are drained by the transport.
//!
//! ## Commands
//!
//! | Byte | Name | Body |
//! |------|------|------|
//! | 0x01 | MEMORY_GET | side_effects:u8, start:u16, end:u16, memspace:u8, bank:u16 |
//! | 0x72 | KEYBOARD_FEED | len:u8, text |
//! | 0xAA | EXIT | empty |
//! | 0xBB | QUIT | empty |

pub mod client;
pub mod codec;
mod error;
pub mod protocol;
pub mod text;
pub mod transport;

pub use client::{Monitor, MonitorClient};
pub use codec::{MemoryRange, ResponseHeader};
pub use error::MonitorError;
pub use text::TextMonitor;
pub use transport::{Response, TcpTransport, Transport};

/// Default port of the binary monitor (`-binarymonitor`)
pub const DEFAULT_BINARY_PORT: u16 = 6502;

/// Default port of the text monitor (`-remotemonitor`)
pub const DEFAULT_TEXT_PORT: u16 = 6510;

/// Default host the monitors listen on
pub const DEFAULT_HOST: &str = "127.0.0.1";
