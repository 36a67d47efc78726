//! Request encoding and response decoding for the binary monitor.
//!
//! Pure functions only, the transport owns the socket.

use std::io::Read;

use crate::protocol::*;
use crate::MonitorError;

/// Inclusive address range in the main CPU memory space.
///
/// Always satisfies `start <= end <= 0xFFFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    start: u16,
    end: u16,
}

impl MemoryRange {
    pub fn new(start: u32, end: u32) -> Result<Self, MonitorError> {
        if start > end || end > 0xFFFF {
            return Err(MonitorError::InvalidRange { start, end });
        }
        Ok(MemoryRange {
            start: start as u16,
            end: end as u16,
        })
    }

    /// Range covering a single byte
    pub fn single(addr: u16) -> Self {
        MemoryRange {
            start: addr,
            end: addr,
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of bytes in the range (1..=65536)
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:04x}-${:04x}", self.start, self.end)
    }
}

/// A binary monitor command, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_id: u32,
    pub command: u8,
    pub body: Vec<u8>,
}

impl Request {
    /// MEMORY_GET for `range` in the main memspace, CPU bank
    pub fn memory_get(request_id: u32, range: MemoryRange, side_effects: bool) -> Self {
        let mut body = Vec::with_capacity(MEMORY_GET_BODY_LEN as usize);
        body.push(if side_effects {
            SIDE_EFFECTS_ALLOW
        } else {
            SIDE_EFFECTS_NONE
        });
        body.extend_from_slice(&range.start.to_le_bytes());
        body.extend_from_slice(&range.end.to_le_bytes());
        body.push(MEMSPACE_MAIN);
        body.extend_from_slice(&BANK_CPU.to_le_bytes());
        Request {
            request_id,
            command: CMD_MEMORY_GET,
            body,
        }
    }

    /// KEYBOARD_FEED with the key text passed through verbatim.
    ///
    /// Escapes such as `\x0d` are left for the monitor to interpret.
    pub fn keyboard_feed(request_id: u32, keys: &str) -> Result<Self, MonitorError> {
        let text = keys.as_bytes();
        let len: u8 = text
            .len()
            .try_into()
            .map_err(|_| MonitorError::KeysTooLong(text.len()))?;
        let mut body = Vec::with_capacity(1 + text.len());
        body.push(len);
        body.extend_from_slice(text);
        Ok(Request {
            request_id,
            command: CMD_KEYBOARD_FEED,
            body,
        })
    }

    /// A command without body (EXIT, QUIT)
    pub fn bare(request_id: u32, command: u8) -> Self {
        Request {
            request_id,
            command,
            body: vec![],
        }
    }

    /// Encode to wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(REQUEST_HEADER_LEN + self.body.len());
        out.push(API_START);
        out.push(API_VERSION);
        out.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.request_id.to_le_bytes());
        out.push(self.command);
        out.extend_from_slice(&self.body);
        out
    }

    /// Read one request from a stream (the monitor's side of the exchange)
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Request, MonitorError> {
        let mut header = [0u8; REQUEST_HEADER_LEN];
        reader.read_exact(&mut header)?;
        if header[0] != API_START || header[1] != API_VERSION {
            return Err(MonitorError::ProtocolMismatch {
                magic: header[0],
                version: header[1],
            });
        }
        let body_len = u32::from_le_bytes([header[2], header[3], header[4], header[5]]);
        if body_len > MAX_BODY_LEN {
            return Err(MonitorError::BodyTooLarge(body_len));
        }
        let request_id = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
        let mut body = vec![0u8; body_len as usize];
        reader.read_exact(&mut body)?;
        Ok(Request {
            request_id,
            command: header[10],
            body,
        })
    }
}

pub fn encode_memory_get(request_id: u32, range: MemoryRange, side_effects: bool) -> Vec<u8> {
    Request::memory_get(request_id, range, side_effects).encode()
}

pub fn encode_keyboard_feed(request_id: u32, keys: &str) -> Result<Vec<u8>, MonitorError> {
    Ok(Request::keyboard_feed(request_id, keys)?.encode())
}

pub fn encode_command(request_id: u32, command: u8) -> Vec<u8> {
    Request::bare(request_id, command).encode()
}

/// Fixed 12 byte header preceding every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub magic: u8,
    pub version: u8,
    pub body_len: u32,
    pub kind: u8,
    pub error_code: u8,
    pub request_id: u32,
}

impl ResponseHeader {
    /// Header of a successful response
    pub fn new(kind: u8, request_id: u32, body_len: u32) -> Self {
        ResponseHeader {
            magic: API_START,
            version: API_VERSION,
            body_len,
            kind,
            error_code: ERR_NONE,
            request_id,
        }
    }

    /// Unsolicited event rather than a command reply
    pub fn is_event(&self) -> bool {
        self.request_id == EVENT_REQUEST_ID
    }

    pub fn encode(&self) -> [u8; RESPONSE_HEADER_LEN] {
        let mut out = [0u8; RESPONSE_HEADER_LEN];
        out[0] = self.magic;
        out[1] = self.version;
        out[2..6].copy_from_slice(&self.body_len.to_le_bytes());
        out[6] = self.kind;
        out[7] = self.error_code;
        out[8..12].copy_from_slice(&self.request_id.to_le_bytes());
        out
    }
}

/// Encode a complete response frame (the monitor's side of the exchange)
pub fn encode_response(header: &ResponseHeader, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(RESPONSE_HEADER_LEN + body.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(body);
    out
}

pub fn decode_response_header(bytes: &[u8]) -> Result<ResponseHeader, MonitorError> {
    if bytes.len() < RESPONSE_HEADER_LEN {
        return Err(MonitorError::MalformedHeader { got: bytes.len() });
    }
    let magic = bytes[0];
    let version = bytes[1];
    if magic != API_START || version != API_VERSION {
        return Err(MonitorError::ProtocolMismatch { magic, version });
    }
    let error_code = bytes[7];
    if error_code != ERR_NONE {
        return Err(MonitorError::device(error_code));
    }
    Ok(ResponseHeader {
        magic,
        version,
        body_len: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        kind: bytes[6],
        error_code,
        request_id: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
    })
}

/// Extract the memory values from a MEMORY_GET response body.
///
/// Body: `[segment_len:u16][values...]`. A full 64K read wraps the length to 0.
pub fn decode_memory_get_body(body: &[u8], range: MemoryRange) -> Result<Vec<u8>, MonitorError> {
    if body.len() < 2 {
        return Err(MonitorError::ShortBody {
            got: body.len(),
            need: 2,
        });
    }
    let expected = range.len();
    let declared = u16::from_le_bytes([body[0], body[1]]) as usize;
    let got = if declared == 0 && expected == 0x10000 {
        expected
    } else {
        declared
    };
    if got != expected {
        return Err(MonitorError::SegmentLength { expected, got });
    }
    let values = &body[2..];
    if values.len() < expected {
        return Err(MonitorError::ShortBody {
            got: body.len(),
            need: 2 + expected,
        });
    }
    Ok(values[..expected].to_vec())
}

/// Build a MEMORY_GET response body for `values`
pub fn encode_memory_get_body(values: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + values.len());
    out.extend_from_slice(&(values.len() as u16).to_le_bytes());
    out.extend_from_slice(values);
    out
}
