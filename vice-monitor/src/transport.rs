//! Request/response exchange with the binary monitor.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::codec::{decode_response_header, ResponseHeader};
use crate::protocol::{response_name, MAX_BODY_LEN, RESPONSE_HEADER_LEN};
use crate::MonitorError;

/// A command reply matched to its request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: ResponseHeader,
    pub body: Vec<u8>,
    /// Event frames discarded before the reply arrived
    pub events_drained: usize,
}

/// Send encoded request bytes and receive the correlated response.
///
/// `TcpTransport` is the blocking implementation; anything able to deliver
/// the matching reply for a request id can stand in for it.
pub trait Transport {
    fn send(&mut self, request: &[u8], request_id: u32) -> Result<Response, MonitorError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &[u8], request_id: u32) -> Result<Response, MonitorError> {
        (**self).send(request, request_id)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, request: &[u8], request_id: u32) -> Result<Response, MonitorError> {
        (**self).send(request, request_id)
    }
}

/// Write `request` and read frames until the reply for `request_id`.
///
/// Event frames are drained and skipped. The first non-event frame is the
/// reply; if it carries another id the exchange fails without reading on.
pub fn exchange<S: Read + Write>(
    stream: &mut S,
    request: &[u8],
    request_id: u32,
) -> Result<Response, MonitorError> {
    log::trace!("[PROTO] -> {} bytes: {}", request.len(), fmt_hex(request));
    stream.write_all(request)?;
    stream.flush()?;

    let mut events_drained = 0;
    loop {
        let mut header_bytes = [0u8; RESPONSE_HEADER_LEN];
        stream.read_exact(&mut header_bytes)?;
        let header = decode_response_header(&header_bytes)?;
        let body = read_body(stream, header.body_len)?;

        if header.is_event() {
            log::debug!(
                "[PROTO] <- event: {} (0x{:02x}), {} body bytes",
                response_name(header.kind),
                header.kind,
                body.len()
            );
            events_drained += 1;
            continue;
        }

        if header.request_id != request_id {
            return Err(MonitorError::RequestIdMismatch {
                expected: request_id,
                got: header.request_id,
            });
        }

        log::trace!(
            "[PROTO] <- {} id={} ({} bytes): {}",
            response_name(header.kind),
            header.request_id,
            body.len(),
            fmt_hex(&body)
        );
        return Ok(Response {
            header,
            body,
            events_drained,
        });
    }
}

fn read_body<R: Read>(reader: &mut R, len: u32) -> Result<Vec<u8>, MonitorError> {
    if len > MAX_BODY_LEN {
        return Err(MonitorError::BodyTooLarge(len));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body)?;
    Ok(body)
}

/// Format bytes as hex string for trace output
pub(crate) fn fmt_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Blocking TCP transport, one connection per request
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: String,
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
}

impl TcpTransport {
    pub fn new<S: Into<String>>(addr: S) -> Self {
        TcpTransport {
            addr: addr.into(),
            connect_timeout: Duration::from_secs(2),
            io_timeout: Some(Duration::from_secs(10)),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Read/write timeout; `None` blocks indefinitely
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn connect(&self) -> Result<TcpStream, MonitorError> {
        let mut last_err = None;
        for socket_addr in self.addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&socket_addr, self.connect_timeout) {
                Ok(stream) => {
                    // Disable Nagle's algorithm, requests are tiny
                    let _ = stream.set_nodelay(true);
                    stream.set_read_timeout(self.io_timeout)?;
                    stream.set_write_timeout(self.io_timeout)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => MonitorError::Io(e),
            None => MonitorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("no address for {}", self.addr),
            )),
        })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, request: &[u8], request_id: u32) -> Result<Response, MonitorError> {
        let mut stream = self.connect()?;
        log::debug!("[PROTO] connected to {}", self.addr);
        let result = exchange(&mut stream, request, request_id);
        let _ = stream.shutdown(Shutdown::Both);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_memory_get, encode_response, MemoryRange};
    use crate::protocol::*;
    use std::io::Cursor;

    /// Duplex stream: scripted input, captured output
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        chunk: usize,
    }

    impl ScriptedStream {
        fn new(input: Vec<u8>) -> Self {
            ScriptedStream {
                input: Cursor::new(input),
                output: Vec::new(),
                chunk: usize::MAX,
            }
        }

        /// Deliver at most `chunk` bytes per read
        fn chunked(input: Vec<u8>, chunk: usize) -> Self {
            ScriptedStream {
                chunk,
                ..Self::new(input)
            }
        }

        fn consumed(&self) -> usize {
            self.input.position() as usize
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.input.read(&mut buf[..n])
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            // short writes exercise write_all
            let n = buf.len().min(3);
            self.output.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn event(kind: u8, body: &[u8]) -> Vec<u8> {
        encode_response(
            &ResponseHeader::new(kind, EVENT_REQUEST_ID, body.len() as u32),
            body,
        )
    }

    fn reply(request_id: u32, body: &[u8]) -> Vec<u8> {
        encode_response(
            &ResponseHeader::new(RES_MEMORY_GET, request_id, body.len() as u32),
            body,
        )
    }

    #[test]
    fn test_request_fully_written() {
        let request = encode_memory_get(5, MemoryRange::single(0x18), false);
        let mut stream = ScriptedStream::new(reply(5, &[1, 0, 7]));
        exchange(&mut stream, &request, 5).unwrap();
        assert_eq!(stream.output, request);
    }

    #[test]
    fn test_drains_events_before_reply() {
        for n in 0..5 {
            let mut input = Vec::new();
            for i in 0..n {
                input.extend(event(RES_REGISTER_INFO, &vec![i as u8; i * 3]));
                input.extend(event(RES_STOPPED, &[0x0d, 0x10]));
            }
            input.extend(reply(9, &[2, 0, 0xaa, 0xbb]));
            let total = input.len();
            input.extend(reply(10, &[0xde, 0xad]));

            let mut stream = ScriptedStream::new(input);
            let resp = exchange(&mut stream, b"req", 9).unwrap();
            assert_eq!(resp.body, vec![2, 0, 0xaa, 0xbb]);
            assert_eq!(resp.events_drained, n * 2);
            assert_eq!(stream.consumed(), total);
        }
    }

    #[test]
    fn test_partial_chunks_accumulate() {
        let mut input = event(RES_STOPPED, &[1, 2, 3, 4]);
        input.extend(reply(3, &[4, 0, 9, 8, 7, 6]));
        let mut stream = ScriptedStream::chunked(input, 1);
        let resp = exchange(&mut stream, b"req", 3).unwrap();
        assert_eq!(resp.body, vec![4, 0, 9, 8, 7, 6]);
        assert_eq!(resp.events_drained, 1);
    }

    #[test]
    fn test_mismatched_id_stops_reading() {
        let mut input = reply(4, &[1, 0, 1]);
        let first = input.len();
        input.extend(reply(5, &[1, 0, 2]));
        let mut stream = ScriptedStream::new(input);
        assert!(matches!(
            exchange(&mut stream, b"req", 5),
            Err(MonitorError::RequestIdMismatch {
                expected: 5,
                got: 4
            })
        ));
        assert_eq!(stream.consumed(), first);
    }

    #[test]
    fn test_closed_mid_header() {
        let input = reply(1, &[])[..6].to_vec();
        let mut stream = ScriptedStream::new(input);
        assert!(matches!(
            exchange(&mut stream, b"req", 1),
            Err(MonitorError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_closed_mid_body() {
        let mut input = reply(1, &[3, 0, 1, 2, 3]);
        input.truncate(input.len() - 2);
        let mut stream = ScriptedStream::new(input);
        assert!(matches!(
            exchange(&mut stream, b"req", 1),
            Err(MonitorError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_closed_before_reply() {
        let mut stream = ScriptedStream::new(event(RES_RESUMED, &[0, 0]));
        assert!(matches!(
            exchange(&mut stream, b"req", 1),
            Err(MonitorError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_oversized_body_rejected() {
        let header = ResponseHeader::new(RES_MEMORY_GET, 1, MAX_BODY_LEN + 1);
        let mut stream = ScriptedStream::new(header.encode().to_vec());
        assert!(matches!(
            exchange(&mut stream, b"req", 1),
            Err(MonitorError::BodyTooLarge(_))
        ));
    }

    #[test]
    fn test_fmt_hex() {
        assert_eq!(fmt_hex(&[0x02, 0xab]), "02 AB");
    }
}
