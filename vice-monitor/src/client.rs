//! Typed monitor operations on top of a transport.

use crate::codec::{
    decode_memory_get_body, encode_command, encode_keyboard_feed, encode_memory_get, MemoryRange,
};
use crate::protocol::{CMD_EXIT, CMD_QUIT, EVENT_REQUEST_ID};
use crate::transport::{Response, TcpTransport, Transport};
use crate::MonitorError;

/// Memory and keyboard access to a running machine.
///
/// Board reading and game control are written against this trait rather
/// than a concrete client.
pub trait Monitor {
    /// Read `range` without side effects
    fn read_memory(&mut self, range: MemoryRange) -> Result<Vec<u8>, MonitorError>;

    /// Put `keys` into the machine's keyboard buffer
    fn send_keys(&mut self, keys: &str) -> Result<(), MonitorError>;
}

impl<M: Monitor + ?Sized> Monitor for &mut M {
    fn read_memory(&mut self, range: MemoryRange) -> Result<Vec<u8>, MonitorError> {
        (**self).read_memory(range)
    }

    fn send_keys(&mut self, keys: &str) -> Result<(), MonitorError> {
        (**self).send_keys(keys)
    }
}

/// Binary monitor client.
///
/// The only state is the request id sequence: it starts at 1, increases by
/// one per request and never hands out the event id.
#[derive(Debug)]
pub struct MonitorClient<T = TcpTransport> {
    transport: T,
    next_request_id: u32,
}

impl MonitorClient<TcpTransport> {
    /// Client for a binary monitor listening on `addr` (`host:port`)
    pub fn tcp<S: Into<String>>(addr: S) -> Self {
        MonitorClient::new(TcpTransport::new(addr))
    }
}

impl<T: Transport> MonitorClient<T> {
    pub fn new(transport: T) -> Self {
        MonitorClient {
            transport,
            next_request_id: 1,
        }
    }

    /// Id the next request will carry
    pub fn peek_request_id(&self) -> u32 {
        self.next_request_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn allocate_request_id(&mut self) -> u32 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        if self.next_request_id == EVENT_REQUEST_ID {
            self.next_request_id = 1;
        }
        id
    }

    fn round_trip(&mut self, request: &[u8], request_id: u32) -> Result<Response, MonitorError> {
        let response = self.transport.send(request, request_id)?;
        if response.events_drained > 0 {
            log::debug!(
                "[PROTO] request {} answered after {} events",
                request_id,
                response.events_drained
            );
        }
        Ok(response)
    }

    /// Read `range`, optionally letting the read trigger I/O side effects
    pub fn read_memory_with(
        &mut self,
        range: MemoryRange,
        side_effects: bool,
    ) -> Result<Vec<u8>, MonitorError> {
        let id = self.allocate_request_id();
        log::debug!("[PROTO] -> MEMORY_GET id={} {}", id, range);
        let request = encode_memory_get(id, range, side_effects);
        let response = self.round_trip(&request, id)?;
        decode_memory_get_body(&response.body, range)
    }

    /// Feed `keys` to the keyboard buffer; only the acknowledgement is awaited
    pub fn feed_keys(&mut self, keys: &str) -> Result<(), MonitorError> {
        let id = self.allocate_request_id();
        let request = encode_keyboard_feed(id, keys)?;
        log::debug!("[PROTO] -> KEYBOARD_FEED id={} {:?}", id, keys);
        self.round_trip(&request, id)?;
        Ok(())
    }

    /// Leave the monitor and resume emulation
    pub fn exit(&mut self) -> Result<(), MonitorError> {
        let id = self.allocate_request_id();
        log::debug!("[PROTO] -> EXIT id={}", id);
        self.round_trip(&encode_command(id, CMD_EXIT), id)?;
        Ok(())
    }

    /// Quit the emulator
    pub fn quit(&mut self) -> Result<(), MonitorError> {
        let id = self.allocate_request_id();
        log::debug!("[PROTO] -> QUIT id={}", id);
        self.round_trip(&encode_command(id, CMD_QUIT), id)?;
        Ok(())
    }
}

impl<T: Transport> Monitor for MonitorClient<T> {
    fn read_memory(&mut self, range: MemoryRange) -> Result<Vec<u8>, MonitorError> {
        self.read_memory_with(range, false)
    }

    fn send_keys(&mut self, keys: &str) -> Result<(), MonitorError> {
        self.feed_keys(keys)
    }
}
