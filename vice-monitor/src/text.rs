//! Line oriented text monitor (`-remotemonitor`).
//!
//! Used for commands with no binary equivalent in this client, such as
//! saving memory to a host file or toggling warp mode.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::codec::MemoryRange;
use crate::MonitorError;

/// Largest reply read per command
pub const REPLY_BUFFER_LEN: usize = 4096;

/// Terminates every command line. VICE accepts either `\n` or `\r`.
pub const LINE_TERMINATOR: &str = "\n";

/// Text monitor client, one connection per command
#[derive(Debug, Clone)]
pub struct TextMonitor {
    addr: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TextMonitor {
    pub fn new<S: Into<String>>(addr: S) -> Self {
        TextMonitor {
            addr: addr.into(),
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one command line and return the monitor's reply text
    pub fn run_command(&self, command: &str) -> Result<String, MonitorError> {
        log::debug!("[TEXT] -> {}", command);
        let mut stream = self.connect()?;
        let line = format!("{}{}", command.trim_end(), LINE_TERMINATOR);
        stream.write_all(line.as_bytes())?;
        stream.flush()?;

        let mut buf = vec![0u8; REPLY_BUFFER_LEN];
        let n = stream.read(&mut buf)?;
        let _ = stream.shutdown(Shutdown::Both);
        let reply = String::from_utf8_lossy(&buf[..n]).into_owned();
        log::debug!("[TEXT] <- {:?}", reply);
        Ok(reply)
    }

    /// `keybuf`: feed keys, C-style hex escapes for special keys
    pub fn keybuf(&self, keys: &str) -> Result<String, MonitorError> {
        self.run_command(&format!("keybuf {}", keys))
    }

    /// `s`: save `range` to a file on the emulator's host
    pub fn save_memory(&self, path: &Path, range: MemoryRange) -> Result<String, MonitorError> {
        self.run_command(&save_command(path, range))
    }

    pub fn set_warp(&self, on: bool) -> Result<String, MonitorError> {
        self.run_command(if on { "warp on" } else { "warp off" })
    }

    pub fn sound_effects(&self, on: bool) -> Result<String, MonitorError> {
        self.run_command(if on { "sfx on" } else { "sfx off" })
    }

    fn connect(&self) -> Result<TcpStream, MonitorError> {
        let socket_addr = self.addr.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("no address for {}", self.addr),
            )
        })?;
        let stream = TcpStream::connect_timeout(&socket_addr, self.connect_timeout)?;
        stream.set_read_timeout(Some(self.read_timeout))?;
        Ok(stream)
    }
}

fn save_command(path: &Path, range: MemoryRange) -> String {
    format!(
        "s {} {:04x} {:04x}",
        path.display(),
        range.start(),
        range.end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_save_command_format() {
        let range = MemoryRange::new(0, 0xffff).unwrap();
        assert_eq!(
            save_command(Path::new("dump.bin"), range),
            "s dump.bin 0000 ffff"
        );
    }

    /// Answer one command with `reply`, returning the line received
    fn serve_one(reply: &'static [u8]) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (sock, _peer) = listener.accept().unwrap();
            let mut reader = BufReader::new(sock.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let mut sock = sock;
            sock.write_all(reply).unwrap();
            line
        });
        (addr.to_string(), server)
    }

    #[test]
    fn test_run_command_round_trip() {
        let (addr, server) = serve_one(b"Sound effects are off\n(C:$e5cf) ");
        let reply = TextMonitor::new(addr).sound_effects(false).unwrap();
        assert!(reply.starts_with("Sound effects are off"));
        assert_eq!(server.join().unwrap(), "sfx off\n");
    }

    #[test]
    fn test_keybuf_line() {
        let (addr, server) = serve_one(b"(C:$e5cf) ");
        TextMonitor::new(addr).keybuf("d2-d4\\x0d").unwrap();
        assert_eq!(server.join().unwrap(), "keybuf d2-d4\\x0d\n");
    }

    #[test]
    fn test_warp_lines() {
        let (addr, server) = serve_one(b"(C:$e5cf) ");
        TextMonitor::new(addr).set_warp(true).unwrap();
        assert_eq!(server.join().unwrap(), "warp on\n");

        let (addr, server) = serve_one(b"(C:$e5cf) ");
        TextMonitor::new(addr).set_warp(false).unwrap();
        assert_eq!(server.join().unwrap(), "warp off\n");
    }
}
