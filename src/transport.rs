/*! The injected byte-stream capability, and a TCP adapter.

A [`Session`](crate::Session) talks to exactly one relay through whatever
implements [`Transport`]: a TCP socket, a serial port, a terminal server.
The trait is deliberately small, mirroring what telnet and serial APIs
already provide. Acquisition and release of the underlying connection stay
with the caller; the session only reads, writes, and drains.
*/

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use log::trace;

use crate::Result;

/// Bidirectional byte stream to a relay.
pub trait Transport {
    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read until `pattern` has been seen or `timeout` elapses.
    ///
    /// Returns everything received up to and including the pattern; bytes
    /// after the pattern stay buffered for the next read. A timeout is not
    /// an error: whatever arrived is returned, possibly nothing. The
    /// session layer decides what an incomplete reply means.
    fn read_until(&mut self, pattern: &[u8], timeout: Duration) -> Result<Vec<u8>>;

    /// Return whatever is available right now without waiting for more.
    fn read_eager(&mut self) -> Result<Vec<u8>>;

    /// Discard any unread input.
    fn reset_input_buffer(&mut self) -> Result<()>;

    /// Hint for the default read timeout, where the transport supports one.
    fn set_timeout(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

/// [`Transport`] adapter over a TCP connection, typically to a relay's
/// telnet port or a serial-to-Ethernet terminal server.
pub struct TcpTransport {
    stream: TcpStream,
    buf: Vec<u8>,
}

/// Granularity of blocking reads, so a long `read_until` deadline can
/// still notice the pattern arriving piecewise.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// How long [`Transport::read_eager`] waits before declaring the line
/// quiet.
const EAGER_WAIT: Duration = Duration::from_millis(10);

impl TcpTransport {
    /// Connect to the given address, e.g. `"192.168.2.210:23"`.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            buf: Vec::new(),
        })
    }

    /// Read one chunk with the given timeout, appending to the internal
    /// buffer. Returns false on timeout or orderly shutdown.
    fn fill(&mut self, wait: Duration) -> Result<bool> {
        self.stream
            .set_read_timeout(Some(wait.max(Duration::from_millis(1))))?;
        let mut chunk = [0u8; 1024];
        match self.stream.read(&mut chunk) {
            Ok(0) => Ok(false),
            Ok(n) => {
                self.buf.extend_from_slice(&chunk[..n]);
                Ok(true)
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn find(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() || self.buf.len() < pattern.len() {
            return None;
        }
        self.buf.windows(pattern.len()).position(|w| w == pattern)
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        trace!("tcp tx: {data:02x?}");
        self.stream.write_all(data)?;
        Ok(())
    }

    fn read_until(&mut self, pattern: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(pos) = self.find(pattern) {
                let out: Vec<u8> = self.buf.drain(..pos + pattern.len()).collect();
                trace!("tcp rx: {out:02x?}");
                return Ok(out);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let out: Vec<u8> = std::mem::take(&mut self.buf);
                trace!("tcp rx (timeout): {out:02x?}");
                return Ok(out);
            }
            self.fill(remaining.min(POLL_SLICE))?;
        }
    }

    fn read_eager(&mut self) -> Result<Vec<u8>> {
        while self.fill(EAGER_WAIT)? {}
        Ok(std::mem::take(&mut self.buf))
    }

    fn reset_input_buffer(&mut self) -> Result<()> {
        self.read_eager()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn serve(data: &'static [u8]) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(data).unwrap();
            // Keep the connection open so reads time out instead of EOF.
            std::thread::sleep(Duration::from_secs(2));
        });
        addr
    }

    #[test]
    fn read_until_pattern_keeps_remainder() -> crate::Result<()> {
        let addr = serve(b"hello\r\n=world");
        let mut t = TcpTransport::connect(addr)?;
        let got = t.read_until(b"\r\n=", Duration::from_secs(5))?;
        assert_eq!(got, b"hello\r\n=");
        let rest = t.read_eager()?;
        assert_eq!(rest, b"world");
        Ok(())
    }

    #[test]
    fn read_until_timeout_returns_partial() -> crate::Result<()> {
        let addr = serve(b"no prompt here");
        let mut t = TcpTransport::connect(addr)?;
        let got = t.read_until(b"\r\n=", Duration::from_millis(300))?;
        assert_eq!(got, b"no prompt here");
        Ok(())
    }
}
