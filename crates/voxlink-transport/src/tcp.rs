use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// TCP listener for device connections.
///
/// Accepts one connection at a time; the caller serves it to completion
/// before accepting the next.
pub struct TcpLink {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TcpLink {
    /// Default listen address used by the device firmware.
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:8080";

    /// Bind and listen on `addr`.
    ///
    /// Port `0` picks a free port; see [`TcpLink::local_addr`].
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let label = addr.to_string();
        let listener = TcpListener::bind(&addr).map_err(|e| TransportError::Bind {
            addr: label.clone(),
            source: e,
        })?;
        let addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: label,
            source: e,
        })?;

        info!(%addr, "listening for device connections");

        Ok(Self { listener, addr })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<LinkStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(LinkStream::from_tcp(stream))
    }

    /// Switch the listener between blocking and polling accepts.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        self.listener
            .set_nonblocking(nonblocking)
            .map_err(TransportError::Accept)
    }

    /// Accept without waiting. Returns `Ok(None)` when no connection is
    /// pending on a non-blocking listener.
    ///
    /// The returned stream is always in blocking mode.
    pub fn try_accept(&self) -> Result<Option<LinkStream>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                stream
                    .set_nonblocking(false)
                    .map_err(TransportError::Accept)?;
                debug!(%peer, "accepted connection");
                Ok(Some(LinkStream::from_tcp(stream)))
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(TransportError::Accept(err)),
        }
    }

    /// Connect to a listening link (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<LinkStream> {
        let label = addr.to_string();
        let stream = TcpStream::connect(&addr).map_err(|e| TransportError::Connect {
            addr: label.clone(),
            source: e,
        })?;
        debug!(addr = %label, "connected to link");
        Ok(LinkStream::from_tcp(stream))
    }

    /// Connect with an upper bound on connection setup time.
    pub fn connect_timeout(
        addr: impl ToSocketAddrs + std::fmt::Display,
        timeout: Duration,
    ) -> Result<LinkStream> {
        let label = addr.to_string();
        let resolved = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect {
                addr: label.clone(),
                source: e,
            })?
            .next()
            .ok_or_else(|| TransportError::Unresolved(label.clone()))?;

        let stream =
            TcpStream::connect_timeout(&resolved, timeout).map_err(|e| TransportError::Connect {
                addr: label.clone(),
                source: e,
            })?;
        debug!(addr = %label, "connected to link");
        Ok(LinkStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpLink::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();
        assert_ne!(addr.port(), 0);

        let handle = std::thread::spawn(move || {
            let mut client = TcpLink::connect(addr).unwrap();
            client.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn test_shutdown_write_signals_eof() {
        let listener = TcpLink::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();

        let handle = std::thread::spawn(move || {
            let mut client = TcpLink::connect_timeout(addr, Duration::from_secs(2)).unwrap();
            let mut got = Vec::new();
            client.read_to_end(&mut got).unwrap();
            // Read half of the server stays open after the half-close.
            client.write_all(b"ack").unwrap();
            got
        });

        let mut server = listener.accept().unwrap();
        server.write_all(b"bye").unwrap();
        server.shutdown_write().unwrap();

        let mut ack = [0u8; 3];
        server.read_exact(&mut ack).unwrap();
        assert_eq!(&ack, b"ack");
        assert_eq!(handle.join().unwrap(), b"bye");
    }

    #[test]
    fn test_read_timeout_applies() {
        let listener = TcpLink::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();
        let client = std::thread::spawn(move || TcpLink::connect(addr).unwrap());

        let mut server = listener.accept().unwrap();
        let _client = client.join().unwrap();
        server
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();

        let mut buf = [0u8; 1];
        let err = server.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn test_try_accept_polls() {
        let listener = TcpLink::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        assert!(listener.try_accept().unwrap().is_none());

        let addr = listener.local_addr();
        let _client = TcpLink::connect(addr).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        let mut accepted = None;
        while accepted.is_none() && std::time::Instant::now() < deadline {
            accepted = listener.try_accept().unwrap();
            if accepted.is_none() {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        let mut server = accepted.expect("connection should be accepted");

        // Accepted streams block even though the listener does not.
        server
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let mut buf = [0u8; 1];
        let err = server.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn test_bind_in_use_reports_address() {
        let first = TcpLink::bind("127.0.0.1:0").unwrap();
        let taken = first.local_addr().to_string();
        let result = TcpLink::bind(taken.as_str());
        match result {
            Err(TransportError::Bind { addr, .. }) => assert_eq!(addr, taken),
            other => panic!("expected bind error, got {other:?}", other = other.map(|_| ())),
        }
    }

    #[test]
    fn test_connect_refused() {
        let addr = {
            let probe = TcpLink::bind("127.0.0.1:0").unwrap();
            probe.local_addr()
        };
        let result = TcpLink::connect(addr);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
