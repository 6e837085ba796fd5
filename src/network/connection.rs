//! Connection Handle
//!
//! Owns the stream shared by the receive and send loops and guarantees it
//! is closed exactly once.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;

/// A bidirectional byte stream that can be split into independent halves
///
/// Each loop owns one half; `shutdown` must unblock a reader waiting on the
/// other half.
pub trait Duplex: Send + Sync + 'static {
    type Reader: Read + Send + 'static;
    type Writer: Write + Send + 'static;

    /// Create the read and write halves
    fn split(&self) -> io::Result<(Self::Reader, Self::Writer)>;

    /// Shut down both directions
    fn shutdown(&self) -> io::Result<()>;
}

impl Duplex for TcpStream {
    type Reader = TcpStream;
    type Writer = TcpStream;

    fn split(&self) -> io::Result<(TcpStream, TcpStream)> {
        Ok((self.try_clone()?, self.try_clone()?))
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Which event closed the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// User issued `!quit`
    UserQuit,

    /// Local input ended
    InputClosed,

    /// Server closed its side
    StreamEnded,

    ReadFailed,

    WriteFailed,

    /// Login ended in a state other than logged in
    LoginFinished,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CloseReason::UserQuit => "user quit",
            CloseReason::InputClosed => "input closed",
            CloseReason::StreamEnded => "server closed the connection",
            CloseReason::ReadFailed => "read failed",
            CloseReason::WriteFailed => "write failed",
            CloseReason::LoginFinished => "login finished",
        };
        f.write_str(text)
    }
}

/// Close bookkeeping, guarded as one unit
struct CloseState {
    /// First close reason; `Some` once closed
    reason: Option<CloseReason>,

    /// Dropped on close so every `closed_signal` receiver wakes up
    signal: Option<Sender<()>>,
}

/// A connection to the chat server
pub struct Connection<S: Duplex> {
    /// Underlying stream
    stream: S,

    /// Peer address for logging
    peer_addr: String,

    close_state: Mutex<CloseState>,

    /// Disconnects once the connection is closed; never carries a value
    closed: Receiver<()>,
}

impl<S: Duplex> Connection<S> {
    /// Wrap an already-open stream
    pub fn new(stream: S, peer_addr: impl Into<String>) -> Self {
        let (signal, closed) = channel::bounded(0);
        Self {
            stream,
            peer_addr: peer_addr.into(),
            close_state: Mutex::new(CloseState {
                reason: None,
                signal: Some(signal),
            }),
            closed,
        }
    }

    /// Create the read and write halves for the two loops
    pub fn split(&self) -> Result<(S::Reader, S::Writer)> {
        Ok(self.stream.split()?)
    }

    /// Close the connection
    ///
    /// Only the first call shuts the stream down and records its reason;
    /// it returns `true`. Every later call is a no-op returning `false`.
    pub fn close(&self, reason: CloseReason) -> bool {
        let mut state = self.close_state.lock();
        if state.reason.is_some() {
            return false;
        }

        state.reason = Some(reason);
        state.signal.take();

        if let Err(e) = self.stream.shutdown() {
            // The peer may already have torn the socket down
            tracing::debug!("Shutdown of {} reported: {}", self.peer_addr, e);
        }

        tracing::debug!("Connection to {} closed: {}", self.peer_addr, reason);
        true
    }

    pub fn is_closed(&self) -> bool {
        self.close_state.lock().reason.is_some()
    }

    /// The reason given by the first `close`
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_state.lock().reason
    }

    /// A receiver that disconnects when the connection closes
    pub fn closed_signal(&self) -> Receiver<()> {
        self.closed.clone()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Connection<TcpStream> {
    /// Open a TCP connection to `config.server_addr`
    ///
    /// Disables Nagle's algorithm and applies the configured timeouts.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.resolve_server_addr()?;

        let stream = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        tracing::debug!("Connected to {}", addr);
        Ok(Self::new(stream, addr.to_string()))
    }
}
