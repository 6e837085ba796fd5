//! Line framer
//!
//! Reconstructs newline-terminated protocol lines from a byte stream that
//! may deliver them split across reads or several to a read.

use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::error::Result;

/// Default size of one underlying read
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Splits a byte source into complete lines
///
/// Lines are yielded without the `\n` terminator and with trailing
/// whitespace (including `\r`) removed. Whitespace-only lines are skipped.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
///
/// A read of zero bytes ends the stream: lines already terminated in the
/// buffer are still yielded, an unterminated tail is discarded.
pub struct LineFramer<R> {
    /// Underlying byte source
    source: R,

    /// Bytes received but not yet yielded as a line
    buffer: BytesMut,

    /// Scratch space for one read
    chunk: Vec<u8>,

    /// Prefix of `buffer` already known to contain no `\n`
    scanned: usize,

    /// Set once the source has reported end of stream
    finished: bool,
}

impl<R: Read> LineFramer<R> {
    /// Create a framer with the default chunk size
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Create a framer reading at most `chunk_size` bytes per call
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        Self {
            source,
            buffer: BytesMut::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size.max(1)],
            scanned: 0,
            finished: false,
        }
    }

    /// Return the next complete line
    ///
    /// Blocks on the source until a line is available. Returns `Ok(None)`
    /// once the stream has ended and every terminated line was yielded.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            while let Some(line) = self.take_line() {
                if !line.is_empty() {
                    return Ok(Some(line));
                }
            }

            if self.finished {
                return Ok(None);
            }

            match self.source.read(&mut self.chunk) {
                Ok(0) => {
                    self.finished = true;
                    if !self.buffer.is_empty() {
                        tracing::debug!(
                            "Discarding {} bytes of unterminated line at end of stream",
                            self.buffer.len()
                        );
                        self.buffer.clear();
                        self.scanned = 0;
                    }
                }
                Ok(n) => {
                    tracing::trace!("Read {} bytes", n);
                    self.buffer.extend_from_slice(&self.chunk[..n]);
                }
                // No bytes yet, but the stream is still open
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                    ) =>
                {
                    continue;
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e.into());
                }
            }
        }
    }

    /// Extract one terminated line from the buffer, if there is one
    fn take_line(&mut self) -> Option<String> {
        let offset = self.buffer[self.scanned..].iter().position(|&b| b == b'\n');

        match offset {
            Some(offset) => {
                let raw = self.buffer.split_to(self.scanned + offset + 1);
                self.scanned = 0;
                let text = String::from_utf8_lossy(&raw[..raw.len() - 1]);
                Some(text.trim_end().to_string())
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Number of received bytes not yet yielded
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the source has reported end of stream
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get a reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.source
    }
}

impl<R: Read> Iterator for LineFramer<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
