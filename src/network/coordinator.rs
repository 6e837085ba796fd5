//! Session Coordinator
//!
//! Runs the login handshake, then the receive and send loops over one
//! connection until either side terminates it.
//!
//! ## Termination
//! Whichever loop finishes first closes the connection. Closing shuts the
//! stream down, which ends a blocked read, and disconnects the closed
//! signal the send loop selects on. The first close reason wins.

use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::Receiver;
use crossbeam::select;

use crate::config::{Config, SelfMessagePolicy};
use crate::error::{ChatError, Result};
use crate::protocol::{decode_line, parse_input, write_command, LineFramer, OutboundCommand, Username};
use crate::session::{dispatch_decoded, login, Event, LoginState, Observer, RejectReason};

use super::{CloseReason, Connection, Duplex};

/// Result of the login phase
pub enum LoginOutcome<S: Duplex> {
    LoggedIn(Session<S>),
    Rejected(RejectReason),
    Aborted,
}

/// A logged-in connection, ready to run both loops
pub struct Session<S: Duplex> {
    connection: Arc<Connection<S>>,
    framer: LineFramer<S::Reader>,
    writer: S::Writer,
    username: Username,
    self_message_policy: SelfMessagePolicy,
}

/// Perform the login handshake on `connection`
///
/// Any outcome other than logged in closes the connection.
pub fn establish<S: Duplex>(
    connection: Arc<Connection<S>>,
    config: &Config,
    input: &Receiver<String>,
    observer: &dyn Observer,
) -> Result<LoginOutcome<S>> {
    let (reader, mut writer) = connection.split()?;
    let mut framer = LineFramer::with_chunk_size(reader, config.read_chunk_size);

    let outcome = match login(&mut framer, &mut writer, input, observer) {
        Ok(LoginState::LoggedIn(username)) => {
            tracing::info!("Logged in to {} as {}", connection.peer_addr(), username);
            return Ok(LoginOutcome::LoggedIn(Session {
                connection,
                framer,
                writer,
                username,
                self_message_policy: config.self_message_policy,
            }));
        }
        Ok(LoginState::Rejected(reason)) => Ok(LoginOutcome::Rejected(reason)),
        Ok(_) => Ok(LoginOutcome::Aborted),
        Err(e) => Err(e),
    };

    connection.close(CloseReason::LoginFinished);
    outcome
}

impl<S: Duplex> Session<S> {
    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn connection(&self) -> &Arc<Connection<S>> {
        &self.connection
    }

    /// Run the receive loop on a new thread and the send loop on this one
    ///
    /// Returns once both loops have stopped, with the reason of whichever
    /// closed the connection first.
    pub fn run(self, input: Receiver<String>, observer: Arc<dyn Observer>) -> Result<CloseReason> {
        let Session {
            connection,
            framer,
            mut writer,
            username,
            self_message_policy,
        } = self;

        let receiver = {
            let connection = Arc::clone(&connection);
            let observer = Arc::clone(&observer);
            thread::Builder::new()
                .name("linechat-recv".to_string())
                .spawn(move || receive_loop(framer, &*connection, &*observer))?
        };

        let sender = SendLoop {
            connection: &*connection,
            username: &username,
            policy: self_message_policy,
            observer: &*observer,
        };
        sender.run(&mut writer, &input);

        receiver
            .join()
            .map_err(|_| ChatError::InvalidState("receive loop panicked"))?;

        let reason = connection
            .close_reason()
            .ok_or(ChatError::InvalidState("session loops stopped without closing"))?;

        tracing::info!("Session ended: {}", reason);
        observer.notify(Event::SessionClosed { reason });
        Ok(reason)
    }
}

// =============================================================================
// Receive Loop
// =============================================================================

/// Frame, decode and dispatch server lines until the stream stops
fn receive_loop<R: Read, S: Duplex>(
    mut framer: LineFramer<R>,
    connection: &Connection<S>,
    observer: &dyn Observer,
) {
    while !connection.is_closed() {
        match framer.next_line() {
            Ok(Some(line)) => {
                tracing::trace!("Received: {}", line);
                observer.notify(dispatch_decoded(decode_line(&line)));
            }
            Ok(None) => {
                connection.close(CloseReason::StreamEnded);
                return;
            }
            Err(e) => {
                if !connection.is_closed() {
                    tracing::warn!("Error reading from {}: {}", connection.peer_addr(), e);
                }
                connection.close(CloseReason::ReadFailed);
                return;
            }
        }
    }
}

// =============================================================================
// Send Loop
// =============================================================================

struct SendLoop<'a, S: Duplex> {
    connection: &'a Connection<S>,
    username: &'a Username,
    policy: SelfMessagePolicy,
    observer: &'a dyn Observer,
}

impl<S: Duplex> SendLoop<'_, S> {
    /// Forward local input until quit, input end, write failure or close
    fn run<W: Write>(&self, writer: &mut W, input: &Receiver<String>) {
        let closed = self.connection.closed_signal();

        loop {
            select! {
                recv(input) -> line => match line {
                    Ok(line) => {
                        if !self.handle_line(writer, &line) {
                            return;
                        }
                    }
                    Err(_) => {
                        self.connection.close(CloseReason::InputClosed);
                        return;
                    }
                },
                recv(closed) -> _ => return,
            }
        }
    }

    /// Returns `false` once the loop must stop
    fn handle_line<W: Write>(&self, writer: &mut W, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        let command = match parse_input(line, self.username, self.policy) {
            Ok(command) => command,
            Err(error) => {
                self.observer.notify(Event::InputRejected {
                    input: line.trim().to_string(),
                    error,
                });
                return true;
            }
        };

        if self.connection.is_closed() {
            return false;
        }

        if let Err(e) = write_command(writer, &command) {
            tracing::warn!("Error writing to {}: {}", self.connection.peer_addr(), e);
            self.connection.close(CloseReason::WriteFailed);
            return false;
        }

        if command == OutboundCommand::Quit {
            self.connection.close(CloseReason::UserQuit);
            return false;
        }

        true
    }
}
