//! Login state machine
//!
//! Drives the `HELLO-FROM` handshake to a terminal state. Retryable outcomes
//! return to [`LoginState::AwaitingUsername`] on the same connection.
//!
//! ```text
//!                  invalid name / IN-USE / BAD-RQST-* / unknown
//!                ┌───────────────────────────────────────────┐
//!                ▼                                           │
//!   ┌──────────────────┐  valid name   ┌───────────────┐     │
//!   │ AwaitingUsername │ ────────────► │ HandshakeSent │ ────┘
//!   └────────┬─────────┘               └──┬─────────┬──┘
//!   "" / !quit│                      HELLO │   BUSY / │ lost
//!            ▼                             ▼          ▼
//!        Aborted                      LoggedIn     Rejected
//! ```

use std::fmt;
use std::io::{Read, Write};

use crossbeam::channel::Receiver;

use crate::error::{ChatError, Result};
use crate::protocol::{decode_line, write_handshake, LineFramer, ProtocolMessage, Username, QUIT_INPUT};

use super::{Event, Observer};

/// Why a login attempt ended without success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ServerFull,
    ConnectionLost,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::ServerFull => f.write_str("server full"),
            RejectReason::ConnectionLost => f.write_str("connection lost"),
        }
    }
}

/// Handshake progress for one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    AwaitingUsername,
    HandshakeSent(Username),
    LoggedIn(Username),
    Rejected(RejectReason),
    Aborted,
}

impl LoginState {
    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginState::LoggedIn(_) | LoginState::Rejected(_) | LoginState::Aborted
        )
    }
}

/// What the caller must do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Send the handshake for this name, then feed the reply
    SendHandshake(Username),

    /// Report the event and wait for another username
    Retry(Event),

    /// A terminal state was reached
    Finished,
}

/// The handshake state machine
///
/// Holds no I/O; [`login`] drives it against a real connection.
#[derive(Debug)]
pub struct LoginMachine {
    state: LoginState,
}

impl LoginMachine {
    pub fn new() -> Self {
        Self {
            state: LoginState::AwaitingUsername,
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Feed one line of user input while awaiting a username
    pub fn submit(&mut self, input: &str) -> Result<LoginStep> {
        if self.state != LoginState::AwaitingUsername {
            return Err(ChatError::InvalidState("username submitted while not awaiting one"));
        }

        let input = input.trim();
        if input.is_empty() || input == QUIT_INPUT {
            self.state = LoginState::Aborted;
            return Ok(LoginStep::Finished);
        }

        match Username::parse(input) {
            Ok(username) => {
                self.state = LoginState::HandshakeSent(username.clone());
                Ok(LoginStep::SendHandshake(username))
            }
            Err(error) => Ok(LoginStep::Retry(Event::InvalidUsername {
                username: input.to_string(),
                error,
            })),
        }
    }

    /// Feed the server's reply to the handshake
    pub fn on_message(&mut self, message: ProtocolMessage) -> Result<LoginStep> {
        let username = self.pending_username()?;

        let step = match message {
            ProtocolMessage::Hello => {
                self.state = LoginState::LoggedIn(username);
                LoginStep::Finished
            }
            ProtocolMessage::InUse => {
                self.state = LoginState::AwaitingUsername;
                LoginStep::Retry(Event::UsernameTaken { username })
            }
            ProtocolMessage::Busy => {
                self.state = LoginState::Rejected(RejectReason::ServerFull);
                LoginStep::Finished
            }
            other => {
                self.state = LoginState::AwaitingUsername;
                LoginStep::Retry(Event::LoginDeclined {
                    username,
                    header: other.header().to_string(),
                })
            }
        };

        Ok(step)
    }

    /// The reply could not be decoded; retryable like an unknown header
    pub fn on_malformed(&mut self, header: &str) -> Result<LoginStep> {
        let username = self.pending_username()?;
        self.state = LoginState::AwaitingUsername;
        Ok(LoginStep::Retry(Event::LoginDeclined {
            username,
            header: header.to_string(),
        }))
    }

    /// The stream ended or failed before a reply arrived
    pub fn on_connection_lost(&mut self) -> Result<LoginStep> {
        self.pending_username()?;
        self.state = LoginState::Rejected(RejectReason::ConnectionLost);
        Ok(LoginStep::Finished)
    }

    fn pending_username(&self) -> Result<Username> {
        match &self.state {
            LoginState::HandshakeSent(username) => Ok(username.clone()),
            _ => Err(ChatError::InvalidState("server reply without a pending handshake")),
        }
    }
}

impl Default for LoginMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the handshake until a terminal state
///
/// Usernames are read from `input`; a closed input channel aborts. The
/// framer keeps any bytes that arrived after the reply, so it must be
/// reused for the rest of the session.
pub fn login<R, W>(
    framer: &mut LineFramer<R>,
    writer: &mut W,
    input: &Receiver<String>,
    observer: &dyn Observer,
) -> Result<LoginState>
where
    R: Read,
    W: Write,
{
    let mut machine = LoginMachine::new();
    observer.notify(Event::LoginPrompt);

    loop {
        let step = match input.recv() {
            Ok(line) => machine.submit(&line)?,
            Err(_) => {
                tracing::debug!("Input closed during login");
                machine.submit(QUIT_INPUT)?
            }
        };

        let step = match step {
            LoginStep::SendHandshake(username) => match write_handshake(writer, &username) {
                Ok(()) => await_reply(&mut machine, framer)?,
                Err(e) => {
                    tracing::warn!("Failed to send handshake: {}", e);
                    machine.on_connection_lost()?
                }
            },
            step => step,
        };

        match step {
            LoginStep::Retry(event) => {
                observer.notify(event);
                observer.notify(Event::LoginPrompt);
            }
            LoginStep::Finished => break,
            LoginStep::SendHandshake(_) => {
                return Err(ChatError::InvalidState("handshake requested twice"));
            }
        }
    }

    let state = machine.state().clone();
    observer.notify(match &state {
        LoginState::LoggedIn(username) => Event::LoggedIn {
            username: username.clone(),
        },
        LoginState::Rejected(reason) => Event::LoginRejected { reason: *reason },
        _ => Event::LoginAborted,
    });

    tracing::debug!("Login finished: {:?}", state);
    Ok(state)
}

/// Wait for the single reply line to a handshake
fn await_reply<R: Read>(machine: &mut LoginMachine, framer: &mut LineFramer<R>) -> Result<LoginStep> {
    match framer.next_line() {
        Ok(Some(line)) => {
            tracing::trace!("Handshake reply: {}", line);
            match decode_line(&line) {
                Ok(message) => machine.on_message(message),
                Err(e) => {
                    tracing::warn!("Undecodable handshake reply: {}", e);
                    let header = line.split_whitespace().next().unwrap_or_default();
                    machine.on_malformed(header)
                }
            }
        }
        Ok(None) => {
            tracing::debug!("Server closed the connection during login");
            machine.on_connection_lost()
        }
        Err(e) => {
            tracing::warn!("Read failed during login: {}", e);
            machine.on_connection_lost()
        }
    }
}
