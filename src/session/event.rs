//! Session events
//!
//! Everything the protocol engine has to tell the user, as data. The
//! presentation layer decides how to render it.

use crossbeam::channel::Sender;

use crate::error::{InputError, UsernameError};
use crate::network::CloseReason;
use crate::protocol::Username;

use super::login::RejectReason;

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------
    /// Waiting for a username
    LoginPrompt,

    /// Name refused locally, never sent
    InvalidUsername { username: String, error: UsernameError },

    /// Server reported the name as taken
    UsernameTaken { username: Username },

    /// Server refused the handshake for an unclear reason
    LoginDeclined { username: Username, header: String },

    LoggedIn { username: Username },

    LoginRejected { reason: RejectReason },

    LoginAborted,

    // -------------------------------------------------------------------------
    // Chat
    // -------------------------------------------------------------------------
    /// Presence list, in server order
    Presence { users: Vec<String> },

    Delivery { sender: String, body: String },

    SendConfirmed,

    SendFailed { reason: String },

    /// Server traffic that could not be acted on
    ProtocolWarning { detail: String },

    /// Local input rejected before reaching the wire
    InputRejected { input: String, error: InputError },

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    SessionClosed { reason: CloseReason },
}

/// Consumer of session events
///
/// Called from both the receive and the send loop.
pub trait Observer: Send + Sync {
    fn notify(&self, event: Event);
}

impl Observer for Sender<Event> {
    fn notify(&self, event: Event) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(event);
    }
}
