//! Dispatcher
//!
//! Maps post-login server messages to user-visible events. Performs no I/O.

use crate::error::ChatError;
use crate::protocol::ProtocolMessage;

use super::Event;

/// Reason reported when the server refuses a SEND destination
pub const UNKNOWN_DESTINATION: &str = "unknown destination";

/// Turn a decoded message into the event to show
pub fn dispatch(message: ProtocolMessage) -> Event {
    match message {
        ProtocolMessage::ListOk { users } => Event::Presence { users },
        ProtocolMessage::Delivery { sender, body } => Event::Delivery { sender, body },
        ProtocolMessage::SendOk => Event::SendConfirmed,
        ProtocolMessage::BadDestUser => Event::SendFailed {
            reason: UNKNOWN_DESTINATION.to_string(),
        },
        ProtocolMessage::BadRequestHeader => Event::ProtocolWarning {
            detail: "server rejected the request header".to_string(),
        },
        ProtocolMessage::BadRequestBody => Event::ProtocolWarning {
            detail: "server rejected the request body".to_string(),
        },
        ProtocolMessage::Unknown { header } => Event::ProtocolWarning {
            detail: format!("unrecognized message header {:?}", header),
        },
        // Handshake replies have no meaning once logged in
        unexpected @ (ProtocolMessage::Hello | ProtocolMessage::InUse | ProtocolMessage::Busy) => {
            Event::ProtocolWarning {
                detail: format!("unexpected {} after login", unexpected.header()),
            }
        }
    }
}

/// Turn the outcome of decoding a line into the event to show
///
/// Decode failures stay on the connection as warnings.
pub fn dispatch_decoded(decoded: Result<ProtocolMessage, ChatError>) -> Event {
    match decoded {
        Ok(message) => dispatch(message),
        Err(e) => Event::ProtocolWarning {
            detail: e.to_string(),
        },
    }
}
