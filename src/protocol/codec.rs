//! Protocol codec
//!
//! Decoding of framed server lines and encoding of client requests.
//!
//! ## Wire Format
//!
//! Every message is one UTF-8 line terminated by `\n`. The first
//! whitespace-separated token is the header.
//!
//! ```text
//! ┌──────────┬─────┬──────────────────────────────┬────┐
//! │  Header  │ ' ' │     Arguments (optional)     │ \n │
//! └──────────┴─────┴──────────────────────────────┴────┘
//! ```

use std::io::{ErrorKind, Write};

use crate::error::{ChatError, Result};
use super::message::headers;
use super::{OutboundCommand, ProtocolMessage, Username};

// =============================================================================
// Inbound Decoding
// =============================================================================

/// Decode one framed line (without its `\n`)
///
/// Unrecognized headers decode to [`ProtocolMessage::Unknown`]. The only
/// failure is a DELIVERY without both a sender and a body.
pub fn decode_line(line: &str) -> Result<ProtocolMessage> {
    let (header, rest) = split_token(line);

    let message = match header {
        headers::HELLO => ProtocolMessage::Hello,
        headers::IN_USE => ProtocolMessage::InUse,
        headers::BUSY => ProtocolMessage::Busy,
        headers::BAD_REQUEST_HEADER => ProtocolMessage::BadRequestHeader,
        headers::BAD_REQUEST_BODY => ProtocolMessage::BadRequestBody,
        headers::SEND_OK => ProtocolMessage::SendOk,
        headers::BAD_DEST_USER => ProtocolMessage::BadDestUser,
        headers::LIST_OK => ProtocolMessage::ListOk {
            users: decode_user_list(rest),
        },
        headers::DELIVERY => decode_delivery(rest)?,
        other => ProtocolMessage::Unknown {
            header: other.to_string(),
        },
    };

    Ok(message)
}

/// Users may be packed in one comma-separated token or spread over several
fn decode_user_list(args: &str) -> Vec<String> {
    args.split_whitespace()
        .flat_map(|token| token.split(','))
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode DELIVERY arguments: sender token, then the rest of the line
fn decode_delivery(args: &str) -> Result<ProtocolMessage> {
    let (sender, body) = split_token(args);
    let body = body.trim();

    if sender.is_empty() || body.is_empty() {
        return Err(ChatError::MalformedMessage(format!(
            "{} requires a sender and a body, got {:?}",
            headers::DELIVERY,
            args.trim()
        )));
    }

    Ok(ProtocolMessage::Delivery {
        sender: sender.to_string(),
        body: body.to_string(),
    })
}

/// Split off the first whitespace-delimited token
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

// =============================================================================
// Outbound Encoding
// =============================================================================

/// Encode the login handshake
pub fn encode_handshake(username: &Username) -> Vec<u8> {
    format!("HELLO-FROM {}\n", username).into_bytes()
}

/// Encode a command to wire bytes
///
/// The SEND body is passed through as-is.
pub fn encode_command(command: &OutboundCommand) -> Vec<u8> {
    match command {
        OutboundCommand::Quit => b"QUIT\n".to_vec(),
        OutboundCommand::ListRequest => b"LIST\n".to_vec(),
        OutboundCommand::SendMessage { dest, body } => {
            format!("SEND {} {}\n", dest, body).into_bytes()
        }
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write every byte, retrying short writes
///
/// A write that accepts zero bytes means the peer is gone and fails with
/// [`ChatError::ConnectionClosed`].
pub fn send_all<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    let mut sent = 0;

    while sent < bytes.len() {
        match writer.write(&bytes[sent..]) {
            Ok(0) => return Err(ChatError::ConnectionClosed),
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    writer.flush()?;
    Ok(())
}

/// Encode and write a command
pub fn write_command<W: Write>(writer: &mut W, command: &OutboundCommand) -> Result<()> {
    let bytes = encode_command(command);
    tracing::trace!("Sending {:?}", command);
    send_all(writer, &bytes)
}

/// Encode and write the login handshake
pub fn write_handshake<W: Write>(writer: &mut W, username: &Username) -> Result<()> {
    tracing::trace!("Sending handshake for {}", username);
    send_all(writer, &encode_handshake(username))
}
