//! Codec Tests
//!
//! Tests for server line decoding and client request encoding.

use std::io::{self, Write};

use linechat::protocol::{
    decode_line, encode_command, encode_handshake, send_all, write_command, OutboundCommand,
    ProtocolMessage, Username,
};
use linechat::ChatError;

// =============================================================================
// Helper Functions
// =============================================================================

fn users(names: &[&str]) -> ProtocolMessage {
    ProtocolMessage::ListOk {
        users: names.iter().map(|n| n.to_string()).collect(),
    }
}

/// Writer that accepts at most `limit` bytes per call
struct ShortWriter {
    written: Vec<u8>,
    limit: usize,
    calls: usize,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        let n = buf.len().min(self.limit);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that accepts some bytes, then nothing
struct StallingWriter {
    remaining: usize,
}

impl Write for StallingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Handshake Reply Decoding Tests
// =============================================================================

#[test]
fn test_decode_hello() {
    assert_eq!(decode_line("HELLO").unwrap(), ProtocolMessage::Hello);
}

#[test]
fn test_decode_hello_with_echoed_name() {
    assert_eq!(decode_line("HELLO alice").unwrap(), ProtocolMessage::Hello);
}

#[test]
fn test_decode_hello_from_is_not_hello() {
    assert_eq!(
        decode_line("HELLO-FROM alice").unwrap(),
        ProtocolMessage::Unknown {
            header: "HELLO-FROM".to_string()
        }
    );
}

#[test]
fn test_decode_handshake_refusals() {
    assert_eq!(decode_line("IN-USE").unwrap(), ProtocolMessage::InUse);
    assert_eq!(decode_line("BUSY").unwrap(), ProtocolMessage::Busy);
    assert_eq!(decode_line("BAD-RQST-HDR").unwrap(), ProtocolMessage::BadRequestHeader);
    assert_eq!(decode_line("BAD-RQST-BODY").unwrap(), ProtocolMessage::BadRequestBody);
}

// =============================================================================
// LIST-OK Decoding Tests
// =============================================================================

#[test]
fn test_decode_list_ok_empty() {
    assert_eq!(decode_line("LIST-OK").unwrap(), users(&[]));
}

#[test]
fn test_decode_list_ok_single_token() {
    assert_eq!(decode_line("LIST-OK alice,bob,carol").unwrap(), users(&["alice", "bob", "carol"]));
}

#[test]
fn test_decode_list_ok_mixed_tokens() {
    assert_eq!(decode_line("LIST-OK alice,bob carol").unwrap(), users(&["alice", "bob", "carol"]));
}

#[test]
fn test_decode_list_ok_separate_tokens() {
    assert_eq!(decode_line("LIST-OK alice bob").unwrap(), users(&["alice", "bob"]));
}

#[test]
fn test_decode_list_ok_drops_empty_fragments() {
    assert_eq!(decode_line("LIST-OK ,alice,,bob, ,").unwrap(), users(&["alice", "bob"]));
}

#[test]
fn test_decode_list_ok_keeps_server_order() {
    assert_eq!(decode_line("LIST-OK zed,amy mia").unwrap(), users(&["zed", "amy", "mia"]));
}

// =============================================================================
// DELIVERY Decoding Tests
// =============================================================================

#[test]
fn test_decode_delivery() {
    assert_eq!(
        decode_line("DELIVERY carol hey").unwrap(),
        ProtocolMessage::Delivery {
            sender: "carol".to_string(),
            body: "hey".to_string()
        }
    );
}

#[test]
fn test_decode_delivery_keeps_body_spacing() {
    assert_eq!(
        decode_line("DELIVERY bob hi  there,   friend!").unwrap(),
        ProtocolMessage::Delivery {
            sender: "bob".to_string(),
            body: "hi  there,   friend!".to_string()
        }
    );
}

#[test]
fn test_decode_delivery_without_body_is_malformed() {
    let result = decode_line("DELIVERY bob");
    assert!(matches!(result, Err(ChatError::MalformedMessage(_))));
}

#[test]
fn test_decode_delivery_without_arguments_is_malformed() {
    assert!(matches!(decode_line("DELIVERY"), Err(ChatError::MalformedMessage(_))));
    assert!(matches!(decode_line("DELIVERY    "), Err(ChatError::MalformedMessage(_))));
}

#[test]
fn test_relayed_send_reconstructs_destination_and_body() {
    let cases = [("bob", "hi there"), ("carol", "a,b;c  d!"), ("x", "é ü")];

    for (dest, body) in cases {
        let wire = encode_command(&OutboundCommand::SendMessage {
            dest: dest.to_string(),
            body: body.to_string(),
        });
        let wire = String::from_utf8(wire).unwrap();
        let relayed = wire.trim_end_matches('\n').replacen("SEND", "DELIVERY", 1);

        assert_eq!(
            decode_line(&relayed).unwrap(),
            ProtocolMessage::Delivery {
                sender: dest.to_string(),
                body: body.to_string()
            }
        );
    }
}

// =============================================================================
// Other Message Decoding Tests
// =============================================================================

#[test]
fn test_decode_send_acknowledgements() {
    assert_eq!(decode_line("SEND-OK").unwrap(), ProtocolMessage::SendOk);
    assert_eq!(decode_line("BAD-DEST-USER").unwrap(), ProtocolMessage::BadDestUser);
}

#[test]
fn test_decode_unknown_header() {
    let message = decode_line("WHATEVER 1 2 3").unwrap();
    assert_eq!(
        message,
        ProtocolMessage::Unknown {
            header: "WHATEVER".to_string()
        }
    );
    assert_eq!(message.header(), "WHATEVER");
}

#[test]
fn test_decode_is_case_sensitive() {
    assert!(matches!(decode_line("hello").unwrap(), ProtocolMessage::Unknown { .. }));
}

#[test]
fn test_decode_leading_whitespace() {
    assert_eq!(decode_line("  SEND-OK").unwrap(), ProtocolMessage::SendOk);
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_quit() {
    assert_eq!(encode_command(&OutboundCommand::Quit), b"QUIT\n");
}

#[test]
fn test_encode_list_request() {
    assert_eq!(encode_command(&OutboundCommand::ListRequest), b"LIST\n");
}

#[test]
fn test_encode_send_message() {
    let command = OutboundCommand::SendMessage {
        dest: "bob".to_string(),
        body: "hi there".to_string(),
    };
    assert_eq!(encode_command(&command), b"SEND bob hi there\n");
}

#[test]
fn test_encode_handshake() {
    let username = Username::parse("alice").unwrap();
    assert_eq!(encode_handshake(&username), b"HELLO-FROM alice\n");
}

// =============================================================================
// Partial Send Tests
// =============================================================================

#[test]
fn test_send_all_retries_short_writes() {
    let mut writer = ShortWriter {
        written: Vec::new(),
        limit: 3,
        calls: 0,
    };

    send_all(&mut writer, b"SEND bob hi there\n").unwrap();

    assert_eq!(writer.written, b"SEND bob hi there\n");
    assert_eq!(writer.calls, 6);
}

#[test]
fn test_send_all_zero_byte_write_is_fatal() {
    let mut writer = StallingWriter { remaining: 4 };

    let result = send_all(&mut writer, b"LIST\nQUIT\n");
    assert!(matches!(result, Err(ChatError::ConnectionClosed)));
}

#[test]
fn test_send_all_propagates_io_errors() {
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let result = write_command(&mut BrokenPipe, &OutboundCommand::Quit);
    assert!(matches!(result, Err(ChatError::Io(ref e)) if e.kind() == io::ErrorKind::BrokenPipe));
}

#[test]
fn test_write_command_to_vec() {
    let mut out = Vec::new();
    write_command(&mut out, &OutboundCommand::ListRequest).unwrap();
    write_command(&mut out, &OutboundCommand::Quit).unwrap();
    assert_eq!(out, b"LIST\nQUIT\n");
}
