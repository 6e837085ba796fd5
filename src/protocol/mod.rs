//! Protocol Module
//!
//! Defines the line-based wire protocol spoken with the chat server.
//!
//! ## Protocol Format
//!
//! UTF-8 text, one message per `\n`-terminated line, no length prefix.
//!
//! ### Client → Server
//! - `HELLO-FROM <username>` - login handshake
//! - `LIST`                  - presence request
//! - `SEND <dest> <body...>` - direct message
//! - `QUIT`                  - leave
//!
//! ### Server → Client
//! - `HELLO ...`                    - handshake accepted
//! - `IN-USE` / `BUSY`              - handshake refused
//! - `LIST-OK [user[,user...] ...]` - presence list
//! - `DELIVERY <sender> <body...>`  - direct message
//! - `SEND-OK` / `BAD-DEST-USER`    - send acknowledgement
//! - `BAD-RQST-HDR` / `BAD-RQST-BODY` - malformed request

mod command;
mod message;
mod codec;
mod framer;

pub use command::{
    parse_input, OutboundCommand, Username, QUIT_INPUT, RESERVED_CHARACTERS, WHO_INPUT,
};
pub use message::{headers, ProtocolMessage};
pub use codec::{
    decode_line, encode_command, encode_handshake, send_all, write_command, write_handshake,
};
pub use framer::{LineFramer, DEFAULT_CHUNK_SIZE};
