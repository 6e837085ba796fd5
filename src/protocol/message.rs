//! Inbound message definitions
//!
//! Represents lines received from the server.

/// Header tokens sent by the server
pub mod headers {
    pub const HELLO: &str = "HELLO";
    pub const IN_USE: &str = "IN-USE";
    pub const BUSY: &str = "BUSY";
    pub const BAD_REQUEST_HEADER: &str = "BAD-RQST-HDR";
    pub const BAD_REQUEST_BODY: &str = "BAD-RQST-BODY";
    pub const LIST_OK: &str = "LIST-OK";
    pub const DELIVERY: &str = "DELIVERY";
    pub const SEND_OK: &str = "SEND-OK";
    pub const BAD_DEST_USER: &str = "BAD-DEST-USER";
}

/// A decoded server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolMessage {
    /// Handshake accepted
    Hello,

    /// Requested username is taken
    InUse,

    /// Server has no room for another client
    Busy,

    /// Server could not parse the last request header
    BadRequestHeader,

    /// Server could not parse the last request body
    BadRequestBody,

    /// Online users, in server order
    ListOk { users: Vec<String> },

    /// Direct message from another user
    Delivery { sender: String, body: String },

    /// Last SEND was delivered
    SendOk,

    /// Last SEND named a user that is not online
    BadDestUser,

    /// Any header this client does not know
    Unknown { header: String },
}

impl ProtocolMessage {
    /// The header token this message was decoded from
    pub fn header(&self) -> &str {
        match self {
            ProtocolMessage::Hello => headers::HELLO,
            ProtocolMessage::InUse => headers::IN_USE,
            ProtocolMessage::Busy => headers::BUSY,
            ProtocolMessage::BadRequestHeader => headers::BAD_REQUEST_HEADER,
            ProtocolMessage::BadRequestBody => headers::BAD_REQUEST_BODY,
            ProtocolMessage::ListOk { .. } => headers::LIST_OK,
            ProtocolMessage::Delivery { .. } => headers::DELIVERY,
            ProtocolMessage::SendOk => headers::SEND_OK,
            ProtocolMessage::BadDestUser => headers::BAD_DEST_USER,
            ProtocolMessage::Unknown { header } => header,
        }
    }
}
