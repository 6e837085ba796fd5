//! Error types for linechat
//!
//! Provides a unified error type for protocol and connection operations,
//! plus the local validation errors that are reported to the user instead
//! of being sent to the server.

use thiserror::Error;

/// Result type alias using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type for linechat operations
#[derive(Debug, Error)]
pub enum ChatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer stopped accepting bytes, or the connection was already closed
    #[error("Connection closed")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a login name was refused locally
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,

    #[error("username must not start with '{0}'")]
    ReservedPrefix(char),

    #[error("username contains disallowed character '{0}'")]
    ReservedCharacter(char),
}

/// Why a line of local input was not turned into a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid format")]
    InvalidFormat,

    #[error("cannot message yourself")]
    SelfMessage,

    #[error("unrecognized command")]
    Unrecognized,
}
