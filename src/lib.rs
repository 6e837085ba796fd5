//! # linechat
//!
//! A client for a newline-delimited chat protocol over one TCP connection:
//! - Line framing over fragmented or merged reads
//! - Login handshake with retry on taken or refused names
//! - Direct messages and presence listing
//! - Receive and send loops with close-once shutdown
//!
//! ## Architecture Overview
//!
//! ```text
//!   stdin lines                                   socket bytes
//!        │                                              │
//! ┌──────▼───────┐                             ┌────────▼───────┐
//! │  Send Loop   │                             │  Receive Loop  │
//! │ parse_input  │                             │  LineFramer    │
//! │ encode       │                             │  decode_line   │
//! └──────┬───────┘                             │  dispatch      │
//!        │                                     └────────┬───────┘
//!        │            ┌──────────────────┐              │
//!        └──────────► │    Connection    │ ◄────────────┘
//!                     │  (close once)    │
//!                     └──────────────────┘
//!                                                       │
//!                                              Observer::notify(Event)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod session;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChatError, InputError, Result, UsernameError};
pub use config::{Config, SelfMessagePolicy};
pub use network::{establish, CloseReason, Connection, LoginOutcome, Session};
pub use session::{Event, Observer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linechat
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
