//! Network Module
//!
//! TCP connection handling and session coordination.
//!
//! ## Architecture
//! - One connection per login attempt
//! - Receive loop on a dedicated thread
//! - Send loop on the caller thread
//! - Close-once shared between both loops

mod connection;
mod coordinator;

pub use connection::{CloseReason, Connection, Duplex};
pub use coordinator::{establish, LoginOutcome, Session};
