//! Session Module
//!
//! Protocol state above the wire: the login handshake and post-login
//! message dispatch, both reporting through [`Observer`] events.
//!
//! ## Flow
//! ```text
//! line ──► decode ──┬──► LoginMachine   (until LoggedIn / Rejected / Aborted)
//!                   └──► dispatch       (after LoggedIn)
//!                             │
//!                             ▼
//!                      Observer::notify(Event)
//! ```

mod event;
mod login;
mod dispatcher;

pub use event::{Event, Observer};
pub use login::{login, LoginMachine, LoginState, LoginStep, RejectReason};
pub use dispatcher::{dispatch, dispatch_decoded, UNKNOWN_DESTINATION};
