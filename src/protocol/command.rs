//! Command definitions
//!
//! Represents requests to the server and the local input that produces them.

use std::fmt;

use crate::config::SelfMessagePolicy;
use crate::error::{InputError, UsernameError};

/// Characters a username may not contain
pub const RESERVED_CHARACTERS: &str = " !@#$%^&*,";

/// Local command that ends the session
pub const QUIT_INPUT: &str = "!quit";

/// Local command that requests the presence list
pub const WHO_INPUT: &str = "!who";

/// A username accepted by the wire grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate a candidate name
    ///
    /// Non-empty, no leading `@` or `!`, none of [`RESERVED_CHARACTERS`].
    pub fn parse(candidate: &str) -> Result<Self, UsernameError> {
        let first = candidate.chars().next().ok_or(UsernameError::Empty)?;
        if first == '@' || first == '!' {
            return Err(UsernameError::ReservedPrefix(first));
        }
        if let Some(c) = candidate.chars().find(|c| RESERVED_CHARACTERS.contains(*c)) {
            return Err(UsernameError::ReservedCharacter(c));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A request to send to the server after login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Leave the server
    Quit,

    /// Ask for the online users
    ListRequest,

    /// Direct message; `dest` must not contain whitespace
    SendMessage { dest: String, body: String },
}

/// Classify one line of local input
///
/// Checked in order: `!quit`, `!who`, `@<dest> <body>`. Anything else is
/// rejected without touching the wire.
pub fn parse_input(
    line: &str,
    own_username: &Username,
    policy: SelfMessagePolicy,
) -> Result<OutboundCommand, InputError> {
    let line = line.trim();

    if line == QUIT_INPUT {
        return Ok(OutboundCommand::Quit);
    }
    if line == WHO_INPUT {
        return Ok(OutboundCommand::ListRequest);
    }

    let Some(rest) = line.strip_prefix('@') else {
        return Err(InputError::Unrecognized);
    };

    let (dest, body) = match rest.find(char::is_whitespace) {
        Some(split) => (&rest[..split], rest[split..].trim_start()),
        None => (rest, ""),
    };

    if dest.is_empty() || body.is_empty() {
        return Err(InputError::InvalidFormat);
    }
    if policy == SelfMessagePolicy::Reject && dest == own_username.as_str() {
        return Err(InputError::SelfMessage);
    }

    Ok(OutboundCommand::SendMessage {
        dest: dest.to_string(),
        body: body.to_string(),
    })
}
