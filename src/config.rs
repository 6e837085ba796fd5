//! Configuration for linechat
//!
//! Centralized configuration with sensible defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::{ChatError, Result};

/// Main configuration for a chat client connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub server_addr: String,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block until data or close)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Size of a single socket read
    pub read_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Command Policy
    // -------------------------------------------------------------------------
    /// What to do with `@<own name> ...`
    pub self_message_policy: SelfMessagePolicy,
}

/// Handling of direct messages addressed to the logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfMessagePolicy {
    /// Refuse locally with a validation error
    Reject,

    /// Send it and let the server decide
    Forward,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:5378".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            read_chunk_size: 4096,
            self_message_policy: SelfMessagePolicy::Reject,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve `server_addr` to the first socket address it names
    pub fn resolve_server_addr(&self) -> Result<SocketAddr> {
        self.server_addr
            .to_socket_addrs()
            .map_err(|e| ChatError::Config(format!("cannot resolve {}: {}", self.server_addr, e)))?
            .next()
            .ok_or_else(|| ChatError::Config(format!("no address for {}", self.server_addr)))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address (host:port)
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the size of one socket read (minimum 1)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size.max(1);
        self
    }

    /// Set the self-message policy
    pub fn self_message_policy(mut self, policy: SelfMessagePolicy) -> Self {
        self.config.self_message_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
