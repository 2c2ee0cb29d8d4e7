//! Error types for shelfwalk.

use thiserror::Error;

/// Main error type for shelfwalk operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Topology navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

impl Error {
    /// True if the operation was attempted on a closed session.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::Session(SessionError::NotConnected))
    }

    /// True if an in-band login challenge never appeared.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Error::Session(SessionError::AuthenticationFailed { .. }))
    }

    /// True if no recognizable prompt was observed.
    pub fn is_prompt_not_acquired(&self) -> bool {
        matches!(self, Error::Session(SessionError::PromptNotAcquired { .. }))
    }

    /// True if a navigation hop could not complete.
    pub fn is_hop_failure(&self) -> bool {
        matches!(self, Error::Navigation(NavigationError::HopFailed { .. }))
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Channel layer errors (PTY operations, pattern compilation).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session layer errors (lifecycle, in-band authentication, prompts).
#[derive(Error, Debug)]
pub enum SessionError {
    /// I/O attempted before `open()` succeeded or after `close()`
    #[error("Not connected - call open() first")]
    NotConnected,

    /// An expected login challenge did not appear in time
    #[error("Authentication failed: expected '{challenge}' but it was not received")]
    AuthenticationFailed { challenge: String },

    /// No recognized prompt was observed
    #[error("Failed to get the prompt after {context}")]
    PromptNotAcquired { context: String },

    /// Invalid configuration in the session builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Topology navigation errors.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// A hop could not complete; the location is left unchanged
    #[error("Hop failed: {location}")]
    HopFailed { location: String },
}

impl NavigationError {
    pub(crate) fn hop(location: impl Into<String>) -> Self {
        NavigationError::HopFailed {
            location: location.into(),
        }
    }
}

/// Result type alias using shelfwalk's Error.
pub type Result<T, E = Error> = std::result::Result<T, E>;
