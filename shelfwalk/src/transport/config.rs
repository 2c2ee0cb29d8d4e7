//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Whether the server's host key is checked against known_hosts.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Record unknown keys on first contact; refuse keys that changed.
    #[default]
    AcceptNew,

    /// Trust any key. Lab networks only.
    Disabled,
}

/// SSH connection configuration.
///
/// This is the "connection" half of a session: where to connect and which
/// identity to present. It is owned by exactly one session.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connection timeout.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Create a configuration with defaults for everything but the target.
    pub fn new(host: impl Into<String>, username: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The password, if password authentication is configured.
    pub fn password(&self) -> Option<&SecretString> {
        match &self.auth {
            AuthMethod::Password(password) => Some(password),
            _ => None,
        }
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}
