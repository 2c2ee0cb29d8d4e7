//! Transport layer: the byte-stream boundary and its SSH implementation.
//!
//! The expect engine only needs a [`ByteStream`]; [`SshConnector`] produces
//! one from an encrypted russh shell channel.

pub mod config;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;
mod stream;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::{SshConnector, SshStream, SshTransport};
pub use stream::{ByteStream, Connector};
