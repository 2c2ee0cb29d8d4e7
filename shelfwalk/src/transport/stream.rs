//! The byte-stream boundary between the expect engine and the transport.

use std::future::Future;

use super::config::SshConfig;
use crate::error::Result;

/// A duplex, non-blocking byte channel to a remote shell.
///
/// Implementations deliver whatever the remote has produced so far; there is
/// no framing. Readiness checks must never block.
pub trait ByteStream: Send {
    /// Write every byte of `data` to the remote.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Whether at least one byte can be read without waiting.
    fn has_data_ready(&mut self) -> bool;

    /// Read up to `max_bytes` of already-received data.
    fn read_chunk(&mut self, max_bytes: usize) -> Result<Vec<u8>>;

    /// Tear the stream down. Further I/O fails.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens authenticated byte streams.
///
/// A session owns one connector and asks it for a fresh stream on every
/// `open()`.
pub trait Connector: Send + Sync {
    /// Stream type produced by this connector.
    type Stream: ByteStream;

    /// Connect, authenticate at the transport layer, and start a shell.
    fn connect(&self, config: &SshConfig) -> impl Future<Output = Result<Self::Stream>> + Send;
}
