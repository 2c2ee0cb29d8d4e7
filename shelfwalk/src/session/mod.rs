//! High-level sessions on network elements.
//!
//! The session layer provides the main API for opening shells, running
//! commands and closing them again. [`Session`] covers both the CLI and the
//! root shell; [`RootNavigator`](crate::topology::RootNavigator) adds nested
//! hops on top of a root session.

mod builder;
mod generic;

pub use builder::SessionBuilder;
pub use generic::Session;

use std::future::Future;

use crate::channel::Output;
use crate::error::Result;

/// Trait for anything that behaves like an interactive shell.
pub trait Shell: Send {
    /// Open the connection and log in.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Log out and close the connection. Safe to call repeatedly.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Output>> + Send;

    /// Send multiple commands sequentially.
    fn send_commands(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Output>>> + Send {
        async move {
            let mut outputs = Vec::with_capacity(commands.len());
            for cmd in commands {
                outputs.push(self.send_command(cmd).await?);
            }
            Ok(outputs)
        }
    }

    /// Check if the shell is connected.
    fn is_open(&self) -> bool;

    /// The current prompt, once acquired.
    fn prompt(&self) -> Option<&str>;
}
