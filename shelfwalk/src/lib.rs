//! # Shelfwalk
//!
//! Async expect-style SSH automation for Nokia 1830 PSS network elements.
//!
//! Shelfwalk drives the element's interactive shells the way an operator
//! would: it sends a line, polls the channel, and waits for a known prompt
//! to come back. On top of that it can walk a multi-shelf element through
//! nested logins.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - CLI sessions with in-band username/password/acknowledge challenges
//! - Root shell sessions with prompt-encoded controller identity
//! - Lazy command output with explicit completed vs timed-out status
//! - Nested hops to slave shelves, cards and the standby controller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelfwalk::{SessionBuilder, Shell};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shelfwalk::Error> {
//!     let mut root = SessionBuilder::new("192.168.1.1")
//!         .username("root")
//!         .password("secret")
//!         .build_root()?;
//!
//!     root.open().await?;
//!     root.login_to_slot(81, 5).await?;
//!
//!     let output = root.send_command("uptime").await?;
//!     println!("{}", output.result());
//!
//!     root.logout_from_slot().await?;
//!     root.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod platform;
pub mod session;
pub mod topology;
pub mod transport;

// Re-export main types for convenience
pub use channel::{Completion, ExpectConfig, Output, OutputStream};
pub use error::{Error, Result};
pub use platform::{ControllerIdentity, PromptKind, Role, SessionKind};
pub use session::{Session, SessionBuilder, Shell};
pub use topology::{Location, RootNavigator};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
