//! Platform definitions for the 1830 PSS shells.
//!
//! A session flavor is described by a [`PromptCatalog`] (which patterns it
//! recognizes and which commands frame its lifetime) and by the in-band
//! [`Challenge`]s its [`SessionKind`] must answer. Root prompts additionally
//! carry a [`ControllerIdentity`].

mod catalog;
mod challenge;
mod identity;
pub mod vendors;

pub use catalog::{PromptCatalog, PromptKind};
pub use challenge::{Answer, CONFIRMATION_ANSWER, Challenge, SessionKind};
pub use identity::{ControllerIdentity, ControllerScheme, Role};
