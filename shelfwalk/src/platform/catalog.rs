//! Per-flavor prompt catalogs.

use std::fmt;

use indexmap::IndexMap;

use crate::channel::PromptPattern;
use crate::error::{Result, SessionError};

/// The role a pattern plays in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// The CLI shell prompt.
    Cli,
    /// The controller root shell prompt; it encodes shelf, controller and role.
    Root,
    /// A username / login challenge.
    LoginChallenge,
    /// A password challenge.
    PasswordChallenge,
    /// A "do you acknowledge" style confirmation.
    ConfirmationChallenge,
    /// Any shell line ending in `# `, as reached by a nested hop.
    GenericShell,
}

impl PromptKind {
    /// Human label used in logs and errors.
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Cli => "cli-prompt",
            PromptKind::Root => "root-prompt",
            PromptKind::LoginChallenge => "login-challenge",
            PromptKind::PasswordChallenge => "password-challenge",
            PromptKind::ConfirmationChallenge => "confirmation-challenge",
            PromptKind::GenericShell => "generic-shell-prompt",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The compiled pattern set of one session flavor, plus the commands that
/// flavor runs around its lifecycle.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    /// Catalog name (e.g. "pss_cli", "pss_root").
    pub name: String,

    /// Which pattern terminates a response cycle.
    pub prompt: PromptKind,

    /// Patterns by kind, in definition order.
    pub patterns: IndexMap<PromptKind, PromptPattern>,

    /// Command sent before the transport is torn down.
    pub logout_command: String,

    /// Commands to run when the session is established.
    pub on_open_commands: Vec<String>,
}

impl PromptCatalog {
    /// Create an empty catalog whose session prompt is `prompt`.
    pub fn new(name: impl Into<String>, prompt: PromptKind) -> Self {
        Self {
            name: name.into(),
            prompt,
            patterns: IndexMap::new(),
            logout_command: "exit".to_string(),
            on_open_commands: vec![],
        }
    }

    /// Add (or replace) the pattern for `kind`.
    pub fn with_pattern(mut self, kind: PromptKind, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns
            .insert(kind, PromptPattern::new(kind.label(), pattern)?);
        Ok(self)
    }

    /// Set the logout command.
    pub fn with_logout(mut self, command: impl Into<String>) -> Self {
        self.logout_command = command.into();
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Get a pattern by kind.
    pub fn get(&self, kind: PromptKind) -> Option<&PromptPattern> {
        self.patterns.get(&kind)
    }

    /// Get a pattern by kind, failing if this flavor does not define it.
    pub fn pattern(&self, kind: PromptKind) -> Result<&PromptPattern> {
        self.get(kind).ok_or_else(|| {
            SessionError::InvalidConfig {
                message: format!("catalog '{}' has no {} pattern", self.name, kind),
            }
            .into()
        })
    }

    /// The session prompt pattern.
    pub fn prompt_pattern(&self) -> Result<&PromptPattern> {
        self.pattern(self.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let catalog = PromptCatalog::new("lab", PromptKind::GenericShell)
            .with_pattern(PromptKind::GenericShell, r"[^\r\n]*# $")
            .unwrap()
            .with_logout("logout")
            .with_on_open_command("stty -echo");

        assert_eq!(catalog.prompt_pattern().unwrap().label(), "generic-shell-prompt");
        assert_eq!(catalog.logout_command, "logout");
        assert_eq!(catalog.on_open_commands, vec!["stty -echo"]);
        assert!(catalog.get(PromptKind::Root).is_none());
        assert!(catalog.pattern(PromptKind::Root).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(
            PromptCatalog::new("bad", PromptKind::Cli)
                .with_pattern(PromptKind::Cli, "(")
                .is_err()
        );
    }
}
