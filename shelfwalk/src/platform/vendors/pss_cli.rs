//! 1830 PSS CLI catalog.
//!
//! The CLI is reached by logging in over SSH as the fixed `cli` account and
//! then answering three in-band challenges:
//!
//! ```text
//! Username: admin
//! Password:
//! Do you acknowledge? (Y/N)? Y
//! NE-01#
//! ```

use crate::platform::{PromptCatalog, PromptKind};

/// Catalog name for the CLI flavor.
pub const CATALOG_NAME: &str = "pss_cli";

/// SSH account (user and password) that fronts the CLI.
pub const CLI_ACCOUNT: &str = "cli";

/// Create the CLI prompt catalog.
pub fn catalog() -> Result<PromptCatalog, regex::Error> {
    Ok(PromptCatalog::new(CATALOG_NAME, PromptKind::Cli)
        .with_pattern(PromptKind::Cli, r"(?s)\n[\w-]+# $")?
        .with_pattern(PromptKind::LoginChallenge, r"(?s)\nUsername:")?
        .with_pattern(PromptKind::PasswordChallenge, r"(?s)\nPassword:")?
        .with_pattern(PromptKind::ConfirmationChallenge, r"(?s)\nDo you.*(Y/N)?")?
        .with_logout("logout")
        .with_on_open_command("paging status disable"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_prompt_match() {
        let catalog = catalog().unwrap();
        let prompt = catalog.prompt_pattern().unwrap();
        assert!(prompt.is_match(b"Some information\r\nNE-01# "));
        assert!(prompt.is_match(b"\nprompt# "));
        assert!(!prompt.is_match(b"\nprompt#"));
        assert!(!prompt.is_match(b"NE-01# "));
        assert!(!prompt.is_match(b"\nNE 01# "));
    }

    #[test]
    fn test_challenges_match() {
        let catalog = catalog().unwrap();
        let username = catalog.get(PromptKind::LoginChallenge).unwrap();
        let password = catalog.get(PromptKind::PasswordChallenge).unwrap();
        let confirm = catalog.get(PromptKind::ConfirmationChallenge).unwrap();

        assert!(username.is_match(b"Some welcome\r\nUsername:"));
        assert!(!username.is_match(b"Username:"));
        assert!(password.is_match(b"\r\nPassword: "));
        assert!(confirm.is_match(b"\r\nDo you acknowledge (Y/N)?"));
    }

    #[test]
    fn test_lifecycle_commands() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.logout_command, "logout");
        assert_eq!(catalog.on_open_commands, vec!["paging status disable"]);
    }
}
