//! 1830 PSS controller root shell catalog.
//!
//! Root prompts carry the controller identity:
//!
//! ```text
//! root@EC1830-81-18-ACT:/root#         # EC1830 naming, shelf 81, controller 18, active
//! root@EC1830-81-1-STDBY:/root         # standby, prompt split over two lines
//! #
//! root@32EC2-2-1-ACT:~#                # 32EC2 naming
//! ```
//!
//! Nested hops (`telnet 100.0.<shelf>.<n>`) answer with `login:` and, on most
//! cards, `Password:`. Card operating systems vary, so their shells are only
//! recognized by a trailing `# `.

use crate::platform::{PromptCatalog, PromptKind};

/// Catalog name for the root flavor.
pub const CATALOG_NAME: &str = "pss_root";

const ROOT_PROMPT: &str = concat!(
    r"(?s)(root@EC1830-\d+-\d+-ACT:/root[\r\n]*# $)|",
    r"(root@32EC2-\d+-\d+-ACT:[~\r\n]*# $)|",
    r"(root@EC1830-\d+-\d+-STDBY:/root[\r\n]*# $)|",
    r"(root@32EC2-\d+-\d+-STDBY:[~\r\n]*# $)",
);

/// Create the root shell prompt catalog.
pub fn catalog() -> Result<PromptCatalog, regex::Error> {
    Ok(PromptCatalog::new(CATALOG_NAME, PromptKind::Root)
        .with_pattern(PromptKind::Root, ROOT_PROMPT)?
        .with_pattern(PromptKind::LoginChallenge, "login:")?
        .with_pattern(PromptKind::PasswordChallenge, "Password:")?
        .with_pattern(PromptKind::GenericShell, r"[^\r\n]*# $")?
        .with_logout("exit"))
}
