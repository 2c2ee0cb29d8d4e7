//! Session flavors and the in-band login challenges they answer.

use secrecy::SecretString;

use super::catalog::{PromptCatalog, PromptKind};
use super::vendors::{pss_cli, pss_root};

/// Affirmative answer to the CLI acknowledgement question.
pub const CONFIRMATION_ANSWER: &str = "Y";

/// Which kind of shell a session talks to, and how it logs in.
#[derive(Debug)]
pub enum SessionKind {
    /// Root shell reached directly by the SSH login.
    Direct,

    /// CLI that asks for credentials after the SSH login.
    ChallengeResponse {
        username: String,
        password: SecretString,
    },
}

impl SessionKind {
    /// CLI flavor answering the challenges with these credentials.
    pub fn challenge_response(username: impl Into<String>, password: impl Into<String>) -> Self {
        SessionKind::ChallengeResponse {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Build the prompt catalog of this flavor.
    pub fn catalog(&self) -> Result<PromptCatalog, regex::Error> {
        match self {
            SessionKind::Direct => pss_root::catalog(),
            SessionKind::ChallengeResponse { .. } => pss_cli::catalog(),
        }
    }

    /// The challenges to answer, in order, right after the transport opens.
    pub fn challenges(&self) -> Vec<Challenge<'_>> {
        match self {
            SessionKind::Direct => vec![],
            SessionKind::ChallengeResponse { username, password } => vec![
                Challenge {
                    kind: PromptKind::LoginChallenge,
                    answer: Answer::Text(username),
                },
                Challenge {
                    kind: PromptKind::PasswordChallenge,
                    answer: Answer::Secret(password),
                },
                Challenge {
                    kind: PromptKind::ConfirmationChallenge,
                    answer: Answer::Text(CONFIRMATION_ANSWER),
                },
            ],
        }
    }
}

/// One expected challenge and the reply to send once it shows up.
#[derive(Debug)]
pub struct Challenge<'a> {
    pub kind: PromptKind,
    pub answer: Answer<'a>,
}

/// A challenge reply.
#[derive(Debug)]
pub enum Answer<'a> {
    /// Plain text, safe to log.
    Text(&'a str),
    /// A credential; never logged.
    Secret(&'a SecretString),
}
