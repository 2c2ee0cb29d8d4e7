//! Channel layer: the expect engine and everything it matches with.
//!
//! This module turns a chunked, unframed byte stream into command/response
//! semantics: prompt patterns, terminal-output filtering, tail search and
//! lazy command output.

mod buffer;
mod expect;
mod output;
mod patterns;
mod stream;

pub use buffer::{PatternBuffer, TerminalFilter};
pub use expect::{CTRL_C, ExpectConfig, ExpectEngine};
pub use output::{Completion, Output};
pub use patterns::{PromptPattern, literal_prompt_pattern};
pub use stream::OutputStream;
