//! Collected command output.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How an output stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Still producing output.
    Running,

    /// The current prompt was seen at the tail of the output.
    Completed,

    /// No data arrived for the whole idle budget. The output may be partial.
    TimedOut,

    /// Reading failed with an error.
    Failed,
}

impl Completion {
    /// True once the stream will yield no more chunks.
    pub fn is_finished(self) -> bool {
        self != Completion::Running
    }
}

/// Output of one command, gathered from its stream.
#[derive(Debug, Clone)]
pub struct Output {
    /// The command that was executed.
    pub command: String,

    /// All chunks joined, including the trailing prompt.
    pub text: String,

    /// The chunks as they were received.
    pub chunks: Vec<String>,

    /// How the stream ended.
    pub completion: Completion,

    /// Time taken to execute the command.
    pub elapsed: Duration,
}

impl Output {
    /// Whether the prompt came back, i.e. the output is known to be whole.
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Completed
    }

    /// The output without the echoed command and, when the prompt came
    /// back, without the trailing prompt line.
    pub fn result(&self) -> &str {
        let body = self
            .text
            .strip_prefix(self.command.as_str())
            .unwrap_or(&self.text)
            .trim_start_matches(['\r', '\n']);

        if !self.is_complete() {
            return body;
        }
        match body.rfind('\n') {
            Some(pos) => body[..pos].trim_end_matches('\r'),
            None => "",
        }
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Check if the result contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(text: &str, completion: Completion) -> Output {
        Output {
            command: "show version".to_string(),
            text: text.to_string(),
            chunks: vec![text.to_string()],
            completion,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_result_strips_echo_and_prompt() {
        let out = output(
            "show version\r\nSoftware: 23.6\r\nHardware: 1830\r\nNE-01# ",
            Completion::Completed,
        );
        assert_eq!(out.result(), "Software: 23.6\r\nHardware: 1830");
        assert!(out.is_complete());
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_result_keeps_tail_of_truncated_output() {
        let out = output("show version\r\nSoftware: 23", Completion::TimedOut);
        assert_eq!(out.result(), "Software: 23");
        assert!(!out.is_complete());
        assert!(out.contains("23"));
    }

    #[test]
    fn test_completion_is_finished() {
        assert!(!Completion::Running.is_finished());
        assert!(Completion::TimedOut.is_finished());
        assert_eq!(
            serde_json::to_string(&Completion::Completed).unwrap(),
            "\"Completed\""
        );
    }
}
