//! Prompt and challenge patterns.

use std::fmt;

use regex::bytes::Regex;

/// A compiled regular expression plus a human label such as `"root-prompt"`
/// or `"password-challenge"`.
///
/// Patterns are immutable once built; the label is what shows up in logs
/// and in authentication errors.
#[derive(Clone)]
pub struct PromptPattern {
    label: &'static str,
    regex: Regex,
}

impl PromptPattern {
    /// Compile `pattern` under `label`.
    pub fn new(label: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label,
            regex: Regex::new(pattern)?,
        })
    }

    /// The human label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The underlying regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Find the first match in `data` and return its text.
    pub fn find_text(&self, data: &[u8]) -> Option<String> {
        self.regex
            .find(data)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
    }

    /// Check if the data matches the pattern.
    pub fn is_match(&self, data: &[u8]) -> bool {
        self.regex.is_match(data)
    }
}

impl fmt::Debug for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptPattern")
            .field("label", &self.label)
            .field("pattern", &self.regex.as_str())
            .finish()
    }
}

/// Build the completion matcher for a memoized prompt.
///
/// The prompt text is matched literally and must sit at the end of the
/// output, optionally followed by whitespace.
pub fn literal_prompt_pattern(prompt: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("{}\\s*$", regex::escape(prompt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_text_returns_match_only() {
        let pattern = PromptPattern::new("cli-prompt", r"(?s)\n[\w-]+# $").unwrap();
        assert_eq!(
            pattern.find_text(b"banner\r\nNE-01# ").as_deref(),
            Some("\nNE-01# ")
        );
        assert!(pattern.find_text(b"NE-01> ").is_none());
        assert_eq!(pattern.label(), "cli-prompt");
    }

    #[test]
    fn test_literal_prompt_is_escaped_and_anchored() {
        let matcher = literal_prompt_pattern("root@EC1830-81-18-ACT:/root#").unwrap();
        assert!(matcher.is_match(b"ls\r\nfoo\r\nroot@EC1830-81-18-ACT:/root# "));
        // Prompt text echoed mid-output is not completion
        assert!(!matcher.is_match(b"root@EC1830-81-18-ACT:/root# ls\r\nfoo\r\n"));
        // Regex metacharacters in the prompt are literal
        let matcher = literal_prompt_pattern("[NE.1]#").unwrap();
        assert!(matcher.is_match(b"[NE.1]# "));
        assert!(!matcher.is_match(b"N#"));
    }

    #[test]
    fn test_multiline_prompt_literal() {
        let matcher = literal_prompt_pattern("root@EC1830-2-1-ACT:/root\r\n#").unwrap();
        assert!(matcher.is_match(b"uptime\r\n 10:00 up\r\nroot@EC1830-2-1-ACT:/root\r\n# "));
    }
}
