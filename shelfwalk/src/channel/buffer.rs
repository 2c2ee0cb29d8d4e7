//! Pattern buffer with tail search, and the terminal-output filter that
//! feeds it.
//!
//! Only the last `search_depth` bytes are searched for prompts, so a long
//! command output does not make every poll proportionally slower.

use vte::{Parser, Perform};

use super::patterns::PromptPattern;

/// Buffer for accumulating output and searching its tail for patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append already-filtered text.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Search only the tail of the buffer and return the matched text.
    pub fn search_tail(&self, pattern: &PromptPattern) -> Option<String> {
        pattern.find_text(self.tail())
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &PromptPattern) -> bool {
        pattern.is_match(self.tail())
    }

    fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Decodes raw terminal bytes into text.
///
/// With stripping enabled a VT parser drops escape sequences (colors, cursor
/// movement) and keeps only printable text plus `\r`, `\n` and `\t`. The
/// parser is stateful, so sequences and UTF-8 characters split across reads
/// are handled.
pub struct TerminalFilter {
    parser: Option<Parser>,
}

impl TerminalFilter {
    /// Create a filter; `strip_ansi = false` decodes bytes verbatim.
    pub fn new(strip_ansi: bool) -> Self {
        Self {
            parser: strip_ansi.then(Parser::new),
        }
    }

    /// Decode one chunk of received bytes.
    pub fn feed(&mut self, data: &[u8]) -> String {
        match self.parser.as_mut() {
            Some(parser) => {
                let mut text = TextCollector::default();
                parser.advance(&mut text, data);
                text.out
            }
            None => String::from_utf8_lossy(data).into_owned(),
        }
    }

    /// Forget any partially received sequence.
    pub fn reset(&mut self) {
        if self.parser.is_some() {
            self.parser = Some(Parser::new());
        }
    }
}

impl std::fmt::Debug for TerminalFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalFilter")
            .field("strip_ansi", &self.parser.is_some())
            .finish()
    }
}

#[derive(Default)]
struct TextCollector {
    out: String,
}

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        self.out.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte as char);
        }
    }
}
