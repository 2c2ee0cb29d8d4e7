//! The expect engine: command/response semantics over a raw byte stream.

use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::buffer::{PatternBuffer, TerminalFilter};
use super::patterns::PromptPattern;
use super::stream::OutputStream;
use crate::error::{Result, SessionError};
use crate::transport::ByteStream;

/// Interrupt byte (Ctrl+C) used to abort a stuck remote operation.
pub const CTRL_C: u8 = 0x03;

/// Timing and buffering knobs for the expect engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectConfig {
    /// How long a single wait may take before giving up.
    pub timeout: Duration,

    /// Sleep between polls when no data has arrived.
    pub poll_interval: Duration,

    /// Number of bytes from the end of the output searched for patterns.
    pub search_depth: usize,

    /// Maximum bytes taken from the stream per read.
    pub read_size: usize,

    /// Drop terminal escape sequences from received data.
    pub strip_ansi: bool,
}

impl ExpectConfig {
    /// Poll iterations that fit in the timeout, at least one.
    pub fn max_retries(&self) -> u32 {
        let poll = self.poll_interval.as_secs_f64();
        if poll <= 0.0 {
            return 1;
        }
        ((self.timeout.as_secs_f64() / poll) as u32).max(1)
    }
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            search_depth: 1000,
            read_size: 1024,
            strip_ansi: true,
        }
    }
}

/// Send/poll/match loop over a [`ByteStream`].
///
/// The engine holds the stream only while connected. Every operation takes
/// `&mut self`, so command/response cycles are strictly sequential.
#[derive(Debug)]
pub struct ExpectEngine<S> {
    stream: Option<S>,
    config: ExpectConfig,
    filter: TerminalFilter,
    buffer: PatternBuffer,
}

impl<S: ByteStream> ExpectEngine<S> {
    /// Create a disconnected engine.
    pub fn new(config: ExpectConfig) -> Self {
        Self {
            stream: None,
            filter: TerminalFilter::new(config.strip_ansi),
            buffer: PatternBuffer::new(config.search_depth),
            config,
        }
    }

    /// Bind an opened stream. Any previous stream is dropped.
    pub fn attach(&mut self, stream: S) {
        self.filter.reset();
        self.buffer.clear();
        self.stream = Some(stream);
    }

    /// Unbind the stream, leaving the engine disconnected.
    pub fn detach(&mut self) -> Option<S> {
        self.stream.take()
    }

    /// Whether a stream is bound.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// The bound stream, if any.
    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    /// The engine configuration.
    pub fn config(&self) -> &ExpectConfig {
        &self.config
    }

    /// Set the default wait timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub(crate) fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream
            .as_mut()
            .ok_or_else(|| SessionError::NotConnected.into())
    }

    /// Write `command` followed by a newline.
    pub async fn send(&mut self, command: &str) -> Result<()> {
        let stream = self.stream_mut()?;
        let mut line = Vec::with_capacity(command.len() + 1);
        line.extend_from_slice(command.as_bytes());
        line.push(b'\n');
        stream.write_all(&line).await?;
        debug!("sent: {:?}", command);
        Ok(())
    }

    /// Write a secret followed by a newline without logging it.
    pub async fn send_secret(&mut self, secret: &SecretString) -> Result<()> {
        let stream = self.stream_mut()?;
        let mut line = secret.expose_secret().as_bytes().to_vec();
        line.push(b'\n');
        stream.write_all(&line).await?;
        debug!("sent: <hidden>");
        Ok(())
    }

    /// Send the interrupt byte without waiting for any response.
    pub async fn cancel(&mut self) -> Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(&[CTRL_C]).await?;
        debug!("sent: <ctrl-c>");
        Ok(())
    }

    /// Drain every byte that is ready right now into one string.
    ///
    /// Returns an empty string when nothing is pending.
    pub fn receive_available(&mut self) -> Result<String> {
        let read_size = self.config.read_size;
        let stream = self
            .stream
            .as_mut()
            .ok_or(SessionError::NotConnected)?;

        let mut data = String::new();
        while stream.has_data_ready() {
            let chunk = stream.read_chunk(read_size)?;
            if chunk.is_empty() {
                break;
            }
            data.push_str(&self.filter.feed(&chunk));
        }
        if !data.is_empty() {
            trace!("received: {:?}", data);
        }
        Ok(data)
    }

    /// Wait for `pattern` using the configured timeout.
    ///
    /// Returns the matched text, or `None` if it never appeared. Absence of
    /// a match is not an error; callers decide whether it is fatal.
    pub async fn expect(&mut self, pattern: &PromptPattern) -> Result<Option<String>> {
        Ok(self
            .expect_any_within(&[pattern], self.config.timeout)
            .await?
            .map(|(_, text)| text))
    }

    /// Wait for `pattern` with an explicit timeout.
    pub async fn expect_within(
        &mut self,
        pattern: &PromptPattern,
        timeout: Duration,
    ) -> Result<Option<String>> {
        Ok(self
            .expect_any_within(&[pattern], timeout)
            .await?
            .map(|(_, text)| text))
    }

    /// Wait until any of `patterns` matches; reports the index of the first
    /// pattern (in argument order) that matched, and the matched text.
    pub async fn expect_any(
        &mut self,
        patterns: &[&PromptPattern],
    ) -> Result<Option<(usize, String)>> {
        self.expect_any_within(patterns, self.config.timeout).await
    }

    async fn expect_any_within(
        &mut self,
        patterns: &[&PromptPattern],
        timeout: Duration,
    ) -> Result<Option<(usize, String)>> {
        let labels: Vec<&str> = patterns.iter().map(|p| p.label()).collect();
        debug!("waiting for: {:?}", labels);

        let config = ExpectConfig {
            timeout,
            ..self.config.clone()
        };
        self.buffer.clear();

        for _ in 0..config.max_retries() {
            let data = self.receive_available()?;
            if data.is_empty() {
                tokio::time::sleep(config.poll_interval).await;
                continue;
            }

            self.buffer.extend(data.as_bytes());
            for (index, pattern) in patterns.iter().enumerate() {
                if let Some(text) = self.buffer.search_tail(pattern) {
                    debug!("received the expected {}", pattern.label());
                    self.buffer.clear();
                    return Ok(Some((index, text)));
                }
            }
        }

        debug!("gave up waiting for: {:?}", labels);
        self.buffer.clear();
        Ok(None)
    }

    /// Send `command` and return a lazy stream of its output.
    ///
    /// Output that was already pending before the command (for example a
    /// second prompt echoed by an earlier empty line) is discarded first.
    /// The stream ends once `prompt` matches the tail of the output, or
    /// silently after the idle budget is spent; see
    /// [`OutputStream::completion`].
    pub async fn execute(&mut self, command: &str, prompt: Regex) -> Result<OutputStream<'_, S>> {
        let stale = self.receive_available()?;
        if !stale.is_empty() {
            trace!("discarding {} stale bytes before {:?}", stale.len(), command);
        }

        self.send(command).await?;
        Ok(OutputStream::new(self, command.to_string(), prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockLog, MockStream, Script};

    fn fast_config() -> ExpectConfig {
        ExpectConfig {
            timeout: Duration::from_millis(20),
            poll_interval: Duration::from_millis(1),
            ..ExpectConfig::default()
        }
    }

    fn engine(script: Script) -> (ExpectEngine<MockStream>, MockLog) {
        let log = MockLog::default();
        let mut engine = ExpectEngine::new(fast_config());
        engine.attach(MockStream::new(script, log.clone()));
        (engine, log)
    }

    #[test]
    fn test_max_retries() {
        let mut config = ExpectConfig::default();
        assert_eq!(config.max_retries(), 120);
        config.timeout = Duration::from_millis(100);
        assert_eq!(config.max_retries(), 1);
        config.poll_interval = Duration::ZERO;
        assert_eq!(config.max_retries(), 1);
    }

    #[tokio::test]
    async fn test_send_appends_newline() {
        let (mut engine, log) = engine(Script::new());
        engine.send("show version").await.unwrap();
        engine.send("").await.unwrap();
        assert_eq!(log.writes(), vec!["show version", ""]);
    }

    #[tokio::test]
    async fn test_io_requires_connection() {
        let mut engine: ExpectEngine<MockStream> = ExpectEngine::new(fast_config());
        assert!(engine.send("ls").await.unwrap_err().is_not_connected());
        assert!(engine.receive_available().unwrap_err().is_not_connected());
        assert!(engine.cancel().await.unwrap_err().is_not_connected());
    }

    #[tokio::test]
    async fn test_receive_available_drains_everything() {
        let (mut engine, _) = engine(Script::new().banner("Wel").banner("come"));
        assert_eq!(engine.receive_available().unwrap(), "Welcome");
        assert_eq!(engine.receive_available().unwrap(), "");
    }

    #[tokio::test]
    async fn test_cancel_sends_single_interrupt_byte() {
        let (mut engine, log) = engine(Script::new());
        engine.cancel().await.unwrap();
        assert_eq!(log.writes(), vec!["\u{3}"]);
    }

    #[tokio::test]
    async fn test_expect_matches_across_chunks() {
        let script = Script::new().reply(&["EC1830-2-1 lo", "gin:"]);
        let (mut engine, _) = engine(script);
        engine.send("telnet 100.0.2.1").await.unwrap();

        let login = PromptPattern::new("login-challenge", "login:").unwrap();
        let matched = engine.expect(&login).await.unwrap();
        assert_eq!(matched.as_deref(), Some("login:"));
    }

    #[tokio::test]
    async fn test_expect_times_out_with_none() {
        let (mut engine, _) = engine(Script::new().banner("unrelated text"));
        let login = PromptPattern::new("login-challenge", "login:").unwrap();
        assert_eq!(engine.expect(&login).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expect_any_reports_which_pattern() {
        let (mut engine, _) = engine(Script::new().banner("\r\nroot@slot:~# "));
        let password = PromptPattern::new("password-challenge", "Password:").unwrap();
        let shell = PromptPattern::new("generic-shell-prompt", r"[^\r\n]*# $").unwrap();

        let (index, text) = engine
            .expect_any(&[&password, &shell])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(text, "root@slot:~# ");
    }
}
