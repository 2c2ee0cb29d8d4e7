//! Scripted in-memory transport for tests.
//!
//! Every write pops the next queued reply and makes its chunks readable.
//! Writes, connects and closes are recorded in a shared [`MockLog`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::config::SshConfig;
use super::stream::{ByteStream, Connector};
use crate::error::{Result, TransportError};

#[derive(Debug, Default)]
struct LogInner {
    writes: Vec<String>,
    connects: usize,
    closes: usize,
}

/// Shared record of everything the code under test did to the transport.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockLog {
    inner: Arc<Mutex<LogInner>>,
}

impl MockLog {
    pub(crate) fn writes(&self) -> Vec<String> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.inner.lock().unwrap().connects
    }

    pub(crate) fn closes(&self) -> usize {
        self.inner.lock().unwrap().closes
    }

    pub(crate) fn clear_writes(&self) {
        self.inner.lock().unwrap().writes.clear();
    }
}

/// Script for one connection: chunks readable right after connect, then one
/// reply (possibly empty) per write.
#[derive(Debug, Clone, Default)]
pub(crate) struct Script {
    banner: Vec<String>,
    replies: VecDeque<Vec<String>>,
}

impl Script {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn banner(mut self, chunk: &str) -> Self {
        self.banner.push(chunk.to_string());
        self
    }

    /// Reply to the next write with `chunks`, all readable at once.
    pub(crate) fn reply(mut self, chunks: &[&str]) -> Self {
        self.replies
            .push_back(chunks.iter().map(|c| c.to_string()).collect());
        self
    }

    /// The next write produces no output.
    pub(crate) fn silent(self) -> Self {
        self.reply(&[])
    }
}

/// A byte stream driven by a [`Script`].
#[derive(Debug)]
pub(crate) struct MockStream {
    pending: VecDeque<Vec<u8>>,
    replies: VecDeque<Vec<String>>,
    log: MockLog,
    closed: bool,
}

impl MockStream {
    pub(crate) fn new(script: Script, log: MockLog) -> Self {
        Self {
            pending: script.banner.into_iter().map(String::into_bytes).collect(),
            replies: script.replies,
            log,
            closed: false,
        }
    }

    /// Queue more replies on a live stream.
    pub(crate) fn push_script(&mut self, script: Script) {
        self.pending
            .extend(script.banner.into_iter().map(String::into_bytes));
        self.replies.extend(script.replies);
    }
}

impl ByteStream for MockStream {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TransportError::Disconnected.into());
        }
        let text = String::from_utf8_lossy(data);
        let line = text.strip_suffix('\n').unwrap_or(&text).to_string();
        self.log.inner.lock().unwrap().writes.push(line);

        if let Some(chunks) = self.replies.pop_front() {
            self.pending
                .extend(chunks.into_iter().map(String::into_bytes));
        }
        Ok(())
    }

    fn has_data_ready(&mut self) -> bool {
        !self.closed && !self.pending.is_empty()
    }

    fn read_chunk(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        if self.closed {
            return Err(TransportError::Disconnected.into());
        }
        let Some(mut chunk) = self.pending.pop_front() else {
            return Ok(Vec::new());
        };
        if chunk.len() > max_bytes {
            let rest = chunk.split_off(max_bytes);
            self.pending.push_front(rest);
        }
        Ok(chunk)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.log.inner.lock().unwrap().closes += 1;
        }
        Ok(())
    }
}

/// Connector handing out [`MockStream`]s, one script per connect.
#[derive(Debug, Default)]
pub(crate) struct MockConnector {
    scripts: Mutex<VecDeque<Script>>,
    log: MockLog,
}

impl MockConnector {
    pub(crate) fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            log: MockLog::default(),
        }
    }

    pub(crate) fn log(&self) -> MockLog {
        self.log.clone()
    }
}

impl Connector for MockConnector {
    type Stream = MockStream;

    async fn connect(&self, _config: &SshConfig) -> Result<MockStream> {
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        self.log.inner.lock().unwrap().connects += 1;
        Ok(MockStream::new(script, self.log.clone()))
    }
}
