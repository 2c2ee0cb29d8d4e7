//! Lazy command output with a sliding-window prompt detector.
//!
//! A `BytesMut` window of `search_depth` bytes is kept for prompt detection,
//! so a prompt split across two reads is still recognized while memory stays
//! bounded by the window, not by the output size.

use std::time::Instant;

use bytes::{Buf, BytesMut};
use futures_core::Stream;
use log::{debug, trace, warn};
use regex::bytes::Regex;

use super::expect::ExpectEngine;
use super::output::{Completion, Output};
use crate::error::Result;
use crate::transport::ByteStream;

/// Finite, non-restartable stream of output chunks for one command.
///
/// Created by [`ExpectEngine::execute`]. Call [`next_chunk`](Self::next_chunk)
/// until it returns `None`, then check [`completion`](Self::completion):
/// running out of idle budget ends the stream without an error, and that is
/// reported as [`Completion::TimedOut`] rather than [`Completion::Completed`].
///
/// # Example
///
/// ```rust,no_run
/// # async fn example(session: &mut shelfwalk::Session) -> Result<(), shelfwalk::Error> {
/// let mut stream = session.execute("show general detail").await?;
/// while let Some(chunk) = stream.next_chunk().await? {
///     print!("{}", chunk);
/// }
/// println!("\n{:?}", stream.completion());
/// # Ok(())
/// # }
/// ```
pub struct OutputStream<'a, S: ByteStream> {
    engine: &'a mut ExpectEngine<S>,
    command: String,
    prompt: Regex,
    window: BytesMut,
    search_depth: usize,
    retries: u32,
    max_retries: u32,
    completion: Completion,
    start: Instant,
}

impl<'a, S: ByteStream> OutputStream<'a, S> {
    /// The command should already have been sent.
    pub(crate) fn new(engine: &'a mut ExpectEngine<S>, command: String, prompt: Regex) -> Self {
        let search_depth = engine.config().search_depth;
        let max_retries = engine.config().max_retries();
        Self {
            engine,
            command,
            prompt,
            window: BytesMut::with_capacity(search_depth * 2),
            search_depth,
            retries: 0,
            max_retries,
            completion: Completion::Running,
            start: Instant::now(),
        }
    }

    /// Get the next chunk of output, or `None` once the stream has ended.
    ///
    /// The chunk whose tail matches the prompt is yielded (prompt included)
    /// and is the last one.
    pub async fn next_chunk(&mut self) -> Result<Option<String>> {
        while self.completion == Completion::Running {
            let data = match self.engine.receive_available() {
                Ok(data) => data,
                Err(e) => {
                    self.completion = Completion::Failed;
                    return Err(e);
                }
            };

            if data.is_empty() {
                tokio::time::sleep(self.engine.config().poll_interval).await;
                self.retries += 1;
                if self.retries >= self.max_retries {
                    debug!(
                        "{:?}: no data for {} polls, ending output",
                        self.command, self.retries
                    );
                    self.completion = Completion::TimedOut;
                }
                continue;
            }
            self.retries = 0;

            self.window.extend_from_slice(data.as_bytes());
            if self.prompt.is_match(&self.window) {
                self.completion = Completion::Completed;
            } else if self.window.len() > self.search_depth {
                // O(1) pointer bump
                let excess = self.window.len() - self.search_depth;
                self.window.advance(excess);
            }

            trace!(
                "stream chunk: {} bytes, window: {} bytes",
                data.len(),
                self.window.len()
            );
            return Ok(Some(data));
        }
        Ok(None)
    }

    /// How the stream ended, or `Running` while chunks may still arrive.
    pub fn completion(&self) -> Completion {
        self.completion
    }

    /// The command that was sent.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Drain the remaining chunks into an [`Output`].
    pub async fn collect(mut self) -> Result<Output> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            chunks.push(chunk);
        }

        let elapsed = self.start.elapsed();
        debug!(
            "{:?}: {} chunk(s) in {:?}, {:?}",
            self.command,
            chunks.len(),
            elapsed,
            self.completion
        );

        Ok(Output {
            command: std::mem::take(&mut self.command),
            text: chunks.concat(),
            chunks,
            completion: self.completion,
            elapsed,
        })
    }

    /// Adapt into a [`futures_core::Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> + 'a
    where
        S: 'a,
    {
        futures_util::stream::unfold(self, |mut stream| async move {
            match stream.next_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), stream)),
                Ok(None) => None,
                Err(e) => Some((Err(e), stream)),
            }
        })
    }
}

impl<S: ByteStream> Drop for OutputStream<'_, S> {
    fn drop(&mut self) {
        if self.completion == Completion::Running {
            warn!(
                "Output stream for {:?} dropped before the prompt was detected",
                self.command
            );
        }
    }
}
