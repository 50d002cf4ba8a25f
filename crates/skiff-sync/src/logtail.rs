//! Streaming and polling tail decoder for the daemon's structured log.
//!
//! The daemon serves `/api/log` as a growing stream of newline-delimited JSON
//! records. Chunks arrive at arbitrary boundaries, so the decoder accumulates
//! raw bytes and only decodes complete lines; a record split across reads is
//! reassembled, a multi-byte UTF-8 sequence split across reads survives
//! intact, and a line that fails to parse is dropped without aborting the
//! stream. When streaming is unavailable or ends, the tail degrades to
//! polling the same endpoint and decoding only the appended suffix.

use std::time::Duration;

use futures_util::StreamExt;
use skiff_api_models::LogRecord;

use crate::client::DaemonClient;
use crate::error::SyncResult;

/// Incremental line splitter and JSON decoder.
///
/// Lines end with `\n`, `\r\n`, or a bare `\r`. A trailing `\r` at the end of
/// the buffer is held back until the next read can tell whether it begins a
/// `\r\n` pair. The final unterminated segment is retained, never emitted.
#[derive(Debug, Default)]
pub struct TailDecoder {
    buf: Vec<u8>,
}

impl TailDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes received but not yet terminated by a newline.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Feed one chunk and decode every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<LogRecord> {
        self.buf.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut start = 0usize;
        loop {
            let Some(offset) = self.buf[start..]
                .iter()
                .position(|&byte| byte == b'\n' || byte == b'\r')
            else {
                break;
            };
            let pos = start + offset;
            let terminator = if self.buf[pos] == b'\r' {
                match self.buf.get(pos + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // Trailing carriage return: the next chunk decides
                    // whether this is a bare \r or half of \r\n.
                    None => break,
                }
            } else {
                1
            };
            if let Some(record) = decode_line(&self.buf[start..pos]) {
                records.push(record);
            }
            start = pos + terminator;
        }
        self.buf.drain(..start);
        records
    }

    /// Resolve a held-back trailing `\r` at end of stream.
    ///
    /// The unterminated remainder, if any, is discarded without being
    /// emitted.
    pub fn finish(mut self) -> Vec<LogRecord> {
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
            return decode_line(&self.buf).into_iter().collect();
        }
        Vec::new()
    }
}

fn decode_line(bytes: &[u8]) -> Option<LogRecord> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::trace!(error = %err, "dropping malformed log line");
            None
        }
    }
}

/// Polling-mode tail over a growing log blob.
///
/// Tracks the previously observed byte length and decodes only the appended
/// suffix. A response shorter than the last observed length means the server
/// truncated or rotated the log: the counter resets to zero and decoding
/// resumes from the top of the new content.
#[derive(Debug, Default)]
pub struct PollTail {
    last_len: usize,
    decoder: TailDecoder,
}

impl PollTail {
    /// Start polling from the beginning of the log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after a streaming phase that already consumed `offset` bytes,
    /// carrying over the stream decoder's unterminated tail.
    #[must_use]
    pub fn resume(offset: usize, decoder: TailDecoder) -> Self {
        Self {
            last_len: offset,
            decoder,
        }
    }

    /// Ingest one full snapshot of the log and decode the new suffix.
    pub fn ingest(&mut self, text: &str) -> Vec<LogRecord> {
        let bytes = text.as_bytes();
        if bytes.len() < self.last_len {
            // Rotation: the retained partial belongs to the old file.
            self.last_len = 0;
            self.decoder = TailDecoder::new();
        }
        let suffix = &bytes[self.last_len..];
        self.last_len = bytes.len();
        self.decoder.push(suffix)
    }
}

/// Tuning for the log tail driver.
#[derive(Debug, Clone)]
pub struct TailOptions {
    /// Delay between polls in fallback mode.
    pub poll_interval: Duration,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Consume a streaming log response until it ends or errors.
///
/// Returns the number of bytes consumed; a mid-stream transport error is
/// logged and treated as end of stream, not a failure.
pub async fn drain_stream<F>(
    response: reqwest::Response,
    decoder: &mut TailDecoder,
    mut on_record: F,
) -> usize
where
    F: FnMut(LogRecord),
{
    let mut stream = response.bytes_stream();
    let mut consumed = 0usize;
    while let Some(next) = stream.next().await {
        match next {
            Ok(chunk) => {
                consumed += chunk.len();
                for record in decoder.push(&chunk) {
                    on_record(record);
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "log stream interrupted");
                break;
            }
        }
    }
    consumed
}

/// Follow the daemon log indefinitely.
///
/// Prefers the streaming endpoint; when the stream is unavailable, ends, or
/// errors, switches to polling mode without losing or duplicating bytes.
pub async fn follow<F>(
    client: &DaemonClient,
    options: &TailOptions,
    mut on_record: F,
) -> SyncResult<()>
where
    F: FnMut(LogRecord),
{
    let mut tail = match client.open_log_stream().await {
        Ok(response) => {
            let mut decoder = TailDecoder::new();
            let consumed = drain_stream(response, &mut decoder, &mut on_record).await;
            tracing::debug!(consumed, "log stream ended, switching to polling");
            PollTail::resume(consumed, decoder)
        }
        Err(err) => {
            tracing::warn!(error = %err, "log stream unavailable, polling instead");
            PollTail::new()
        }
    };

    loop {
        tokio::time::sleep(options.poll_interval).await;
        match client.fetch_log_text().await {
            Ok(text) => {
                for record in tail.ingest(&text) {
                    on_record(record);
                }
            }
            Err(err) => tracing::debug!(error = %err, "log poll failed"),
        }
    }
}
