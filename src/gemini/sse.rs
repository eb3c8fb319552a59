//! Incremental Server-Sent Events framing for `alt=sse` responses.

use crate::error::{GenChatError, Result};

/// Splits a byte stream into SSE events and collects their `data:` payloads.
///
/// Bytes can arrive split at arbitrary points, including inside a multi-byte
/// character or in the middle of a multi-megabyte base64 line, so undecoded
/// input stays buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    scanned: usize,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns the payload of every event they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        loop {
            let newline = self.buffer[self.scanned..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.scanned + offset);

            let Some(end) = newline else {
                self.scanned = self.buffer.len();
                break;
            };

            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.scanned = 0;
            let line = std::str::from_utf8(&line)
                .map_err(|e| GenChatError::DecodeError(format!("stream is not valid UTF-8: {}", e)))?;
            if let Some(event) = self.process_line(line.trim_end_matches(&['\r', '\n'][..])) {
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Flushes a final event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Result<Option<String>> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.scanned = 0;
            let line = String::from_utf8(line)
                .map_err(|e| GenChatError::DecodeError(format!("stream is not valid UTF-8: {}", e)))?;
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Ok(Some(event));
            }
        }
        Ok(self.take_event())
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.take_event();
        }
        // comment
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }

    fn take_event(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let event = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(event)
    }
}
