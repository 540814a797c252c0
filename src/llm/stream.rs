//! Incremental decoder for `data:`-framed streaming completions.
//!
//! DESIGN
//! ======
//! Chunks arrive at arbitrary byte boundaries: a record, or even a UTF-8
//! sequence, may be split across two chunks. The decoder buffers bytes until
//! a full line is available and only then interprets it. Lines other than
//! `data:` (event names, ids, `:` comments, blank separators) are ignored.
//! `data: [DONE]` ends the stream; anything after it is discarded.

const DONE_SENTINEL: &str = "[DONE]";

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseRecord {
    /// Payload of a `data:` line (usually a JSON object).
    Data(String),
    /// The terminating sentinel.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every record completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(record) = self.decode_line(&line) {
                records.push(record);
                if self.finished {
                    self.buffer.clear();
                    break;
                }
            }
        }
        records
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseRecord> {
        if self.finished || self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseRecord> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);
        let payload = line.strip_prefix("data:")?.trim();
        if payload.is_empty() {
            return None;
        }
        if payload == DONE_SENTINEL {
            self.finished = true;
            return Some(SseRecord::Done);
        }
        Some(SseRecord::Data(payload.to_string()))
    }
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
