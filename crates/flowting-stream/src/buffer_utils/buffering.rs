use std::collections::VecDeque;

use crate::error::{Result, StreamError};

/// Byte buffer that hands out complete `\n`-terminated lines.
///
/// Bytes are kept undecoded until a newline arrives, so a multi-byte UTF-8
/// character split across two reads is reassembled before decoding.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
    // Bytes already known to contain no newline.
    scanned: usize,
}

impl LineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next line without its `\n` (and a trailing `\r`, if any).
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let offset = self
            .buffer
            .iter()
            .skip(self.scanned)
            .position(|&b| b == b'\n');

        let newline_pos = match offset {
            Some(offset) => self.scanned + offset,
            None => {
                self.scanned = self.buffer.len();
                return None;
            }
        };
        self.scanned = 0;

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        match String::from_utf8(line_bytes) {
            Ok(line) => Some(Ok(line)),
            Err(e) => Some(Err(StreamError::Decode(e.utf8_error().to_string()))),
        }
    }

    /// Drop whatever incomplete tail is left, returning its length.
    pub fn discard_tail(&mut self) -> usize {
        let len = self.buffer.len();
        self.buffer.clear();
        self.scanned = 0;
        len
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
