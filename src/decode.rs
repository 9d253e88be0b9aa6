//! Incremental text decoding for chunked response bodies.
//!
//! Network chunks do not respect character or line boundaries. [`Utf8Decoder`]
//! carries an incomplete multi-byte sequence over to the next chunk, and
//! [`DecodeBuffer`] holds the partially received trailing line until its
//! newline arrives.

use std::char::REPLACEMENT_CHARACTER;

/// Stateful UTF-8 decoder.
///
/// Invalid sequences decode to U+FFFD. A sequence that is merely cut short
/// by the chunk boundary is held back until more bytes arrive or
/// [`finish`](Utf8Decoder::finish) is called.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus any held-back bytes) as possible.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        let held = loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break 0;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => break after.len(),
                    }
                }
            }
        };

        let consumed = self.pending.len() - held;
        self.pending.drain(..consumed);
        out
    }

    /// Flush held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Number of bytes waiting for the rest of their character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Line accumulator over a chunked byte stream.
///
/// Holds at most one incomplete trailing line. Every complete line is
/// removed, delimiter included, as soon as it is handed out.
#[derive(Debug, Default)]
pub struct DecodeBuffer {
    decoder: Utf8Decoder,
    buffer: String,
}

impl DecodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk and append it to the buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);
    }

    /// Take the first complete line, without its `\n`.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.find('\n')?;
        let line = self.buffer[..pos].to_string();
        self.buffer.drain(..=pos);
        Some(line)
    }

    /// Flush the decoder and take whatever remains as a final line.
    ///
    /// Returns `None` when the remainder is empty or whitespace only.
    pub fn finish(&mut self) -> Option<String> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);

        let rest = std::mem::take(&mut self.buffer);
        let line = rest.trim();
        (!line.is_empty()).then(|| line.to_string())
    }

    /// Text received but not yet handed out as a line.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
