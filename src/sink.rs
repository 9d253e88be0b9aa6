//! Output and log channel for streamed replies.

use std::io::{self, Stdout, Write};
use tracing::{error, info};

use crate::client::ClientError;

/// Receives everything a streamed chat call produces.
///
/// Content goes to [`on_delta`](ChatSink::on_delta); completion notices and
/// errors default to the `tracing` log channel.
pub trait ChatSink: Send {
    /// Write one content fragment. A failure ends the call.
    fn on_delta(&mut self, text: &str) -> io::Result<()>;

    fn on_completed(&mut self, reason: &str) {
        info!(reason, "Stream completed");
    }

    fn on_error(&mut self, error: &ClientError) {
        match error {
            ClientError::Parse { line, message } => {
                error!(line = line.as_str(), "Error parsing JSON: {}", message)
            }
            ClientError::Stream(message) => error!("Stream error: {}", message),
            other => error!("Error: {}", other),
        }
    }
}

/// Writes fragments unbuffered to a writer (stdout by default) and logs
/// everything else.
#[derive(Debug)]
pub struct ConsoleSink<W = Stdout> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ChatSink for ConsoleSink<W> {
    fn on_delta(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}
