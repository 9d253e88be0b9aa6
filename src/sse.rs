//! Server-Sent Events (SSE) line splitting.
//!
//! The chat endpoint streams newline-delimited events:
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//!
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//!
//! data: {"completed":true}
//! ```
//!
//! This module turns a chunked byte stream into a stream of raw lines. What a
//! line means is decided in [`crate::stream`].

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;
use crate::decode::DecodeBuffer;

/// Prefix marking an event payload line.
pub const DATA_PREFIX: &str = "data: ";

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use streamchat::sse::SSEResponseExt;
///
/// let response = client.post(url).send().await?;
/// let mut lines = Box::pin(response.sse());
/// while let Some(line) = lines.next().await {
///     println!("line: {}", line?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of raw lines.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_lines(self.bytes_stream())
    }
}

/// Split a chunked byte stream into lines.
///
/// Lines are yielded without their `\n`, in arrival order. When the byte
/// stream ends, a trailing unterminated line is yielded (trimmed) as the
/// last item. A transport error is yielded once as
/// [`ClientError::Stream`] and ends the line stream; buffered text is
/// discarded.
pub fn sse_lines<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send,
{
    stream::unfold(
        (Box::pin(byte_stream), DecodeBuffer::new(), false),
        |(mut byte_stream, mut buffer, mut stream_ended)| async move {
            loop {
                if let Some(line) = buffer.next_line() {
                    return Some((Ok(line), (byte_stream, buffer, stream_ended)));
                }

                if stream_ended {
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => buffer.push(&chunk),
                    Some(Err(e)) => {
                        let error = ClientError::Stream(e.to_string());
                        return Some((Err(error), (byte_stream, DecodeBuffer::new(), true)));
                    }
                    None => {
                        stream_ended = true;
                        if let Some(line) = buffer.finish() {
                            return Some((Ok(line), (byte_stream, buffer, stream_ended)));
                        }
                    }
                }
            }
        },
    )
}

/// Extract the payload of a `data: ` line.
///
/// Only the exact `data: ` prefix is recognised; other SSE fields such as
/// `event:` or `id:` yield `None`. The payload is trimmed.
///
/// # Example
/// ```
/// use streamchat::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"completed\":true}"), Some("{\"completed\":true}"));
/// assert_eq!(parse_sse_line("event: ping"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(|s| s.trim())
}
