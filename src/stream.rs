//! Streaming event classification.
//!
//! Each `data: ` line of the response is one JSON event. Two shapes matter:
//! `{"completed": <truthy>}` ends the response, and
//! `{"choices":[{"delta":{"content":"..."}}]}` carries a text fragment.
//! Anything else is tolerated and skipped.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use tracing::debug;

use crate::client::ClientError;
use crate::sse::{parse_sse_line, sse_lines};

pub use crate::model::StreamEvent;

/// Boxed stream of parsed events for one request.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// Classify a raw response line.
///
/// Returns `None` for lines without the `data: ` prefix, blank payloads and
/// JSON events that carry neither a completion marker nor content.
pub fn parse_event_line(line: &str) -> Option<StreamEvent> {
    parse_event_payload(parse_sse_line(line)?)
}

/// Classify the trimmed payload of a `data: ` line.
pub fn parse_event_payload(payload: &str) -> Option<StreamEvent> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) if payload.trim().is_empty() => return None,
        Err(e) => {
            return Some(StreamEvent::Malformed {
                line: payload.to_string(),
                error: e.to_string(),
            })
        }
    };

    if let Some(completed) = value.get("completed").filter(|v| is_truthy(v)) {
        return Some(StreamEvent::Completed {
            reason: completion_reason(completed),
        });
    }

    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| StreamEvent::ContentDelta {
            text: text.to_string(),
        })
}

/// Truthiness of a JSON value as the server's clients interpret it:
/// `null`, `false`, `0` and `""` are false, everything else is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn completion_reason(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a line stream into an event stream.
///
/// The stream ends right after a [`StreamEvent::Completed`] or an error;
/// lines still buffered at that point are never classified.
pub fn events<L>(lines: L) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send
where
    L: Stream<Item = Result<String, ClientError>> + Send + 'static,
{
    stream::unfold((Box::pin(lines), false), |(mut lines, finished)| async move {
        if finished {
            return None;
        }

        loop {
            match lines.next().await? {
                Ok(line) => {
                    if let Some(event) = parse_event_line(&line) {
                        let terminal = matches!(event, StreamEvent::Completed { .. });
                        if terminal {
                            debug!("completion marker received, closing event stream");
                        }
                        return Some((Ok(event), (lines, terminal)));
                    }
                }
                Err(e) => return Some((Err(e), (lines, true))),
            }
        }
    })
}

/// Decode a raw response body into events.
pub fn event_stream<S, E>(byte_stream: S) -> EventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(events(sse_lines(byte_stream)))
}
