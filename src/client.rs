//! Core client trait and error types.

use async_trait::async_trait;
use futures::StreamExt;
use nonempty::NonEmpty;
use thiserror::Error;

use crate::model::{ChatMessage, Conversation, StreamEvent};
use crate::sink::{ChatSink, ConsoleSink};
use crate::stream::EventStream;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failure before anything was sent: missing key, bad header, client or
    /// body construction.
    #[error("Request setup error: {0}")]
    RequestSetup(String),

    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Error parsing JSON: {message}")]
    Parse { line: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// How a streamed chat call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// The server sent its completion marker.
    Completed(String),
    /// The body ended without a completion marker.
    EndOfStream,
    /// The call failed; the error went to the sink.
    Failed,
}

/// Summary of a streamed chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Every content delta that reached the sink, concatenated.
    pub reply: String,
    pub finish: Finish,
}

impl ChatOutcome {
    fn failed(reply: String) -> Self {
        Self {
            reply,
            finish: Finish::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.finish, Finish::Completed(_))
    }
}

/// Streaming chat client.
///
/// Implementors only provide [`request_stream`](StreamingClient::request_stream);
/// the provided methods drive the resulting event stream into a sink and
/// never return an error to the caller.
///
/// # Example
/// ```rust,ignore
/// let client = ChatClient::from_env()?;
/// let messages = nonempty![ChatMessage::user("Hello!")];
///
/// let outcome = client.chat(messages).await;
/// println!("\n{:?}", outcome.finish);
/// ```
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Send the request and return the parsed event stream.
    ///
    /// Fails without retrying on setup errors, transport errors and non-2xx
    /// statuses.
    async fn request_stream(
        &self,
        messages: NonEmpty<ChatMessage>,
    ) -> Result<EventStream, ClientError>;

    /// Stream a reply into `sink`.
    ///
    /// Every error is reported through [`ChatSink::on_error`] and swallowed.
    /// Output already written stays written.
    async fn chat_with_sink<S>(&self, messages: NonEmpty<ChatMessage>, sink: &mut S) -> ChatOutcome
    where
        S: ChatSink,
    {
        match self.request_stream(messages).await {
            Ok(stream) => drive_events(stream, sink).await,
            Err(e) => {
                sink.on_error(&e);
                ChatOutcome::failed(String::new())
            }
        }
    }

    /// Stream a reply to standard output.
    async fn chat(&self, messages: NonEmpty<ChatMessage>) -> ChatOutcome {
        let mut sink = ConsoleSink::stdout();
        self.chat_with_sink(messages, &mut sink).await
    }

    /// Append `input` to the conversation, stream the reply, and record it.
    ///
    /// The assistant turn is recorded only if some content arrived.
    async fn converse<S>(
        &self,
        conversation: &mut Conversation,
        input: String,
        sink: &mut S,
    ) -> ChatOutcome
    where
        S: ChatSink,
    {
        let user = ChatMessage::user(input);
        let messages = conversation.messages_with(user.clone());
        conversation.push(user);

        let outcome = self.chat_with_sink(messages, sink).await;
        if !outcome.reply.is_empty() {
            conversation.push(ChatMessage::assistant(outcome.reply.clone()));
        }
        outcome
    }
}

/// Consume an event stream in arrival order, forwarding to `sink`.
pub async fn drive_events<S>(mut stream: EventStream, sink: &mut S) -> ChatOutcome
where
    S: ChatSink + ?Sized,
{
    let mut reply = String::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(StreamEvent::ContentDelta { text }) => {
                if let Err(e) = sink.on_delta(&text) {
                    sink.on_error(&ClientError::Output(e));
                    return ChatOutcome::failed(reply);
                }
                reply.push_str(&text);
            }
            Ok(StreamEvent::Completed { reason }) => {
                sink.on_completed(&reason);
                return ChatOutcome {
                    reply,
                    finish: Finish::Completed(reason),
                };
            }
            Ok(StreamEvent::Malformed { line, error }) => {
                sink.on_error(&ClientError::Parse {
                    line,
                    message: error,
                });
            }
            Err(e) => {
                sink.on_error(&e);
                return ChatOutcome::failed(reply);
            }
        }
    }

    ChatOutcome {
        reply,
        finish: Finish::EndOfStream,
    }
}
