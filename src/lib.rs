//! # streamchat - streaming chat completions client
//!
//! Sends a chat message list to a hosted chat-completions endpoint with
//! streaming enabled and writes the reply to the console as it arrives.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental decoding that survives characters and lines split across
//!   network chunks
//! - Explicit model and transport options instead of baked-in constants
//! - Pluggable output through the [`ChatSink`] trait
//!
//! ## Architecture
//!
//! - **`decode`**: stateful UTF-8 decoding and line buffering
//! - **`sse`**: byte stream to `data: ` lines
//! - **`stream`**: lines to [`StreamEvent`]s, stopping at the completion marker
//! - **`client`** / **`chat`**: the [`StreamingClient`] trait and its HTTP implementation
//!
//! ## Example
//! ```no_run
//! use nonempty::nonempty;
//! use streamchat::chat::ChatClient;
//! use streamchat::client::StreamingClient;
//! use streamchat::model::ChatMessage;
//! use streamchat::options::{ModelOptions, SecretString, TransportOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChatClient::new(
//!         ModelOptions::default(),
//!         TransportOptions::new(SecretString::new("your-api-key".to_string())),
//!     );
//!
//!     let messages = nonempty![
//!         ChatMessage::system("You are a helpful assistant."),
//!         ChatMessage::user("Hello, please introduce yourself.")
//!     ];
//!
//!     // Writes the reply to stdout; failures are logged, not returned.
//!     let outcome = client.chat(messages).await;
//!     println!("\n{:?}", outcome.finish);
//! }
//! ```

pub mod chat;
pub mod client;
pub mod decode;
pub mod http;
pub mod model;
pub mod options;
pub mod sink;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use chat::ChatClient;
pub use client::{ChatOutcome, ClientError, Finish, StreamingClient};
pub use model::{ChatMessage, ChatRequest, Conversation, Role, StreamEvent};
pub use sink::{ChatSink, ConsoleSink};
