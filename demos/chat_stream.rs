//! Streaming chat example.
//!
//! Run with:
//! ```bash
//! export CHAT_API_KEY="your-api-key"
//! # optional: export CHAT_API_URL="https://.../v1/chat/completions"
//! cargo run --example chat_stream
//! ```
//!
//! The reply goes to stdout; logs go to stderr (tune with `RUST_LOG`).

use nonempty::nonempty;
use streamchat::chat::ChatClient;
use streamchat::client::StreamingClient;
use streamchat::model::ChatMessage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = match ChatClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Error: {}", e);
            return;
        }
    };

    let messages = nonempty![
        ChatMessage::system("你是一个有帮助的AI助手。"),
        ChatMessage::user("你好,请介绍一下自己。")
    ];

    let outcome = client.chat(messages).await;
    println!();
    tracing::debug!(chars = outcome.reply.chars().count(), finish = ?outcome.finish, "Done");
}
