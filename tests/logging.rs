//! Log channel output of the console sink, captured through a buffered
//! `tracing_subscriber::fmt` subscriber.

use std::io::Write;
use std::sync::{Arc, Mutex};

use nonempty::nonempty;
use streamchat::chat::ChatClient;
use streamchat::client::{Finish, StreamingClient};
use streamchat::model::ChatMessage;
use streamchat::options::{ModelOptions, TransportOptions};
use streamchat::sink::ConsoleSink;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Capture everything the crate logs at the demo's default level.
fn capture() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("streamchat=info"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(
        ModelOptions::default(),
        TransportOptions::new("test-key").with_endpoint(format!("{}/chat/completions", server.uri())),
    )
}

#[tokio::test]
async fn http_500_logs_exactly_one_line() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let (logs, _guard) = capture();
    let mut sink = ConsoleSink::new(Vec::new());
    let outcome = client_for(&server)
        .chat_with_sink(nonempty![ChatMessage::user("Hello")], &mut sink)
        .await;

    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "log lines: {:?}", lines);
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("HTTP error! status: 500"));
    assert!(sink.into_inner().is_empty());
    assert_eq!(outcome.finish, Finish::Failed);
}

#[tokio::test]
async fn blank_payloads_log_nothing() {
    let server = MockServer::start().await;

    let body = "data:    \ndata: \n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let (logs, _guard) = capture();
    let mut sink = ConsoleSink::new(Vec::new());
    let outcome = client_for(&server)
        .chat_with_sink(nonempty![ChatMessage::user("Hello")], &mut sink)
        .await;

    assert!(logs.lines().is_empty(), "log lines: {:?}", logs.lines());
    assert_eq!(sink.into_inner(), b"ok");
    assert_eq!(outcome.finish, Finish::EndOfStream);
}

#[tokio::test]
async fn malformed_payload_logs_one_parse_error() {
    let server = MockServer::start().await;

    let body = "data: not-json\ndata: {\"completed\":true}\n";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let (logs, _guard) = capture();
    let mut sink = ConsoleSink::new(Vec::new());
    client_for(&server)
        .chat_with_sink(nonempty![ChatMessage::user("Hello")], &mut sink)
        .await;

    let lines = logs.lines();
    let errors: Vec<&String> = lines.iter().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "log lines: {:?}", lines);
    assert!(errors[0].contains("Error parsing JSON"));
    assert!(lines.iter().any(|l| l.contains("Stream completed")));
}
