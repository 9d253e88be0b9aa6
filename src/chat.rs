//! Chat completions client over HTTP.
//!
//! Implements [`StreamingClient`] for an OpenAI-style `chat/completions`
//! endpoint that streams `data: {json}` lines.

use async_trait::async_trait;
use nonempty::NonEmpty;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::client::{ClientError, StreamingClient};
use crate::http::{add_extra_headers, build_http_client};
use crate::model::{ChatMessage, ChatRequest};
use crate::options::{ModelOptions, TransportOptions};
use crate::sse::SSEResponseExt;
use crate::stream::{events, EventStream};

/// Streaming chat client using HTTP transport.
#[derive(Debug, Clone)]
pub struct ChatClient {
    model_options: ModelOptions,
    transport_options: TransportOptions,
}

impl ChatClient {
    pub fn new(model_options: ModelOptions, transport_options: TransportOptions) -> Self {
        Self {
            model_options,
            transport_options,
        }
    }

    /// Default model options with credentials taken from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(ModelOptions::default(), TransportOptions::from_env()?))
    }

    pub fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    fn build_request(
        &self,
        messages: NonEmpty<ChatMessage>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let api_key = self
            .transport_options
            .api_key
            .as_ref()
            .ok_or_else(|| ClientError::RequestSetup("API key is required".to_string()))?;

        let request_body = ChatRequest::from((Vec::from(messages), &self.model_options));
        let body = serde_json::to_vec(&request_body)
            .map_err(|e| ClientError::RequestSetup(format!("failed to encode request: {}", e)))?;

        let http_client = build_http_client(&self.transport_options)
            .map_err(|e| ClientError::RequestSetup(format!("failed to build HTTP client: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                .map_err(|_| ClientError::RequestSetup("Invalid API key".to_string()))?,
        );

        let req = http_client
            .post(&self.transport_options.endpoint)
            .headers(headers)
            .body(body);

        Ok(add_extra_headers(req, &self.transport_options.extra_headers))
    }
}

#[async_trait]
impl StreamingClient for ChatClient {
    async fn request_stream(
        &self,
        messages: NonEmpty<ChatMessage>,
    ) -> Result<EventStream, ClientError> {
        let message_count = messages.len();
        let req = self.build_request(messages)?;

        debug!(
            endpoint = %self.transport_options.endpoint,
            model = %self.model_options.model,
            messages = message_count,
            "Sending chat request"
        );

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = error_body(response.text().await);
            debug!(status = status.as_u16(), "Chat request rejected");
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Streaming response");
        Ok(Box::pin(events(response.sse())))
    }
}

/// Body of a rejected response, or a note on why it could not be read.
fn error_body(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SecretString;
    use nonempty::nonempty;

    fn client(transport_options: TransportOptions) -> ChatClient {
        ChatClient::new(ModelOptions::default(), transport_options)
    }

    #[test]
    fn test_build_request_headers_and_body() {
        let client = client(
            TransportOptions::new(SecretString::from("secret"))
                .with_endpoint("http://localhost:9/v1/chat/completions".to_string())
                .with_header("X-Client".to_string(), "streamchat".to_string()),
        );

        let request = client
            .build_request(nonempty![ChatMessage::system("sys"), ChatMessage::user("hi")])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), &reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:9/v1/chat/completions");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer secret");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()["x-client"], "streamchat");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn test_missing_api_key() {
        let client = client(TransportOptions::default());
        let result = client.build_request(nonempty![ChatMessage::user("hi")]);
        assert!(matches!(result, Err(ClientError::RequestSetup(_))));
    }

    #[test]
    fn test_invalid_api_key_header() {
        let client = client(TransportOptions::new(SecretString::from("bad\nkey")));
        let result = client.build_request(nonempty![ChatMessage::user("hi")]);
        assert!(matches!(result, Err(ClientError::RequestSetup(msg)) if msg == "Invalid API key"));
    }

    #[test]
    fn test_error_body_keeps_read_failure() {
        assert_eq!(error_body(Ok("internal".to_string())), "internal");

        let read_error = reqwest::Client::new().get("not a url").build().unwrap_err();
        let body = error_body(Err(read_error));
        assert!(body.starts_with("<unreadable body: "), "{}", body);
    }
}
