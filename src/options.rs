//! Model and transport configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

pub const DEFAULT_ENDPOINT: &str =
    "https://www.gpt4novel.com/api/xiaoshuoai/ext/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "nalang-xl-10";

/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "CHAT_API_KEY";
/// Environment variable overriding the endpoint URL.
pub const API_URL_ENV: &str = "CHAT_API_URL";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Model and sampling parameters sent with every request.
///
/// # Example
/// ```rust
/// use streamchat::options::ModelOptions;
///
/// let options = ModelOptions::default()
///     .with_model("nalang-turbo-v19")
///     .with_temperature(0.9);
/// assert_eq!(options.max_tokens, 800);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Model identifier
    pub model: String,

    /// Temperature for sampling
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,

    /// Penalty applied to repeated tokens
    pub repetition_penalty: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 800,
            top_p: 0.35,
            repetition_penalty: 1.05,
        }
    }
}

impl ModelOptions {
    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set top-p sampling parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the repetition penalty.
    pub fn with_repetition_penalty(mut self, repetition_penalty: f32) -> Self {
        self.repetition_penalty = repetition_penalty;
        self
    }
}

/// HTTP transport configuration.
///
/// No timeout is set by default: a stalled stream waits indefinitely unless
/// the caller opts in with [`TransportOptions::with_timeout`].
///
/// # Example
/// ```rust
/// use streamchat::options::{SecretString, TransportOptions};
/// use std::time::Duration;
///
/// let options = TransportOptions::new(SecretString::new("sk-...".to_string()))
///     .with_endpoint("http://localhost:8080/v1/chat/completions".to_string())
///     .with_timeout(Duration::from_secs(30));
/// assert!(options.proxy.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// API key for bearer authentication
    pub api_key: Option<SecretString>,

    /// Full URL of the chat completions endpoint
    pub endpoint: String,

    /// Request timeout
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            proxy: None,
            extra_headers: None,
        }
    }
}

impl TransportOptions {
    /// Create new transport options with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Load the API key and optional endpoint override from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClientError::RequestSetup(format!("{API_KEY_ENV} is not set")))?;

        let mut options = Self::new(api_key);
        if let Some(endpoint) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            options.endpoint = endpoint;
        }
        Ok(options)
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::from("sk-live");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "sk-live");
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let result = TransportOptions::from_lookup(|_| None);
        assert!(matches!(result, Err(ClientError::RequestSetup(_))));

        let result = TransportOptions::from_lookup(|_| Some("  ".to_string()));
        assert!(matches!(result, Err(ClientError::RequestSetup(_))));
    }

    #[test]
    fn test_from_lookup_endpoint_override() {
        let options = TransportOptions::from_lookup(|key| match key {
            API_KEY_ENV => Some("token".to_string()),
            API_URL_ENV => Some("http://localhost/v1/chat/completions".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(options.endpoint, "http://localhost/v1/chat/completions");
        assert_eq!(options.api_key.unwrap().expose_secret(), "token");

        let options = TransportOptions::from_lookup(|key| {
            (key == API_KEY_ENV).then(|| "token".to_string())
        })
        .unwrap();
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_headers_accumulate() {
        let options = TransportOptions::default()
            .with_header("X-A".to_string(), "1".to_string())
            .with_header("X-B".to_string(), "2".to_string());
        assert_eq!(options.extra_headers.unwrap().len(), 2);
    }
}
