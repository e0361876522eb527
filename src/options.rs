//! Options structures for the backend connection and text generation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Address the backend listens on when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Connection options for the local backend.
///
/// # Example
/// ```rust
/// use inkstream::options::BackendOptions;
/// use std::time::Duration;
///
/// let options = BackendOptions::new("http://localhost:3000")
///     .with_timeout(Duration::from_secs(60))
///     .with_header("X-Request-Source", "notes");
/// ```
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Base URL of the backend, scheme included.
    pub base_url: String,

    /// Request timeout. Applies to the whole exchange, streamed bodies
    /// included, so leave generous room for long generations.
    pub timeout: Option<Duration>,

    /// Additional HTTP headers to include in every request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BackendOptions {
    /// Create options pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            extra_headers: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Generation parameters shared by every operation.
///
/// Serialized as the request's `config` object; fields left unset are omitted
/// from the wire and fall back to the backend's own defaults.
///
/// # Example
/// ```rust
/// use inkstream::options::GenerationOptions;
///
/// let config = GenerationOptions::new()
///     .with_provider("ollama")
///     .with_model("llama3.2")
///     .with_temperature(0.3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Provider the backend should route to (e.g. "ollama").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model identifier within the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Ask for a streamed response body instead of a single document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl GenerationOptions {
    /// Create empty options; everything defers to the backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the streaming flag.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// True when no field is set and serializing would produce `{}`.
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.temperature.is_none()
            && self.stream.is_none()
    }
}
