//! Client for the local AI text backend.
//!
//! The backend exposes one POST route per text operation plus a health probe.
//! Every operation takes the same `config` object and answers either with a
//! single JSON document or, when streaming is requested, with a line-oriented
//! body that [`StreamConsumer`] knows how to drain.

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consumer::{HttpBodyReader, ReaderExt, StreamConsumer, StreamOutcome};
use crate::http::{add_extra_headers, build_http_client};
use crate::model::{
    ComposeRequest, ComposeResponse, ErrorResponse, HealthResponse, KeywordsRequest,
    KeywordsResponse, RewriteRequest, RewriteResponse, SummarizeRequest, SummarizeResponse,
    TranslateRequest, TranslateResponse,
};
use crate::options::{BackendOptions, GenerationOptions};
use crate::sink::{DocumentSink, Notifier};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The text operations the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Summarize,
    Keywords,
    Translate,
    Rewrite,
    Compose,
}

impl Operation {
    /// URL path segment of the operation.
    pub fn path(self) -> &'static str {
        match self {
            Operation::Summarize => "summarize",
            Operation::Keywords => "keywords",
            Operation::Translate => "translate",
            Operation::Rewrite => "rewrite",
            Operation::Compose => "compose",
        }
    }
}

/// Client for the backend's text operations.
///
/// Holds connection options and default generation settings; the defaults are
/// merged into any request that does not carry its own `config`.
///
/// # Example
/// ```rust,ignore
/// use inkstream::client::BackendClient;
/// use inkstream::model::SummarizeRequest;
/// use inkstream::options::{BackendOptions, GenerationOptions};
///
/// let client = BackendClient::new(BackendOptions::default())
///     .with_defaults(GenerationOptions::new().with_provider("ollama"));
///
/// let response = client
///     .summarize(&SummarizeRequest::new("long text").with_max_length(100))
///     .await?;
/// println!("{}", response.summary);
/// ```
pub struct BackendClient {
    options: BackendOptions,
    defaults: GenerationOptions,
}

impl BackendClient {
    /// Create a client with the given connection options.
    pub fn new(options: BackendOptions) -> Self {
        Self {
            options,
            defaults: GenerationOptions::default(),
        }
    }

    /// Set default generation settings for requests without their own config.
    pub fn with_defaults(mut self, defaults: GenerationOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn options(&self) -> &BackendOptions {
        &self.options
    }

    /// Summarize text.
    pub async fn summarize(
        &self,
        request: &SummarizeRequest,
    ) -> Result<SummarizeResponse, ClientError> {
        self.post_operation(Operation::Summarize, request).await
    }

    /// Extract keywords from text.
    pub async fn keywords(
        &self,
        request: &KeywordsRequest,
    ) -> Result<KeywordsResponse, ClientError> {
        self.post_operation(Operation::Keywords, request).await
    }

    /// Translate text into another language.
    pub async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateResponse, ClientError> {
        self.post_operation(Operation::Translate, request).await
    }

    /// Rewrite text with a different tone, style, or purpose.
    pub async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteResponse, ClientError> {
        self.post_operation(Operation::Rewrite, request).await
    }

    /// Compose new text from a prompt.
    pub async fn compose(&self, request: &ComposeRequest) -> Result<ComposeResponse, ClientError> {
        self.post_operation(Operation::Compose, request).await
    }

    /// Probe the backend and the provider behind it.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.endpoint("health")?;
        let http_client = build_http_client(&self.options)?;

        let mut req = http_client.get(&url);
        req = add_extra_headers(req, &self.options.extra_headers);

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::decode_error(status, &body));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Start a streaming run of `operation` and hand back the body as a
    /// reader for [`StreamConsumer::consume`].
    ///
    /// The wire `config.stream` flag is forced on, whatever the request's own
    /// setting says.
    pub async fn stream<Req>(
        &self,
        operation: Operation,
        request: &Req,
    ) -> Result<HttpBodyReader, ClientError>
    where
        Req: Serialize + ?Sized,
    {
        let response = self.dispatch(operation, request, true).await?;
        Ok(response.into_body_reader())
    }

    /// Run `operation` streaming and drive the whole response into `sink`:
    /// `header` first, then every delta in arrival order, with the single
    /// terminal notification going to `notifier`.
    ///
    /// An `Err` here means the request could not be started; once streaming
    /// has begun, failures are reported through the returned
    /// [`StreamOutcome`] and the notifier instead.
    pub async fn stream_to_sink<Req, S, N>(
        &self,
        operation: Operation,
        request: &Req,
        sink: &mut S,
        notifier: &N,
        header: &str,
        success_message: &str,
    ) -> Result<StreamOutcome, ClientError>
    where
        Req: Serialize + ?Sized,
        S: DocumentSink + ?Sized,
        N: Notifier + ?Sized,
    {
        let reader = self.stream(operation, request).await?;
        Ok(StreamConsumer::new()
            .consume(reader, sink, notifier, header, success_message)
            .await)
    }

    async fn post_operation<Req, Resp>(
        &self,
        operation: Operation,
        request: &Req,
    ) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self.dispatch(operation, request, false).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn dispatch<Req>(
        &self,
        operation: Operation,
        request: &Req,
        stream: bool,
    ) -> Result<reqwest::Response, ClientError>
    where
        Req: Serialize + ?Sized,
    {
        let mut body = serde_json::to_value(request)?;
        self.apply_config(&mut body, stream);

        let url = self.endpoint(operation.path())?;
        debug!("dispatching {} to {}", operation.path(), url);

        let http_client = build_http_client(&self.options)?;

        let mut req = http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json");
        req = add_extra_headers(req, &self.options.extra_headers);

        let response = req.json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("backend returned {} for {}", status, operation.path());
            return Err(Self::decode_error(status, &body));
        }

        Ok(response)
    }

    /// Merge the client's default config into a request body, and force the
    /// stream flag on when asked.
    fn apply_config(&self, body: &mut Value, force_stream: bool) {
        let Some(object) = body.as_object_mut() else {
            return;
        };

        if !object.contains_key("config") && !self.defaults.is_empty() {
            if let Ok(defaults) = serde_json::to_value(&self.defaults) {
                object.insert("config".to_string(), defaults);
            }
        }

        if force_stream {
            let config = object
                .entry("config")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Some(config) = config.as_object_mut() {
                config.insert("stream".to_string(), Value::Bool(true));
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<String, ClientError> {
        let base = self.options.base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::Config(
                "Backend base URL is required".to_string(),
            ));
        }
        Ok(format!("{}/{}", base, path))
    }

    /// Decode a non-success response into an error, preferring the backend's
    /// own error envelope when it parses.
    fn decode_error(status: reqwest::StatusCode, body: &str) -> ClientError {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            let message = match parsed.details {
                Some(details) => format!("{} ({})", parsed.error, details),
                None => parsed.error,
            };
            ClientError::Backend(message)
        } else {
            ClientError::Backend(format!("HTTP {}: {}", status, body))
        }
    }
}
