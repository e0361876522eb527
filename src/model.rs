//! Wire models for the backend's text operations.
//!
//! Field names follow the backend contract, which is camelCase on the wire.
//! Every operation request carries the input `text` and an optional `config`
//! object; every response repeats a small block of metadata next to the
//! operation's own payload.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::options::GenerationOptions;

/// Request to condense text into a summary.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationOptions>,

    /// Upper bound on the summary length, in words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Limit the summary to roughly `words` words.
    pub fn with_max_length(mut self, words: u32) -> Self {
        self.max_length = Some(words);
        self
    }

    pub fn with_config(mut self, config: GenerationOptions) -> Self {
        self.config = Some(config);
        self
    }
}

/// Request to extract keywords from text.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_keywords: Option<u32>,
}

impl KeywordsRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_max_keywords(mut self, count: u32) -> Self {
        self.max_keywords = Some(count);
        self
    }

    pub fn with_config(mut self, config: GenerationOptions) -> Self {
        self.config = Some(config);
        self
    }
}

/// Request to translate text into another language.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationOptions>,

    /// Language to translate into (e.g. "German").
    pub target_language: String,

    /// Source language hint; the backend detects it when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_language: target_language.into(),
            ..Default::default()
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    pub fn with_config(mut self, config: GenerationOptions) -> Self {
        self.config = Some(config);
        self
    }
}

/// Request to rewrite text with a different tone, style, or purpose.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_config(mut self, config: GenerationOptions) -> Self {
        self.config = Some(config);
        self
    }
}

/// Request to compose new text from a prompt, with existing text as context.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    /// Surrounding document text the composition may draw on.
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationOptions>,

    /// What to write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

impl ComposeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Provide document context for the composition.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_max_length(mut self, words: u32) -> Self {
        self.max_length = Some(words);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_config(mut self, config: GenerationOptions) -> Self {
        self.config = Some(config);
        self
    }
}

/// Metadata block repeated in every backend response.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMeta {
    pub success: bool,

    /// RFC 3339 timestamp of the response.
    pub timestamp: Option<String>,

    pub model: Option<String>,

    pub provider: Option<String>,

    /// Server-side processing time in milliseconds.
    pub duration: Option<i64>,
}

/// Response to a summarize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub summary: String,
}

/// A single extracted keyword with its relevance score.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub word: String,

    /// Relevance in the 0.0 to 1.0 range.
    pub relevance: f64,

    pub category: Option<String>,

    /// Position of the keyword within the source text, when the backend
    /// reports one.
    pub position: Option<u32>,
}

/// Response to a keywords request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub keywords: Vec<Keyword>,
}

impl KeywordsResponse {
    /// The keywords as one comma-separated line, ready to insert into a note.
    pub fn keyword_list(&self) -> String {
        self.keywords.iter().map(|k| k.word.as_str()).join(", ")
    }
}

/// Response to a translate request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub translation: String,

    /// Detected or confirmed source language.
    pub source_language: Option<String>,

    pub target_language: Option<String>,

    pub confidence: Option<f64>,
}

/// Response to a rewrite request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub rewritten_text: String,

    /// Summary of what was changed.
    pub changes: Option<String>,

    pub explanation: Option<String>,
}

/// Response to a compose request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub composed_text: String,

    #[serde(default)]
    pub words_count: u32,

    #[serde(default)]
    pub characters: u32,
}

/// Error envelope the backend returns with non-success HTTP statuses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,

    pub error: String,

    pub details: Option<String>,

    /// Machine-readable error code (e.g. "OLLAMA_UNAVAILABLE").
    pub code: Option<String>,
}

/// Response to a health probe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,

    pub timestamp: Option<String>,

    pub version: Option<String>,

    /// Seconds since the backend started.
    #[serde(default)]
    pub uptime: u64,

    /// State of the provider behind the backend.
    #[serde(default)]
    pub ollama: ProviderHealth,
}

/// Health details for a single provider.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderHealth {
    pub status: String,

    pub version: Option<String>,

    /// Number of models the provider has available.
    pub models: Option<u32>,

    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_serialize_camel_case() {
        let request = SummarizeRequest::new("long text")
            .with_max_length(50)
            .with_config(GenerationOptions::new().with_provider("ollama"));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["text"], "long text");
        assert_eq!(json["maxLength"], 50);
        assert_eq!(json["config"]["provider"], "ollama");
        // unset optionals stay off the wire
        assert!(json.get("sourceLanguage").is_none());
    }

    #[test]
    fn test_translate_request_carries_target_language() {
        let request = TranslateRequest::new("Hello", "German").with_source_language("English");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["targetLanguage"], "German");
        assert_eq!(json["sourceLanguage"], "English");
    }

    #[test]
    fn test_response_meta_flattens() {
        let body = r#"{
            "success": true,
            "timestamp": "2025-01-15T10:30:00Z",
            "model": "llama3.2",
            "provider": "ollama",
            "duration": 1834,
            "summary": "Short version."
        }"#;
        let response: SummarizeResponse = serde_json::from_str(body).unwrap();

        assert!(response.meta.success);
        assert_eq!(response.meta.duration, Some(1834));
        assert_eq!(response.summary, "Short version.");
    }

    #[test]
    fn test_response_meta_fields_may_be_absent() {
        let body = r#"{"summary": "terse"}"#;
        let response: SummarizeResponse = serde_json::from_str(body).unwrap();

        assert!(!response.meta.success);
        assert!(response.meta.model.is_none());
    }

    #[test]
    fn test_keyword_list_joins_words() {
        let body = r#"{
            "success": true,
            "keywords": [
                {"word": "rust", "relevance": 0.9},
                {"word": "streaming", "relevance": 0.7, "category": "topic", "position": 12}
            ]
        }"#;
        let response: KeywordsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.keyword_list(), "rust, streaming");
    }

    #[test]
    fn test_error_response_decodes() {
        let body = r#"{
            "success": false,
            "error": "Ollama is not available",
            "details": "connection refused",
            "code": "OLLAMA_UNAVAILABLE"
        }"#;
        let response: ErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.error, "Ollama is not available");
        assert_eq!(response.code.as_deref(), Some("OLLAMA_UNAVAILABLE"));
    }

    #[test]
    fn test_health_response_decodes() {
        let body = r#"{
            "status": "ok",
            "timestamp": "2025-01-15T10:30:00Z",
            "version": "1.2.0",
            "uptime": 3600,
            "ollama": {"status": "connected", "models": 4}
        }"#;
        let response: HealthResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.status, "ok");
        assert_eq!(response.uptime, 3600);
        assert_eq!(response.ollama.models, Some(4));
    }
}
