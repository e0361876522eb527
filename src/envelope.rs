//! Per-line classification of stream framing and record extraction.
//!
//! Streaming backends disagree on framing. Some wrap each JSON record in an
//! SSE `data:` line, others emit newline-delimited JSON, and a proxy in the
//! middle can mix both:
//!
//! ```text
//! data: {"content": "Hello"}
//!
//! {"content": " world", "done": false}
//!
//! data: [DONE]
//! ```
//!
//! Classification is decided per line, so either convention, or a mixture,
//! works without a mode flag or prior negotiation.

use serde_json::Value;

/// SSE control fields that carry framing metadata, never payload.
const SSE_CONTROL_PREFIXES: [&str; 3] = ["event:", "id:", "retry:"];

/// Marker a server sends to end an SSE stream explicitly.
const DONE_MARKER: &str = "[DONE]";

/// Field names consulted, in order, when extracting a text delta from a
/// record. Providers disagree on where the delta lives; the first field that
/// is present with a non-empty string value wins.
pub const DELTA_FIELDS: [&str; 5] = ["content", "text", "delta", "chunk", "message"];

/// How a single line of the stream is to be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLine<'a> {
    /// SSE control metadata (`event:`, `id:`, `retry:`); nothing to extract.
    SseControl,
    /// A JSON candidate carried in SSE `data: ` framing.
    SseData(&'a str),
    /// The `[DONE]` marker, SSE-framed or bare.
    Sentinel,
    /// A line that is itself the JSON candidate (newline-delimited JSON).
    BareJson(&'a str),
    /// Comments, keep-alives, stray text; skipped.
    Noise,
}

impl<'a> ClassifiedLine<'a> {
    /// The JSON candidate text, for the two variants that carry one.
    pub fn payload(&self) -> Option<&'a str> {
        match self {
            ClassifiedLine::SseData(payload) | ClassifiedLine::BareJson(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Classify one complete line.
///
/// Stateless; a line always classifies the same way regardless of what came
/// before it.
///
/// # Example
/// ```
/// use inkstream::envelope::{classify_line, ClassifiedLine};
///
/// let line = "data: {\"content\": \"Hi\"}";
/// assert_eq!(
///     classify_line(line),
///     ClassifiedLine::SseData("{\"content\": \"Hi\"}")
/// );
///
/// assert_eq!(classify_line("data: [DONE]"), ClassifiedLine::Sentinel);
/// assert_eq!(classify_line("event: delta"), ClassifiedLine::SseControl);
/// assert_eq!(classify_line(": keep-alive"), ClassifiedLine::Noise);
/// ```
pub fn classify_line(line: &str) -> ClassifiedLine<'_> {
    let line = line.trim();

    if SSE_CONTROL_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
    {
        return ClassifiedLine::SseControl;
    }

    let (candidate, sse_framed) = match line.strip_prefix("data: ") {
        Some(data) => (data.trim(), true),
        None => (line, false),
    };

    if candidate == DONE_MARKER {
        return ClassifiedLine::Sentinel;
    }

    // Records are JSON objects or arrays; anything else on the line is not
    // worth a parse attempt.
    if !candidate.starts_with('{') && !candidate.starts_with('[') {
        return ClassifiedLine::Noise;
    }

    if sse_framed {
        ClassifiedLine::SseData(candidate)
    } else {
        ClassifiedLine::BareJson(candidate)
    }
}

/// One parsed stream record: the resolved text delta, the completion flag,
/// and metadata passed through without interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamEnvelope {
    /// First non-empty match of [`DELTA_FIELDS`], if any.
    pub delta: Option<String>,
    /// Explicit completion flag; absent on the wire means not complete.
    pub done: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Usage accounting, forwarded verbatim.
    pub usage: Option<Value>,
}

/// Parse one JSON candidate into a [`StreamEnvelope`].
///
/// A field of the wrong type is treated as absent rather than failing the
/// record, so a provider that sends `"message": {...}` still yields its
/// `"content"` delta.
///
/// # Example
/// ```
/// use inkstream::envelope::parse_record;
///
/// let envelope = parse_record(r#"{"content": "Hello", "done": false}"#).unwrap();
/// assert_eq!(envelope.delta.as_deref(), Some("Hello"));
/// assert!(!envelope.done);
/// ```
pub fn parse_record(json_text: &str) -> Result<StreamEnvelope, serde_json::Error> {
    let value: Value = serde_json::from_str(json_text)?;

    let delta = DELTA_FIELDS
        .iter()
        .find_map(|field| {
            value
                .get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(|s| s.to_string());

    Ok(StreamEnvelope {
        delta,
        done: value.get("done").and_then(Value::as_bool).unwrap_or(false),
        provider: string_field(&value, "provider"),
        model: string_field(&value, "model"),
        usage: value.get("usage").cloned(),
    })
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sse_data() {
        assert_eq!(
            classify_line("data: {\"content\": \"hi\"}"),
            ClassifiedLine::SseData("{\"content\": \"hi\"}")
        );
        // inner whitespace after the prefix is trimmed
        assert_eq!(
            classify_line("data:   {\"a\":1}  "),
            ClassifiedLine::SseData("{\"a\":1}")
        );
    }

    #[test]
    fn test_classify_bare_json() {
        assert_eq!(
            classify_line("{\"content\": \"hi\"}"),
            ClassifiedLine::BareJson("{\"content\": \"hi\"}")
        );
        assert_eq!(classify_line("[1, 2]"), ClassifiedLine::BareJson("[1, 2]"));
    }

    #[test]
    fn test_classify_sentinel() {
        assert_eq!(classify_line("data: [DONE]"), ClassifiedLine::Sentinel);
        assert_eq!(classify_line("[DONE]"), ClassifiedLine::Sentinel);
    }

    #[test]
    fn test_classify_control_lines() {
        assert_eq!(classify_line("event: completion"), ClassifiedLine::SseControl);
        assert_eq!(classify_line("id: 42"), ClassifiedLine::SseControl);
        assert_eq!(classify_line("retry: 3000"), ClassifiedLine::SseControl);
    }

    #[test]
    fn test_classify_noise() {
        assert_eq!(classify_line(": comment"), ClassifiedLine::Noise);
        assert_eq!(classify_line("plain text"), ClassifiedLine::Noise);
        // data prefix with nothing behind it
        assert_eq!(classify_line("data: "), ClassifiedLine::Noise);
        assert_eq!(classify_line(""), ClassifiedLine::Noise);
    }

    #[test]
    fn test_data_prefix_requires_the_space() {
        // "data:{...}" without the space is a bare JSON line as far as the
        // prefix rule is concerned, and it does not start with '{'
        assert_eq!(classify_line("data:{\"a\":1}"), ClassifiedLine::Noise);
    }

    #[test]
    fn test_payload_accessor() {
        assert_eq!(classify_line("data: {\"a\":1}").payload(), Some("{\"a\":1}"));
        assert_eq!(classify_line("{\"a\":1}").payload(), Some("{\"a\":1}"));
        assert_eq!(classify_line("data: [DONE]").payload(), None);
        assert_eq!(classify_line("event: x").payload(), None);
    }

    #[test]
    fn test_delta_field_precedence() {
        let envelope =
            parse_record(r#"{"text": "second", "content": "first"}"#).unwrap();
        assert_eq!(envelope.delta.as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_delta_field_falls_through() {
        let envelope = parse_record(r#"{"content": "", "text": "used"}"#).unwrap();
        assert_eq!(envelope.delta.as_deref(), Some("used"));
    }

    #[test]
    fn test_non_string_delta_field_is_skipped() {
        // object-valued "message" must not shadow a later string field,
        // and must not fail the record
        let envelope =
            parse_record(r#"{"message": {"role": "assistant"}, "done": true}"#).unwrap();
        assert_eq!(envelope.delta, None);
        assert!(envelope.done);
    }

    #[test]
    fn test_message_field_is_last_resort() {
        let envelope = parse_record(r#"{"message": "fallback"}"#).unwrap();
        assert_eq!(envelope.delta.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_done_flag_parsing() {
        assert!(parse_record(r#"{"done": true}"#).unwrap().done);
        assert!(!parse_record(r#"{"done": false}"#).unwrap().done);
        assert!(!parse_record(r#"{"content": "x"}"#).unwrap().done);
        // wrong type reads as absent
        assert!(!parse_record(r#"{"done": "yes"}"#).unwrap().done);
    }

    #[test]
    fn test_metadata_passthrough() {
        let envelope = parse_record(
            r#"{"content": "x", "provider": "ollama", "model": "llama3.2",
                "usage": {"promptTokens": 10}}"#,
        )
        .unwrap();
        assert_eq!(envelope.provider.as_deref(), Some("ollama"));
        assert_eq!(envelope.model.as_deref(), Some("llama3.2"));
        assert_eq!(envelope.usage.unwrap()["promptTokens"], 10);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_record("{\"content\": ").is_err());
        assert!(parse_record("not json").is_err());
    }
}
