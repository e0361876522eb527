//! # inkstream - streaming AI text client for note-taking backends
//!
//! A small, pragmatic Rust library for talking to a local AI text backend
//! (the kind that fronts Ollama behind a handful of REST routes) and
//! streaming its answers straight into a document while they are generated.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Typed requests and responses for summarize, keywords, translate,
//!   rewrite, and compose, plus a health probe
//! - Streaming that accepts SSE (`data: {...}` / `data: [DONE]`) and
//!   newline-delimited JSON, even mixed in one response
//! - Correct under arbitrary network chunking: records split mid-JSON and
//!   characters split mid-UTF-8 are reassembled
//! - Per-line fault isolation: one malformed record never aborts the stream
//!
//! ## Architecture
//!
//! Streaming is a fixed pipeline, applied per chunk in arrival order:
//!
//! ```text
//! bytes -> Utf8Decoder -> LineBuffer -> classify_line -> parse_record -> DocumentSink
//! ```
//!
//! [`StreamConsumer`] drives the pipeline from a [`BodyReader`] and delivers
//! exactly one terminal notification through a [`Notifier`]; the sink and
//! notifier traits are the seams where an editor host plugs in.
//!
//! ## Example
//! ```no_run
//! use inkstream::client::{BackendClient, Operation};
//! use inkstream::model::SummarizeRequest;
//! use inkstream::options::{BackendOptions, GenerationOptions};
//! use inkstream::sink::{BufferSink, LogNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new(BackendOptions::default())
//!         .with_defaults(GenerationOptions::new().with_provider("ollama"));
//!
//!     let request = SummarizeRequest::new("A very long text...").with_max_length(100);
//!
//!     let mut sink = BufferSink::new();
//!     client
//!         .stream_to_sink(
//!             Operation::Summarize,
//!             &request,
//!             &mut sink,
//!             &LogNotifier,
//!             "\n\n## Summary\n\n",
//!             "Summary complete",
//!         )
//!         .await?;
//!
//!     println!("{}", sink.content());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod consumer;
pub mod decode;
pub mod envelope;
pub mod http;
pub mod model;
pub mod options;
pub mod sink;


// Re-exports for convenience
pub use client::{BackendClient, ClientError, Operation};
pub use consumer::{BodyReader, HttpBodyReader, ReaderExt, StreamConsumer, StreamOutcome};
pub use envelope::{classify_line, parse_record, ClassifiedLine, StreamEnvelope, DELTA_FIELDS};
pub use sink::{BufferSink, DocumentSink, LogNotifier, Notifier};
