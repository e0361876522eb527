//! The streaming consumer: drives one response body from first byte to
//! terminal notification.
//!
//! One invocation owns one reader. Chunks are processed in arrival order,
//! lines within a chunk in order, and each extracted delta becomes exactly
//! one append to the sink, so concatenating the appends (after the header)
//! reproduces the streamed text. A malformed line costs only itself; the run
//! ends unsuccessfully only when the transport fails. The reader is released
//! on every exit path.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::decode::{LineBuffer, Utf8Decoder};
use crate::envelope::{classify_line, parse_record, ClassifiedLine};
use crate::sink::{DocumentSink, Notifier};

/// Chunk source for one streaming run.
///
/// Implementations wrap a live HTTP body (see [`HttpBodyReader`]) or replay
/// scripted data in tests. [`StreamConsumer::consume`] calls
/// [`release`](BodyReader::release) exactly once when the run ends, however
/// it ends.
#[async_trait]
pub trait BodyReader: Send {
    /// Next chunk of the body; `Ok(None)` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ClientError>;

    /// Give up the underlying resource. Default: nothing to release.
    fn release(&mut self) {}
}

/// [`BodyReader`] over a live `reqwest` response body.
pub struct HttpBodyReader {
    stream: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
}

impl HttpBodyReader {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            stream: Some(response.bytes_stream().boxed()),
        }
    }
}

#[async_trait]
impl BodyReader for HttpBodyReader {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ClientError> {
        let Some(stream) = self.stream.as_mut() else {
            // released readers read as exhausted
            return Ok(None);
        };
        match stream.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(err)) => Err(ClientError::Http(err)),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        // dropping the stream closes the connection
        self.stream = None;
    }
}

/// Extension trait for `reqwest::Response` to hand its body to the consumer.
///
/// # Example
/// ```ignore
/// use inkstream::consumer::ReaderExt;
///
/// let response = client.post(url).json(&request).send().await?;
/// let reader = response.into_body_reader();
/// ```
pub trait ReaderExt {
    fn into_body_reader(self) -> HttpBodyReader;
}

impl ReaderExt for reqwest::Response {
    fn into_body_reader(self) -> HttpBodyReader {
        HttpBodyReader::new(self)
    }
}

/// How a streaming run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream announced completion: `[DONE]` sentinel or a `done` flag.
    Done,
    /// The body ended without an explicit completion signal. Still a success.
    Exhausted,
    /// The transport failed mid-stream; carries the error text.
    Failed(String),
}

impl StreamOutcome {
    /// True unless the transport failed.
    pub fn is_success(&self) -> bool {
        !matches!(self, StreamOutcome::Failed(_))
    }
}

/// What processing one line did to the run.
#[derive(Debug, PartialEq, Eq)]
enum LineEffect {
    Continue,
    Finished,
}

/// Drives one streaming response into a [`DocumentSink`].
///
/// # Example
/// ```ignore
/// use inkstream::consumer::{ReaderExt, StreamConsumer};
///
/// let reader = response.into_body_reader();
/// let outcome = StreamConsumer::new()
///     .consume(reader, &mut sink, &notifier, "\n\n## Summary\n\n", "Summary complete")
///     .await;
/// ```
#[derive(Debug, Default)]
pub struct StreamConsumer {
    pacing: Option<Duration>,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause this long before each applied delta so an interactive host can
    /// repaint between appends. Cosmetic; off by default.
    pub fn with_delta_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = Some(pacing);
        self
    }

    /// Consume `reader` to the end, appending `header` and then every
    /// extracted delta to `sink` in arrival order.
    ///
    /// Exactly one terminal notification goes to `notifier`:
    /// `success_message` when the stream completes (explicitly or by running
    /// out of body), or an error notice when the transport fails. Content
    /// already appended stays in the sink either way.
    pub async fn consume<R, S, N>(
        &self,
        mut reader: R,
        sink: &mut S,
        notifier: &N,
        header: &str,
        success_message: &str,
    ) -> StreamOutcome
    where
        R: BodyReader,
        S: DocumentSink + ?Sized,
        N: Notifier + ?Sized,
    {
        sink.append_at_end(header);

        let mut decoder = Utf8Decoder::new();
        let mut lines = LineBuffer::new();

        let outcome = 'run: loop {
            match reader.next_chunk().await {
                Ok(Some(chunk)) => {
                    let text = decoder.decode(&chunk);
                    for line in lines.feed(&text) {
                        if self.apply_line(&line, sink).await == LineEffect::Finished {
                            break 'run StreamOutcome::Done;
                        }
                    }
                }
                Ok(None) => {
                    // End of body: flush the decoder, then drain the buffer,
                    // then the unterminated remainder, all through the same
                    // per-line path.
                    let tail = decoder.finish();
                    for line in lines.feed(&tail) {
                        if self.apply_line(&line, sink).await == LineEffect::Finished {
                            break 'run StreamOutcome::Done;
                        }
                    }
                    if let Some(rest) = lines.take_remainder() {
                        if self.apply_line(&rest, sink).await == LineEffect::Finished {
                            break 'run StreamOutcome::Done;
                        }
                    }
                    break 'run StreamOutcome::Exhausted;
                }
                Err(err) => break 'run StreamOutcome::Failed(err.to_string()),
            }
        };

        reader.release();

        match &outcome {
            StreamOutcome::Done | StreamOutcome::Exhausted => {
                debug!("stream finished: {:?}", outcome);
                notifier.notify(success_message);
            }
            StreamOutcome::Failed(detail) => {
                warn!("stream failed: {}", detail);
                notifier.notify_error(&format!("Error during streaming: {}", detail));
            }
        }

        outcome
    }

    /// Classify, extract, and apply one line.
    async fn apply_line<S>(&self, line: &str, sink: &mut S) -> LineEffect
    where
        S: DocumentSink + ?Sized,
    {
        let classified = classify_line(line);
        if classified == ClassifiedLine::Sentinel {
            return LineEffect::Finished;
        }
        let Some(payload) = classified.payload() else {
            return LineEffect::Continue;
        };
        debug!("received stream record: '{}'", payload);

        let envelope = match parse_record(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                // one bad record costs one line, never the run
                warn!("skipping malformed stream record: {}", err);
                return LineEffect::Continue;
            }
        };

        if let Some(delta) = &envelope.delta {
            if let Some(pacing) = self.pacing {
                tokio::time::sleep(pacing).await;
            }
            sink.append_at_end(delta);
            sink.reveal_end();
        }

        if envelope.done {
            if let Some(usage) = &envelope.usage {
                debug!("stream reported usage: {}", usage);
            }
            LineEffect::Finished
        } else {
            LineEffect::Continue
        }
    }
}
