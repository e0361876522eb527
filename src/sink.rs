//! Host-side seams: where streamed text goes and how the outcome is
//! announced.
//!
//! The streaming consumer never talks to an editor or a UI directly. It
//! appends through [`DocumentSink`] and reports through [`Notifier`]; the
//! host decides what those mean. [`BufferSink`] and [`LogNotifier`] are the
//! headless implementations used by tests and batch callers.

use tracing::{error, info};

/// Destination document for streamed text.
///
/// The consumer only ever appends at the current end of content and asks for
/// the end to stay visible; everything else about the document is the host's
/// business.
pub trait DocumentSink {
    /// Append text at the current end of content.
    fn append_at_end(&mut self, text: &str);

    /// Keep the end of content visible (move a cursor, scroll a view).
    /// Cosmetic; headless sinks ignore it.
    fn reveal_end(&mut self) {}
}

/// In-memory sink that accumulates appended text.
#[derive(Debug, Default)]
pub struct BufferSink {
    content: String,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl DocumentSink for BufferSink {
    fn append_at_end(&mut self, text: &str) {
        self.content.push_str(text);
    }
}

/// Channel for the single terminal notification of a streaming run.
pub trait Notifier {
    /// Deliver a success notice.
    fn notify(&self, message: &str);

    /// Deliver a failure notice. Forwards to [`notify`](Notifier::notify)
    /// unless the host wants a separate severity.
    fn notify_error(&self, message: &str) {
        self.notify(message);
    }
}

/// Notifier that reports through the log, for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_buffer_sink_accumulates() {
        let mut sink = BufferSink::new();
        sink.append_at_end("Hello");
        sink.append_at_end(", world");
        sink.reveal_end();
        assert_eq!(sink.content(), "Hello, world");
        assert_eq!(sink.into_content(), "Hello, world");
    }

    #[test]
    fn test_notify_error_defaults_to_notify() {
        #[derive(Default)]
        struct Recording {
            messages: Mutex<Vec<String>>,
        }

        impl Notifier for Recording {
            fn notify(&self, message: &str) {
                self.messages.lock().unwrap().push(message.to_string());
            }
        }

        let notifier = Recording::default();
        notifier.notify("ok");
        notifier.notify_error("bad");
        assert_eq!(*notifier.messages.lock().unwrap(), vec!["ok", "bad"]);
    }
}
