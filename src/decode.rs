//! Incremental decoding of streamed response bodies into complete lines.
//!
//! The network splits a body into chunks with no regard for content: a chunk
//! can end in the middle of a multi-byte UTF-8 sequence and in the middle of
//! a line. [`Utf8Decoder`] repairs the first kind of split, [`LineBuffer`]
//! the second; fed in sequence they turn an arbitrary chunking of the body
//! into the same list of lines.

/// Incremental UTF-8 decoder.
///
/// Bytes that end a chunk mid-sequence are held back and prepended to the
/// next chunk; at most three bytes are ever pending, since a UTF-8 sequence
/// is four bytes long at most. Invalid sequences inside a chunk are replaced
/// with U+FFFD and skipped, so one bad byte never poisons the rest of the
/// stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let input = if self.pending.is_empty() {
            chunk.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            joined
        };

        let mut text = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(error) => {
                    let (valid, after) = rest.split_at(error.valid_up_to());
                    if let Ok(prefix) = std::str::from_utf8(valid) {
                        text.push_str(prefix);
                    }
                    match error.error_len() {
                        // Invalid bytes inside the chunk: substitute and move on.
                        Some(width) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[width..];
                        }
                        // The chunk ends mid-sequence: hold the tail until the
                        // next chunk completes it.
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Flush at end of stream.
    ///
    /// A sequence still pending at this point can never be completed, so it
    /// decodes to U+FFFD instead of being dropped silently.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

/// Rolling buffer that reassembles decoded text into complete lines.
///
/// A line ends with `\n` or `\r\n`; terminators and surrounding whitespace
/// are stripped and blank lines are dropped. Text after the last terminator
/// stays buffered for the next [`feed`](LineBuffer::feed), or for
/// [`take_remainder`](LineBuffer::take_remainder) once the stream ends, so
/// a final record without a trailing newline is still seen exactly once.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and drain every line completed by it, in order.
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Take the final unterminated line, if any non-blank text is buffered.
    pub fn take_remainder(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        let tail = tail.trim();
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello world"), "hello world");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_two_byte_sequence_split() {
        // "é" is C3 A9
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"caf\xC3"), "caf");
        assert_eq!(decoder.decode(b"\xA9 au lait"), "é au lait");
    }

    #[test]
    fn test_three_byte_sequence_split_at_each_point() {
        // "中" is E4 B8 AD
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"\xE4"), "");
        assert_eq!(decoder.decode(b"\xB8"), "");
        assert_eq!(decoder.decode(b"\xAD"), "中");

        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"\xE4\xB8"), "");
        assert_eq!(decoder.decode(b"\xAD\xE6\x96\x87"), "中文");
    }

    #[test]
    fn test_four_byte_sequence_split() {
        // "😀" is F0 9F 98 80
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hi \xF0\x9F"), "hi ");
        assert_eq!(decoder.decode(b"\x98\x80!"), "😀!");
    }

    #[test]
    fn test_invalid_byte_becomes_replacement_char() {
        let mut decoder = Utf8Decoder::new();
        // 0xFF can never start a UTF-8 sequence
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        // the stream keeps decoding afterwards
        assert_eq!(decoder.decode(b"c"), "c");
    }

    #[test]
    fn test_finish_flushes_dangling_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"ok\xE4\xB8"), "ok");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        // flushing is idempotent
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_feed_drains_complete_lines() {
        let mut lines = LineBuffer::new();
        assert_eq!(lines.feed("one\ntwo\nthr"), vec!["one", "two"]);
        assert_eq!(lines.feed("ee\n"), vec!["three"]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut lines = LineBuffer::new();
        assert_eq!(lines.feed("alpha\r\nbeta\r\n"), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let mut lines = LineBuffer::new();
        assert_eq!(lines.feed("\n\n  \ndata\n\n"), vec!["data"]);
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut lines = LineBuffer::new();
        assert!(lines.feed("no newline yet").is_empty());
        assert_eq!(lines.feed(" here\n"), vec!["no newline yet here"]);
    }

    #[test]
    fn test_take_remainder() {
        let mut lines = LineBuffer::new();
        lines.feed("done\nleftover");
        assert_eq!(lines.take_remainder().as_deref(), Some("leftover"));
        assert_eq!(lines.take_remainder(), None);
    }

    #[test]
    fn test_take_remainder_ignores_whitespace() {
        let mut lines = LineBuffer::new();
        lines.feed("   ");
        assert_eq!(lines.take_remainder(), None);
    }

    #[test]
    fn test_decoder_and_lines_compose() {
        // a 3-byte character split right before its last byte, with the line
        // terminator in the second chunk
        let mut decoder = Utf8Decoder::new();
        let mut lines = LineBuffer::new();

        let mut collected = Vec::new();
        collected.extend(lines.feed(&decoder.decode(b"{\"content\":\"\xE4\xB8")));
        collected.extend(lines.feed(&decoder.decode(b"\xAD\"}\n")));

        assert_eq!(collected, vec!["{\"content\":\"中\"}"]);
    }
}
