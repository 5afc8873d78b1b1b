//! Incremental byte-to-line decoding
//!
//! Transport chunks carry no protocol alignment: a chunk may end inside a
//! line, inside a JSON payload, or inside a multi-byte character. The
//! [`FrameDecoder`] holds back whatever is incomplete and only ever hands
//! out whole lines.

/// Stateful chunk-to-line decoder.
///
/// Invariant: between calls, `buffer` holds only the text after the last
/// line separator seen so far, and `pending_bytes` holds only an incomplete
/// UTF-8 sequence (at most three bytes).
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Trailing bytes of a character split across chunks
    pending_bytes: Vec<u8>,
    /// Decoded text of the current incomplete line
    buffer: String,
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line it completes, in order.
    ///
    /// Line separators are `\n`; a trailing `\r` is stripped so CRLF streams
    /// decode the same way.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        // buffer holds no separator yet, so only the new text needs scanning
        let scanned = self.buffer.len();
        self.decode_into_buffer(chunk);

        let Some(last) = self.buffer[scanned..].rfind('\n').map(|i| scanned + i) else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete[..last].split('\n').map(strip_cr).collect()
    }

    /// Emit the final buffered line, if any, and reset the decoder.
    ///
    /// Call once after the transport signals end-of-stream so a stream that
    /// ends without a trailing separator still yields its last line.
    pub fn flush(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending_bytes).into_owned();
            self.buffer.push_str(&tail);
            self.pending_bytes.clear();
        }

        let line = std::mem::take(&mut self.buffer);
        if line.is_empty() {
            None
        } else {
            Some(strip_cr(&line))
        }
    }

    /// Text currently held back as the incomplete trailing line
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append `chunk` to the pending bytes and move every decodable prefix
    /// into `buffer`. Invalid sequences become U+FFFD; an incomplete sequence
    /// at the end waits for the next chunk.
    fn decode_into_buffer(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);

        let mut consumed = 0;
        while consumed < self.pending_bytes.len() {
            let rest = &self.pending_bytes[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    consumed = self.pending_bytes.len();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        self.buffer.push_str(text);
                    }
                    consumed += valid;

                    match e.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                        None => break,
                    }
                }
            }
        }

        self.pending_bytes.drain(..consumed);
    }
}

fn strip_cr(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut decoder = FrameDecoder::new();
        let lines = decoder.feed(b"event: token\ndata: {}\n\n");
        assert_eq!(lines, vec!["event: token", "data: {}", ""]);
        assert_eq!(decoder.buffered(), "");
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = FrameDecoder::new();

        assert!(decoder.feed(b"event: to").is_empty());
        assert_eq!(decoder.buffered(), "event: to");

        let lines = decoder.feed(b"ken\ndata: {\"content\":");
        assert_eq!(lines, vec!["event: token"]);
        assert_eq!(decoder.buffered(), "data: {\"content\":");

        let lines = decoder.feed(b"\"a\"}\n");
        assert_eq!(lines, vec![r#"data: {"content":"a"}"#]);
    }

    #[test]
    fn test_split_exactly_before_separator() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: token").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec!["event: token"]);
    }

    #[test]
    fn test_multibyte_character_split() {
        // "é" is 0xC3 0xA9, "😀" is four bytes
        let bytes = "data: {\"content\":\"é😀\"}\n".as_bytes();
        let split_e = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&bytes[..split_e]).is_empty());
        // The lone lead byte is held back, never decoded as a replacement
        assert!(!decoder.buffered().contains('\u{FFFD}'));

        let emoji_mid = split_e + 1 + 2;
        assert!(decoder.feed(&bytes[split_e..emoji_mid]).is_empty());
        let lines = decoder.feed(&bytes[emoji_mid..]);
        assert_eq!(lines, vec!["data: {\"content\":\"é😀\"}"]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let input = "event: token\ndata: {\"content\":\"ünïcödé\"}\n\n";
        let mut decoder = FrameDecoder::new();
        let mut lines = Vec::new();
        for byte in input.as_bytes() {
            lines.extend(decoder.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(
            lines,
            vec!["event: token", "data: {\"content\":\"ünïcödé\"}", ""]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: done\r").is_empty());
        let lines = decoder.feed(b"\ndata: {}\r\n");
        assert_eq!(lines, vec!["event: done", "data: {}"]);
    }

    #[test]
    fn test_flush_emits_unterminated_line() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(b"event: done\ndata: {\"response\":\"R\"}"), vec!["event: done"]);
        assert_eq!(
            decoder.flush(),
            Some(r#"data: {"response":"R"}"#.to_string())
        );
        assert_eq!(decoder.flush(), None);
    }

    #[test]
    fn test_flush_on_empty_buffer() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"event: x\n");
        assert_eq!(decoder.flush(), None);
    }

    #[test]
    fn test_invalid_bytes_become_replacement() {
        let mut decoder = FrameDecoder::new();
        let lines = decoder.feed(b"data: \xFF\xFEok\n");
        assert_eq!(lines, vec!["data: \u{FFFD}\u{FFFD}ok"]);
    }

    #[test]
    fn test_truncated_character_at_end_of_stream() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"abc\xE2\x82");
        assert_eq!(decoder.flush(), Some("abc\u{FFFD}".to_string()));
    }

    #[test]
    fn test_empty_chunk() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"").is_empty());
        assert_eq!(decoder.buffered(), "");
    }

    #[test]
    fn test_long_line_fed_byte_at_a_time() {
        let payload = format!("data: {{\"content\": \"{}\"}}", "x".repeat(64 * 1024));
        let mut decoder = FrameDecoder::new();
        for byte in payload.as_bytes() {
            assert!(decoder.feed(std::slice::from_ref(byte)).is_empty());
        }
        assert_eq!(decoder.buffered().len(), payload.len());

        let lines = decoder.feed(b"\nevent: done");
        assert_eq!(lines, vec![payload]);
        assert_eq!(decoder.buffered(), "event: done");
    }
}
