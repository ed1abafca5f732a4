/// Incremental `text/event-stream` decoder.
///
/// Only `data:` fields matter here. Comment lines (`: ...`) and other fields such as
/// the server's `ping:` keep-alives are ignored. Bytes are buffered until a full line
/// is available, so chunk boundaries may fall anywhere, including inside a UTF-8
/// sequence.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the data payload of every event completed by them.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        for &byte in chunk {
            if byte != b'\n' {
                self.line.push(byte);
                continue;
            }
            let mut line = std::mem::take(&mut self.line);
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.process_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let payload = self.data.join("\n");
            self.data.clear();
            return Some(payload);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"id\":\"1\"}\n\n");
        assert_eq!(events, vec![r#"{"id":"1"}"#.to_string()]);
    }

    #[test]
    fn test_ping_and_comments_ignored() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"ping: \n\n: keep-alive\n\nerror: boom\n\ndata: 1\n\n");
        assert_eq!(events, vec!["1".to_string()]);
    }

    #[test]
    fn test_multiline_data_and_crlf() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: first\r\ndata: second\r\n\r\n");
        assert_eq!(events, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let frame = "data: {\"content\":\"héllo\"}\n\n".as_bytes();
        let (a, b) = frame.split_at(20); // inside the two-byte 'é'
        assert!(decoder.feed(a).is_empty());
        assert_eq!(decoder.feed(b), vec![r#"{"content":"héllo"}"#.to_string()]);
    }

    #[test]
    fn test_several_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: a\n\ndata: b\n\ndata: c");
        assert_eq!(events, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(decoder.feed(b"\n\n"), vec!["c".to_string()]);
    }
}
