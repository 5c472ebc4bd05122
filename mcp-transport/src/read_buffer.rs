use mcp_types::JSONRPCMessage;

use crate::error::TransportError;

/// Accumulates raw bytes from a duplex stream and extracts one complete,
/// newline-delimited JSON-RPC message at a time.
///
/// A trailing `\r` immediately before the `\n` is stripped so CRLF- and
/// LF-terminated peers decode identically.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    buffer: Vec<u8>,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of freshly-read bytes.
    pub fn append(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Extracts and decodes exactly one line, if a full one is buffered.
    ///
    /// Returns `Ok(None)` when no complete line is available yet. A decode
    /// failure consumes the offending line (so the buffer doesn't get stuck)
    /// and is reported as `Err`.
    pub fn read_message(&mut self) -> Result<Option<JSONRPCMessage>, TransportError> {
        let newline_at = match self.buffer.iter().position(|&b| b == b'\n') {
            Some(index) => index,
            None => return Ok(None),
        };

        let mut line: Vec<u8> = self.buffer.drain(..=newline_at).collect();
        line.pop(); // drop the '\n'
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let message = serde_json::from_slice::<JSONRPCMessage>(&line)
            .map_err(TransportError::Decode)?;
        Ok(Some(message))
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn returns_none_until_a_full_line_is_buffered() {
        let mut buf = ReadBuffer::new();
        buf.append(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"meth");
        assert!(buf.read_message().unwrap().is_none());
        buf.append(b"od\":\"ping\"}\n");
        let msg = buf.read_message().unwrap();
        assert!(matches!(msg, Some(JSONRPCMessage::Request(_))));
    }

    #[test]
    fn strips_trailing_cr_before_newline() {
        let mut buf = ReadBuffer::new();
        buf.append(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\r\n");
        let msg = buf.read_message().unwrap();
        assert!(matches!(msg, Some(JSONRPCMessage::Notification(_))));
        assert!(buf.read_message().unwrap().is_none());
    }

    #[test]
    fn extracts_multiple_queued_lines_one_at_a_time() {
        let mut buf = ReadBuffer::new();
        buf.append(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");
        let first = buf.read_message().unwrap().expect("first message");
        let second = buf.read_message().unwrap().expect("second message");
        assert_ne!(first, second);
        assert!(buf.read_message().unwrap().is_none());
    }

    #[test]
    fn decode_error_consumes_the_bad_line_without_poisoning_the_buffer() {
        let mut buf = ReadBuffer::new();
        buf.append(b"not json\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        assert!(buf.read_message().is_err());
        let msg = buf.read_message().unwrap();
        assert!(matches!(msg, Some(JSONRPCMessage::Request(_))));
    }

    #[test]
    fn clear_drops_unprocessed_bytes() {
        let mut buf = ReadBuffer::new();
        buf.append(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"meth");
        buf.clear();
        buf.append(b"od\":\"ping\"}\n");
        assert!(buf.read_message().unwrap().is_none());
    }
}
