//! Server replies as a line source.
//!
//! The transport hands over a complete reply body; this type walks it line
//! by line, decoding each line in the legacy codepage or UTF-8 as the reader
//! asks. Lines end at `0x0A`; a preceding `0x0D` is dropped.

use crate::error::ProtocolError;
use crate::frame::LINE_FEED;
use crate::text::{empty_to_none, safe_to_int, windows1251, LegacyCodec};
use bytes::Bytes;

const CARRIAGE_RETURN: u8 = 0x0D;

/// Number of lines in the standard reply header.
pub const HEADER_LINES: usize = 10;

/// Standard header preceding every reply payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Echo of the request command code.
    pub command: String,
    pub client_id: i32,
    pub query_id: i32,
    /// Payload size announced by the server.
    pub answer_size: i32,
    pub server_version: Option<String>,
    pub interval: i32,
}

/// A reply body being consumed line by line.
#[derive(Debug, Clone)]
pub struct Response {
    body: Bytes,
    position: usize,
    codec: &'static LegacyCodec,
}

impl Response {
    /// Wraps a reply body whose legacy lines use Windows-1251.
    pub fn new(body: Bytes) -> Self {
        Self::with_codec(windows1251(), body)
    }

    pub fn with_codec(codec: &'static LegacyCodec, body: Bytes) -> Self {
        Self {
            body,
            position: 0,
            codec,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.body.len()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.body.len().saturating_sub(self.position)
    }

    fn next_line(&mut self) -> Option<Bytes> {
        if self.is_eof() {
            return None;
        }

        let rest = &self.body[self.position..];
        let (line_len, consumed) = match rest.iter().position(|&b| b == LINE_FEED) {
            Some(pos) => (pos, pos + 1),
            None => (rest.len(), rest.len()),
        };

        let start = self.position;
        let mut end = start + line_len;
        if end > start && self.body[end - 1] == CARRIAGE_RETURN {
            end -= 1;
        }

        self.position += consumed;
        Some(self.body.slice(start..end))
    }

    /// Reads the next line in the legacy codepage.
    pub fn read_ansi(&mut self) -> Option<String> {
        self.next_line().map(|line| self.codec.decode(&line))
    }

    /// Reads the next line as UTF-8, replacing invalid sequences.
    pub fn read_utf(&mut self) -> Option<String> {
        self.next_line()
            .map(|line| String::from_utf8_lossy(&line).into_owned())
    }

    /// Reads the next line as an integer, or `default` when absent or
    /// malformed.
    pub fn read_int(&mut self, default: i32) -> i32 {
        let line = self.read_ansi();
        safe_to_int(line.as_deref(), default)
    }

    pub fn read_remaining_ansi_lines(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.read_ansi()).collect()
    }

    pub fn read_remaining_utf_lines(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.read_utf()).collect()
    }

    /// Consumes the standard header.
    pub fn read_header(&mut self) -> Result<ResponseHeader, ProtocolError> {
        let mut lines = Vec::with_capacity(HEADER_LINES);
        while lines.len() < HEADER_LINES {
            match self.read_ansi() {
                Some(line) => lines.push(line),
                None => {
                    return Err(ProtocolError::MalformedResponse {
                        expected: HEADER_LINES,
                        actual: lines.len(),
                    })
                }
            }
        }

        let header = ResponseHeader {
            command: lines[0].clone(),
            client_id: safe_to_int(lines[1].as_str(), 0),
            query_id: safe_to_int(lines[2].as_str(), 0),
            answer_size: safe_to_int(lines[3].as_str(), 0),
            server_version: empty_to_none(lines[4].as_str()).map(str::to_string),
            interval: safe_to_int(lines[5].as_str(), 0),
        };
        tracing::trace!(
            "Reply header: command {}, client {}, query {}, {} bytes",
            header.command,
            header.client_id,
            header.query_id,
            header.answer_size
        );
        Ok(header)
    }

    /// Reads the return code line.
    pub fn return_code(&mut self) -> i32 {
        self.read_int(0)
    }

    /// Reads the return code and fails on negative codes not listed in
    /// `allowed`.
    pub fn check_return_code(&mut self, allowed: &[i32]) -> Result<i32, ProtocolError> {
        let code = self.return_code();
        if code < 0 && !allowed.contains(&code) {
            tracing::debug!("Server returned error code {}", code);
            return Err(ProtocolError::ServerError { code });
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::cp866;

    fn reply(text: &[u8]) -> Response {
        Response::new(Bytes::copy_from_slice(text))
    }

    #[test]
    fn test_lines_split_on_lf_and_crlf() {
        let mut response = reply(b"one\r\ntwo\nthree");
        assert_eq!(
            response.read_remaining_ansi_lines(),
            vec!["one", "two", "three"]
        );
        assert!(response.is_eof());
        assert_eq!(response.read_ansi(), None);
    }

    #[test]
    fn test_trailing_terminator_adds_no_line() {
        let mut response = reply(b"a\r\n\r\nb\r\n");
        assert_eq!(response.read_remaining_ansi_lines(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_body() {
        let mut response = reply(b"");
        assert!(response.is_eof());
        assert!(response.read_remaining_ansi_lines().is_empty());
        assert_eq!(response.read_int(9), 9);
    }

    #[test]
    fn test_mixed_encodings() {
        let mut body = windows1251().encode("Каталог");
        body.push(LINE_FEED);
        body.extend_from_slice("Каталог".as_bytes());
        body.push(LINE_FEED);

        let mut response = Response::new(Bytes::from(body));
        assert_eq!(response.read_ansi().as_deref(), Some("Каталог"));
        assert_eq!(response.read_utf().as_deref(), Some("Каталог"));
    }

    #[test]
    fn test_custom_codec() {
        let mut body = cp866().encode("Ёж");
        body.push(LINE_FEED);
        let mut response = Response::with_codec(cp866(), Bytes::from(body));
        assert_eq!(response.read_remaining_ansi_lines(), vec!["Ёж"]);
    }

    #[test]
    fn test_read_int_and_remaining() {
        let mut response = reply(b"12\r\nxx\r\n");
        assert_eq!(response.remaining(), 8);
        assert_eq!(response.read_int(0), 12);
        assert_eq!(response.read_int(-1), -1);
        assert_eq!(response.remaining(), 0);
    }

    #[test]
    fn test_read_header() {
        let mut response =
            reply(b"1\r\n123\r\n7\r\n42\r\n64.2014\r\n1\r\n\r\n\r\n\r\n\r\n0\r\nbody\r\n");
        let header = response.read_header().unwrap();
        assert_eq!(header.command, "1");
        assert_eq!(header.client_id, 123);
        assert_eq!(header.query_id, 7);
        assert_eq!(header.answer_size, 42);
        assert_eq!(header.server_version.as_deref(), Some("64.2014"));
        assert_eq!(header.interval, 1);

        assert_eq!(response.check_return_code(&[]).unwrap(), 0);
        assert_eq!(response.read_ansi().as_deref(), Some("body"));
    }

    #[test]
    fn test_read_header_too_short() {
        let mut response = reply(b"1\r\n123\r\n");
        assert!(matches!(
            response.read_header(),
            Err(ProtocolError::MalformedResponse {
                expected: HEADER_LINES,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_check_return_code() {
        let mut response = reply(b"-140\r\n");
        assert!(matches!(
            response.check_return_code(&[]),
            Err(ProtocolError::ServerError { code: -140 })
        ));

        let mut response = reply(b"-140\r\n");
        assert_eq!(response.check_return_code(&[-140]).unwrap(), -140);

        let mut response = reply(b"5\r\n");
        assert_eq!(response.check_return_code(&[]).unwrap(), 5);
    }
}
