//! Protocol error types.

use std::num::ParseIntError;
use thiserror::Error;

/// Errors that can occur while encoding requests or decoding server replies.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid path code in file specification {text:?}: {source}")]
    InvalidPathCode {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("malformed response: expected at least {expected} lines, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },

    #[error("server returned error code {code}")]
    ServerError { code: i32 },

    #[error("unsupported code page: {0}")]
    UnsupportedCodePage(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ProtocolError {
    /// Returns whether the error was reported by the server rather than
    /// raised while decoding locally.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ProtocolError::ServerError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_server_error() {
        assert!(ProtocolError::ServerError { code: -140 }.is_server_error());

        assert!(!ProtocolError::MissingField("file_name").is_server_error());
        assert!(!ProtocolError::MalformedResponse {
            expected: 3,
            actual: 1
        }
        .is_server_error());
        assert!(!ProtocolError::UnsupportedCodePage("437".into()).is_server_error());
    }

    #[test]
    fn test_protocol_error_display() {
        let source = "x".parse::<i32>().unwrap_err();
        let err = ProtocolError::InvalidPathCode {
            text: "x..file".into(),
            source,
        };
        assert!(err.to_string().contains("x..file"));

        let err = ProtocolError::MalformedResponse {
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));

        let err = ProtocolError::ServerError { code: -3333 };
        assert!(err.to_string().contains("-3333"));

        let err = ProtocolError::UnsupportedCodePage("437".into());
        assert!(err.to_string().contains("437"));

        let err = ProtocolError::MissingField("database");
        assert!(err.to_string().contains("database"));
    }
}
