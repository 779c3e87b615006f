//! Outgoing request frames.
//!
//! A frame is a sequence of fields, each written as encoded bytes followed by
//! a single line feed (`0x0A`, no carriage return):
//!
//! ```text
//! command \n workstation \n command \n client_id \n query_id \n
//! password \n username \n \n \n
//! field \n field \n ...
//! ```
//!
//! The preamble is always in the legacy codepage. Later fields are encoded
//! as the caller chooses; nothing in the bytes records which encoding a
//! field used.

use crate::connection::Connection;
use crate::file_spec::FileSpecification;
use crate::text::{utf8_encode, windows1251, InvariantString, LegacyCodec};
use bytes::{BufMut, Bytes, BytesMut};
use std::io;

/// Field terminator.
pub const LINE_FEED: u8 = 0x0A;

/// Initial buffer capacity; most requests fit without reallocating.
const INITIAL_CAPACITY: usize = 1024;

/// One outgoing request under construction.
#[derive(Debug)]
pub struct RequestFrame {
    buffer: BytesMut,
    codec: &'static LegacyCodec,
}

impl RequestFrame {
    /// Starts a frame whose legacy fields use Windows-1251.
    pub fn new(connection: &Connection, command: &str) -> Self {
        Self::with_codec(windows1251(), connection, command)
    }

    /// Starts a frame with an explicit legacy codec.
    pub fn with_codec(codec: &'static LegacyCodec, connection: &Connection, command: &str) -> Self {
        tracing::trace!(
            "Building {} request (client {}, query {})",
            command,
            connection.client_id,
            connection.query_id
        );

        let mut frame = Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            codec,
        };
        frame
            .add_ansi(command)
            .add_ansi(connection.workstation.as_str())
            .add_ansi(command)
            .add_int(connection.client_id)
            .add_int(connection.query_id)
            .add_ansi(connection.password.as_str())
            .add_ansi(connection.username.as_str())
            .new_line()
            .new_line();
        frame
    }

    /// Appends an integer as a legacy-encoded decimal line.
    pub fn add_int(&mut self, value: i32) -> &mut Self {
        self.add_ansi(value.to_invariant_string().as_str())
    }

    /// Appends a legacy-encoded line. Absent text is written as empty.
    pub fn add_ansi<'a>(&mut self, text: impl Into<Option<&'a str>>) -> &mut Self {
        let bytes = self.codec.encode(text.into().unwrap_or_default());
        self.buffer.put_slice(&bytes);
        self.new_line()
    }

    /// Appends a UTF-8 line. Absent text is written as empty.
    pub fn add_utf8<'a>(&mut self, text: impl Into<Option<&'a str>>) -> &mut Self {
        self.buffer
            .put_slice(&utf8_encode(text.into().unwrap_or_default()));
        self.new_line()
    }

    /// Appends a file specification in its textual form.
    pub fn add_file_spec(&mut self, spec: &FileSpecification) -> &mut Self {
        self.add_ansi(spec.to_string().as_str())
    }

    /// Appends a bare line feed.
    pub fn new_line(&mut self) -> &mut Self {
        self.buffer.put_u8(LINE_FEED);
        self
    }

    /// Returns a copy of the bytes written so far.
    pub fn finished_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer)
    }

    /// Consumes the frame, returning its bytes without copying.
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    pub fn byte_length(&self) -> usize {
        self.buffer.len()
    }

    /// Writes every byte as two uppercase hex digits, space-separated.
    pub fn debug_dump<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for (i, b) in self.buffer.iter().enumerate() {
            if i > 0 {
                writer.write_all(b" ")?;
            }
            write!(writer, "{:02X}", b)?;
        }
        Ok(())
    }
}
