//! # irbis-protocol
//!
//! Wire encoding for the IRBIS64 client protocol.
//!
//! This crate provides:
//! - Request frames: line-feed terminated fields in a legacy codepage or UTF-8
//! - File specifications: parsing and rendering of server resource addresses
//! - Reply decoding: a line source over reply bodies and the server version parser
//! - Codepage, case-insensitive comparison and lenient number helpers
//!
//! Sockets, sessions and retries live outside this crate.

pub mod command;
pub mod connection;
pub mod error;
pub mod file_spec;
pub mod frame;
pub mod response;
pub mod server_version;
pub mod text;

pub use connection::Connection;
pub use error::ProtocolError;
pub use file_spec::{FileSpecification, PathKind};
pub use frame::{RequestFrame, LINE_FEED};
pub use response::{Response, ResponseHeader};
pub use server_version::{ResponseShape, ServerVersion};
pub use text::{cp866, windows1251, CodePage, LegacyCodec};
