//! Server version reply.
//!
//! Newer servers answer with four lines (organization, version, connected
//! clients, client limit); older ones leave out the organization.

use crate::error::ProtocolError;
use crate::response::Response;
use crate::text::safe_to_int;
use serde::Serialize;
use std::fmt;

/// Placeholder rendered for absent text fields.
const ABSENT: &str = "(null)";

/// Layout of a server version reply, chosen by line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Organization, version, connected clients, max clients.
    WithOrganization,
    /// Version, connected clients, max clients.
    Plain,
}

impl ResponseShape {
    /// Minimum number of lines any shape needs.
    pub const MIN_LINES: usize = 3;

    pub fn detect(line_count: usize) -> Result<Self, ProtocolError> {
        match line_count {
            n if n >= 4 => Ok(ResponseShape::WithOrganization),
            3 => Ok(ResponseShape::Plain),
            actual => Err(ProtocolError::MalformedResponse {
                expected: Self::MIN_LINES,
                actual,
            }),
        }
    }
}

/// Parsed server version information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerVersion {
    pub organization: Option<String>,
    pub version: Option<String>,
    pub max_clients: i32,
    pub connected_clients: i32,
}

impl ServerVersion {
    /// Reads all remaining legacy-encoded lines of the reply.
    pub fn parse(response: &mut Response) -> Result<Self, ProtocolError> {
        let lines = response.read_remaining_ansi_lines();
        Self::from_lines(&lines)
    }

    pub fn from_lines(lines: &[String]) -> Result<Self, ProtocolError> {
        let shape = ResponseShape::detect(lines.len())?;
        tracing::debug!("Server version reply: {} lines, {:?}", lines.len(), shape);

        let result = match shape {
            ResponseShape::WithOrganization => Self {
                organization: Some(lines[0].clone()),
                version: Some(lines[1].clone()),
                connected_clients: safe_to_int(lines[2].as_str(), 0),
                max_clients: safe_to_int(lines[3].as_str(), 0),
            },
            ResponseShape::Plain => Self {
                organization: None,
                version: Some(lines[0].clone()),
                connected_clients: safe_to_int(lines[1].as_str(), 0),
                max_clients: safe_to_int(lines[2].as_str(), 0),
            },
        };
        Ok(result)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Version: {}, MaxClients: {}, ConnectedClients: {}, Organization: {}",
            self.version.as_deref().unwrap_or(ABSENT),
            self.max_clients,
            self.connected_clients,
            self.organization.as_deref().unwrap_or(ABSENT)
        )
    }
}
