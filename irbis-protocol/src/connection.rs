//! Client identity carried in every request preamble.

use std::fmt;

/// Default workstation code (cataloguer).
pub const DEFAULT_WORKSTATION: &str = "C";

/// Identity fields the request preamble is built from.
///
/// The transport owns the socket; this only tracks who is asking and the
/// per-request sequence number.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    /// Workstation (ARM) code, e.g. `C` for cataloguer or `R` for reader.
    pub workstation: String,
    /// Client id assigned at registration.
    pub client_id: i32,
    /// Sequence number of the current request.
    pub query_id: i32,
    pub username: String,
    pub password: String,
}

impl Connection {
    pub fn new(client_id: i32) -> Self {
        Self {
            workstation: DEFAULT_WORKSTATION.to_string(),
            client_id,
            query_id: 0,
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn with_workstation(mut self, workstation: impl Into<String>) -> Self {
        self.workstation = workstation.into();
        self
    }

    pub fn with_client_id(mut self, client_id: i32) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_query_id(mut self, query_id: i32) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Advances the query counter and returns the id for the next request.
    pub fn next_query_id(&mut self) -> i32 {
        self.query_id = self.query_id.wrapping_add(1);
        self.query_id
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("workstation", &self.workstation)
            .field("client_id", &self.client_id)
            .field("query_id", &self.query_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let conn = Connection::new(123)
            .with_workstation("R")
            .with_query_id(5)
            .with_credentials("librarian", "secret");

        assert_eq!(conn.workstation, "R");
        assert_eq!(conn.client_id, 123);
        assert_eq!(conn.query_id, 5);
        assert_eq!(conn.username, "librarian");
        assert_eq!(conn.password, "secret");
    }

    #[test]
    fn test_defaults() {
        let conn = Connection::default();
        assert_eq!(conn.workstation, DEFAULT_WORKSTATION);
        assert_eq!(conn.query_id, 0);
    }

    #[test]
    fn test_next_query_id() {
        let mut conn = Connection::new(1);
        assert_eq!(conn.next_query_id(), 1);
        assert_eq!(conn.next_query_id(), 2);
        assert_eq!(conn.query_id, 2);
    }

    #[test]
    fn test_debug_redacts_password() {
        let conn = Connection::new(1).with_credentials("user", "hunter2");
        let debug = format!("{:?}", conn);
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
