//! Command codes used by the tooling. Frames accept any code; this is not a
//! catalogue of the server's command set.

/// Register the client with the server.
pub const REGISTER_CLIENT: &str = "A";

/// Unregister the client.
pub const UNREGISTER_CLIENT: &str = "B";

/// Ask for server version and client counts.
pub const SERVER_VERSION: &str = "1";

/// Keep-alive.
pub const NOP: &str = "N";
