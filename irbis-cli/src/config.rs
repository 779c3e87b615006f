//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via IRBIS_CONFIG or --config)
//! 3. Environment variables

use irbis_protocol::connection::DEFAULT_WORKSTATION;
use irbis_protocol::{CodePage, Connection, LegacyCodec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Client id used when none is configured.
pub const DEFAULT_CLIENT_ID: i32 = 100_000;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity written into request preambles.
    pub connection: ConnectionConfig,
    /// Codepage settings.
    pub encoding: EncodingConfig,
}

impl Config {
    /// Loads configuration from `path` (or IRBIS_CONFIG), then applies
    /// environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("IRBIS_CONFIG").map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let config = Self::from_file(&path)?;
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// normal use).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.connection.apply_overrides(&lookup);
        self.encoding.apply_overrides(&lookup);
    }

    /// Copy suitable for printing: the password is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.connection.password.is_empty() {
            config.connection.password = "<redacted>".to_string();
        }
        config
    }
}

/// Identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Workstation (ARM) code.
    pub workstation: String,
    /// Client id written into every request.
    pub client_id: i32,
    pub username: String,
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            workstation: DEFAULT_WORKSTATION.to_string(),
            client_id: DEFAULT_CLIENT_ID,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ConnectionConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workstation) = lookup("IRBIS_WORKSTATION") {
            self.workstation = workstation;
        }

        if let Some(id) = lookup("IRBIS_CLIENT_ID") {
            match id.parse() {
                Ok(id) => self.client_id = id,
                Err(_) => tracing::warn!("Ignoring invalid IRBIS_CLIENT_ID: {}", id),
            }
        }

        if let Some(username) = lookup("IRBIS_USERNAME") {
            self.username = username;
        }

        if let Some(password) = lookup("IRBIS_PASSWORD") {
            self.password = password;
        }
    }

    /// Builds the protocol identity record.
    pub fn to_connection(&self) -> Connection {
        Connection::new(self.client_id)
            .with_workstation(self.workstation.as_str())
            .with_credentials(self.username.as_str(), self.password.as_str())
    }
}

/// Codepage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Codepage for legacy (ANSI) fields.
    pub ansi: CodePage,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            ansi: CodePage::Windows1251,
        }
    }
}

impl EncodingConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("IRBIS_CODEPAGE") {
            match name.parse() {
                Ok(code_page) => self.ansi = code_page,
                Err(e) => tracing::warn!("Ignoring IRBIS_CODEPAGE: {}", e),
            }
        }
    }

    pub fn codec(&self) -> &'static LegacyCodec {
        self.ansi.codec()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    IoError(PathBuf, std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, String),
}
