//! File specifications: textual addresses of server-side resources.
//!
//! ```text
//! spec     := pathcode "." database? "." filename
//! filename := ("@")? text ("&" content)?
//! ```
//!
//! For the system and data paths the database segment is empty, giving
//! `0..name` and `1..name`.

use crate::error::ProtocolError;
use crate::text::{empty_to_none, same_string, simple_uppercase, windows_to_irbis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Server path code. Codes outside the named set are preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKind(i32);

impl PathKind {
    /// System-wide path.
    pub const SYSTEM: Self = Self(0);
    /// Location of the server's database descriptions.
    pub const DATA: Self = Self(1);
    /// Database master file.
    pub const MASTER_FILE: Self = Self(2);
    /// Database dictionary (inverted file).
    pub const DICTIONARY: Self = Self(3);
    /// Database parameter files.
    pub const PARAMETER: Self = Self(10);
    /// Full-text storage.
    pub const FULL_TEXT: Self = Self(11);
    /// Server internal resources.
    pub const INTERNAL_RESOURCE: Self = Self(12);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Whether the textual form leaves the database segment empty.
    pub fn omits_database(&self) -> bool {
        *self == Self::SYSTEM || *self == Self::DATA
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("system"),
            1 => Some("data"),
            2 => Some("master_file"),
            3 => Some("dictionary"),
            10 => Some("parameter"),
            11 => Some("full_text"),
            12 => Some("internal_resource"),
            _ => None,
        }
    }
}

impl From<i32> for PathKind {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Address of a file on the server, optionally carrying content to write.
///
/// Equality ignores letter case in `database` and `file_name` and treats an
/// empty database as absent. `is_binary` and `content` do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSpecification {
    pub path: PathKind,
    pub database: Option<String>,
    pub file_name: String,
    pub is_binary: bool,
    pub content: Option<String>,
}

impl FileSpecification {
    pub fn new(path: PathKind, database: impl Into<String>, file_name: impl Into<String>) -> Self {
        let database = database.into();
        Self {
            path,
            database: (!database.is_empty()).then_some(database),
            file_name: file_name.into(),
            is_binary: false,
            content: None,
        }
    }

    pub fn system(file_name: impl Into<String>) -> Self {
        Self::new(PathKind::SYSTEM, "", file_name)
    }

    pub fn data(file_name: impl Into<String>) -> Self {
        Self::new(PathKind::DATA, "", file_name)
    }

    pub fn with_binary(mut self) -> Self {
        self.is_binary = true;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Database name, treating an empty string as absent.
    pub fn database(&self) -> Option<&str> {
        empty_to_none(self.database.as_deref())
    }

    /// Parses the textual form.
    ///
    /// Only the path code is validated. The binary marker is stripped before
    /// the remainder is split at the first `&`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let mut parts = text.splitn(3, '.');
        let code = parts.next().unwrap_or_default();
        let code = code
            .trim()
            .parse::<i32>()
            .map_err(|source| ProtocolError::InvalidPathCode {
                text: text.to_string(),
                source,
            })?;
        let database = empty_to_none(parts.next()).map(str::to_string);

        let mut remainder = parts.next().unwrap_or_default();
        let is_binary = match remainder.strip_prefix('@') {
            Some(rest) => {
                remainder = rest;
                true
            }
            None => false,
        };

        let (file_name, content) = match remainder.split_once('&') {
            Some((name, content)) => (name, Some(content.to_string())),
            None => (remainder, None),
        };

        Ok(Self {
            path: PathKind(code),
            database,
            file_name: file_name.to_string(),
            is_binary,
            content,
        })
    }

    /// Checks the fields a request needs: a file name, and a database for
    /// every path other than system and data.
    pub fn verify(&self) -> Result<(), ProtocolError> {
        if self.file_name.is_empty() {
            return Err(ProtocolError::MissingField("file_name"));
        }
        if !self.path.omits_database() && self.database().is_none() {
            return Err(ProtocolError::MissingField("database"));
        }
        Ok(())
    }
}

impl FromStr for FileSpecification {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FileSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Binary and content markers share one slot; binary takes it.
        let marker = if self.is_binary {
            "@"
        } else if self.content.is_some() {
            "&"
        } else {
            ""
        };

        if self.path.omits_database() {
            write!(f, "{}..{}{}", self.path.code(), marker, self.file_name)?;
        } else {
            write!(
                f,
                "{}.{}.{}{}",
                self.path.code(),
                self.database.as_deref().unwrap_or_default(),
                marker,
                self.file_name
            )?;
        }

        if let Some(content) = &self.content {
            write!(f, "&{}", windows_to_irbis(content))?;
        }
        Ok(())
    }
}

impl PartialEq for FileSpecification {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && same_string(self.database(), other.database())
            && same_string(self.file_name.as_str(), other.file_name.as_str())
    }
}

impl Eq for FileSpecification {}

impl Hash for FileSpecification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        hash_ignore_case(self.database().unwrap_or_default(), state);
        hash_ignore_case(&self.file_name, state);
    }
}

fn hash_ignore_case<H: Hasher>(text: &str, state: &mut H) {
    for c in text.chars().map(simple_uppercase) {
        c.hash(state);
    }
    state.write_u8(0xFF);
}
