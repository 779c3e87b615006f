//! Command execution.

use crate::config::Config;
use crate::Commands;
use bytes::Bytes;
use colored::Colorize;
use irbis_protocol::{
    Connection, FileSpecification, LegacyCodec, RequestFrame, Response, ServerVersion,
};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A frame field given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldArg {
    Ansi(String),
    Utf8(String),
    Int(i32),
}

impl FromStr for FieldArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("a", text)) => Ok(FieldArg::Ansi(text.to_string())),
            Some(("u", text)) => Ok(FieldArg::Utf8(text.to_string())),
            Some(("i", number)) => number
                .parse()
                .map(FieldArg::Int)
                .map_err(|e| format!("invalid integer field '{}': {}", number, e)),
            _ => Err(format!(
                "invalid field '{}': expected a:TEXT, u:TEXT or i:NUMBER",
                s
            )),
        }
    }
}

/// Executes a command and returns the formatted output.
pub fn execute(config: &Config, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Frame {
            command,
            query_id,
            fields,
        } => {
            let mut connection = config.connection.to_connection();
            match query_id {
                Some(id) => connection.query_id = id,
                None => {
                    connection.next_query_id();
                }
            }

            let frame = build_frame(config.encoding.codec(), &connection, &command, &fields);
            let mut dump = Vec::new();
            frame.debug_dump(&mut dump)?;

            Ok(format!(
                "{} {} ({} bytes)\n{}",
                "Frame".bold(),
                command.cyan(),
                frame.byte_length(),
                String::from_utf8(dump)?
            ))
        }

        Commands::Spec { text, json } => {
            let spec = FileSpecification::parse(&text)?;
            if json {
                Ok(serde_json::to_string_pretty(&spec)?)
            } else {
                Ok(describe_spec(&spec))
            }
        }

        Commands::ServerVersion { file, header, json } => {
            let body = read_body(file.as_deref())?;
            let version = decode_server_version(config.encoding.codec(), body, header)?;
            if json {
                Ok(serde_json::to_string_pretty(&version)?)
            } else {
                Ok(version.to_string())
            }
        }

        Commands::Config { write } => {
            if let Some(path) = write {
                let mut saved = config.clone();
                saved.connection.password.clear();
                saved.save(&path)?;
                tracing::info!("Wrote config to {}", path.display());
            }
            Ok(serde_yaml::to_string(&config.redacted())?)
        }
    }
}

/// Builds a frame with the fields appended in the order given.
pub fn build_frame(
    codec: &'static LegacyCodec,
    connection: &Connection,
    command: &str,
    fields: &[FieldArg],
) -> RequestFrame {
    let mut frame = RequestFrame::with_codec(codec, connection, command);
    for field in fields {
        match field {
            FieldArg::Ansi(text) => frame.add_ansi(text.as_str()),
            FieldArg::Utf8(text) => frame.add_utf8(text.as_str()),
            FieldArg::Int(value) => frame.add_int(*value),
        };
    }
    frame
}

/// Decodes a captured reply body, optionally preceded by the reply header.
pub fn decode_server_version(
    codec: &'static LegacyCodec,
    body: Bytes,
    with_header: bool,
) -> Result<ServerVersion, irbis_protocol::ProtocolError> {
    let mut response = Response::with_codec(codec, body);
    if with_header {
        response.read_header()?;
        response.check_return_code(&[])?;
    }
    ServerVersion::parse(&mut response)
}

fn describe_spec(spec: &FileSpecification) -> String {
    let verified = match spec.verify() {
        Ok(()) => "ok".green().to_string(),
        Err(e) => e.to_string().yellow().to_string(),
    };

    format!(
        "{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}\n{:<10} {}",
        "path:",
        spec.path,
        "database:",
        spec.database().unwrap_or("-"),
        "file:",
        spec.file_name,
        "binary:",
        spec.is_binary,
        "content:",
        spec.content.as_deref().unwrap_or("-"),
        "rendered:",
        spec.to_string().cyan(),
        "verify:",
        verified
    )
}

fn read_body(file: Option<&Path>) -> std::io::Result<Bytes> {
    let data = match file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;
            data
        }
    };
    Ok(Bytes::from(data))
}
