//! irbis-cli - Diagnostic tool for the IRBIS64 wire encoding
//!
//! Builds request frames, inspects file specifications and decodes captured
//! server replies without talking to a server.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::FieldArg;
use config::Config;
use irbis_protocol::CodePage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "irbis-cli")]
#[command(about = "Diagnostic tool for the IRBIS64 wire encoding")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration
    #[arg(long, env = "IRBIS_CONFIG")]
    config: Option<PathBuf>,

    /// Codepage for legacy fields (cp866, windows-1251)
    #[arg(long)]
    codepage: Option<CodePage>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a request frame and print its bytes
    Frame {
        /// Command code
        #[arg(short, long)]
        command: String,

        /// Query id (defaults to the next id for the configured client)
        #[arg(short, long)]
        query_id: Option<i32>,

        /// Field to append, in order: a:TEXT (legacy), u:TEXT (UTF-8), i:NUMBER
        #[arg(short, long = "field")]
        fields: Vec<FieldArg>,
    },

    /// Parse a file specification and render it back
    Spec {
        /// Specification text, e.g. 2.IBIS.brief.pft
        text: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a captured server version reply
    ServerVersion {
        /// Reply body (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Body starts with the standard reply header and return code
        #[arg(long)]
        header: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Also write it as YAML to this path (the password is left out)
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(code_page) = cli.codepage {
        config.encoding.ansi = code_page;
    }

    match commands::execute(&config, cli.command) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
