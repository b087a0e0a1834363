//! CLI enum types shared across commands: output format and app role.

use clap::ValueEnum;
use gites_core::{OutputFormat as CoreOutputFormat, Role};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One pretty JSON document per result
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Which UI application to act as.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    /// Back-office app
    Admin,
    /// Public booking app
    Guest,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Guest => Role::Guest,
        }
    }
}
