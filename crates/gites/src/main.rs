//! Gites CLI - local front end for the gites booking and admin services.
//!
//! Runs the same services the UI ports reach: upload normalization, PDF
//! export of element groups, auth token storage, boot flags, and a stdio
//! adapter speaking the port protocol.
//!
//! # Usage
//!
//! ```bash
//! # Normalize uploads into preview + thumbnail data URIs
//! gites normalize pool.jpg terrace.png --format jsonl
//!
//! # Export a group of captures to PDF
//! gites export ./captures --group calendar
//!
//! # Drive the bridge over stdin/stdout
//! gites ports --role guest
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Gites - image normalization, PDF export and UI port bridge.
#[derive(Parser, Debug)]
#[command(name = "gites")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize images into a bounded preview and a square thumbnail
    Normalize(cli::normalize::NormalizeArgs),

    /// Export a group of captures as a multi-page PDF
    Export(cli::export::ExportArgs),

    /// Read or change the stored auth token
    Auth(cli::auth::AuthArgs),

    /// Print the start-up flags for a UI application
    Boot(cli::boot::BootArgs),

    /// Serve the UI ports over stdin/stdout
    Ports(cli::ports::PortsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match gites_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `gites config path`."
            );
            gites_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Gites v{}", gites_core::VERSION);

    match cli.command {
        Commands::Normalize(args) => cli::normalize::execute(args, config).await,
        Commands::Export(args) => cli::export::execute(args, config).await,
        Commands::Auth(args) => cli::auth::execute(args, config),
        Commands::Boot(args) => cli::boot::execute(args),
        Commands::Ports(args) => cli::ports::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
