//! The `gites normalize` command.

use clap::Args;
use gites_core::{Config, Gites, ImageRequest, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::types::OutputFormat;

/// Arguments for the `normalize` command.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Image files to normalize
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Execute the normalize command.
pub async fn execute(args: NormalizeArgs, config: Config) -> anyhow::Result<()> {
    let normalizer = Gites::new(config).normalizer();

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), true);

    let mut failed = 0;
    for path in &args.files {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to read {:?}: {}", path, e);
                failed += 1;
                continue;
            }
        };

        let request = ImageRequest::from_bytes(display_name(path), &bytes);
        match normalizer.normalize(&request).await {
            Ok(result) => {
                tracing::info!(
                    "{} -> {}x{} (~{} bytes)",
                    result.filename,
                    result.width,
                    result.height,
                    result.size
                );
                writer.write(&result)?;
            }
            Err(e) => {
                tracing::error!("{}", e);
                failed += 1;
            }
        }
    }

    let succeeded = writer.written();
    if let Some(path) = &args.output {
        tracing::info!("Wrote {} results to {:?}", succeeded, path);
    }
    if succeeded == 0 {
        anyhow::bail!("No image could be normalized ({} failed)", failed);
    }
    if failed > 0 {
        tracing::warn!("{} of {} images failed", failed, args.files.len());
    }
    Ok(())
}

/// Filename reported back in the result, as the upload would carry it.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
