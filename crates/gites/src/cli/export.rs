//! The `gites export` command.

use clap::Args;
use gites_core::{Config, DocumentSink, Gites, GroupId};
use std::path::PathBuf;

/// Arguments for the `export` command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory holding one sub-directory of captures per group
    #[arg(required = true)]
    pub root: PathBuf,

    /// Group to export
    #[arg(short, long)]
    pub group: String,

    /// Output file (defaults to <export.output_dir>/<group>.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the export command.
pub async fn execute(args: ExportArgs, config: Config) -> anyhow::Result<()> {
    let gites = Gites::new(config);
    let group = GroupId::new(args.group);

    let document = gites
        .directory_exporter(&args.root)
        .export(&group)
        .await?;

    let path = match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &document.bytes)?;
            path
        }
        None => gites.file_sink().present(&document)?,
    };

    if document.element_count == 0 {
        tracing::warn!("Group {} has no captures; wrote a blank page", group);
    }
    println!("{}", path.display());
    Ok(())
}
