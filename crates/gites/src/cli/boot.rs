//! The `gites boot` command.

use clap::Args;
use gites_core::BootFlags;

use super::types::RoleArg;

/// Arguments for the `boot` command.
#[derive(Args, Debug)]
pub struct BootArgs {
    /// Application the flags are for
    #[arg(short, long, value_enum, default_value = "guest")]
    pub role: RoleArg,

    /// Viewport width in CSS pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value = "800")]
    pub height: u32,
}

pub fn execute(args: BootArgs) -> anyhow::Result<()> {
    let flags = BootFlags::new(args.role.into(), args.width, args.height);
    println!("{}", serde_json::to_string_pretty(&flags)?);
    Ok(())
}
