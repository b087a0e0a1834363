//! The `gites auth` command, a shell view of the admin app's token store.

use clap::{Args, Subcommand};
use gites_core::{AuthCommand, Config, Gites};
use serde_json::json;

/// Arguments for the `auth` command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthAction,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Store a session token
    Set {
        #[arg(long)]
        jwt: String,

        #[arg(long)]
        username: String,
    },

    /// Print the stored session
    Get,

    /// Wipe the store
    Clear,
}

impl From<AuthAction> for AuthCommand {
    fn from(action: AuthAction) -> Self {
        match action {
            AuthAction::Set { jwt, username } => AuthCommand::Set {
                payload: json!({ "jwt": jwt, "username": username }),
            },
            AuthAction::Get => AuthCommand::Get,
            AuthAction::Clear => AuthCommand::Clear,
        }
    }
}

/// Execute the auth command.
pub fn execute(args: AuthArgs, config: Config) -> anyhow::Result<()> {
    let gites = Gites::new(config);
    let mut storage = gites.auth_storage();
    tracing::debug!("Auth store at {}", storage.store().path().display());

    let reply = storage.handle(args.command.into());
    println!("{}", serde_json::to_string(&reply)?);
    Ok(())
}
