//! The `gites ports` command: the UI port protocol over stdin/stdout.
//!
//! Each stdin line is either a port command (`{"port": "savePdf", "payload":
//! "calendar"}`) or a server event to inject on the channel
//! (`{"event": "new_booking", "payload": {}}`). Every message for the UI is
//! written to stdout as one JSON line. The channel runs over the loopback
//! transport, so pushes are logged instead of sent anywhere.

use clap::Args;
use gites_core::bridge::{bounded_channel, Bridge, LoopbackTransport, PushedFrame, Role, UiCommand};
use gites_core::{Config, Gites, OutputFormat, OutputWriter};
use serde::Deserialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::types::RoleArg;

/// Arguments for the `ports` command.
#[derive(Args, Debug)]
pub struct PortsArgs {
    /// Application to serve
    #[arg(short, long, value_enum, default_value = "guest")]
    pub role: RoleArg,

    /// Directory holding one sub-directory of captures per export group
    #[arg(long, default_value = ".")]
    pub captures: PathBuf,
}

/// One line of input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Command(UiCommand),
    Event {
        event: String,
        #[serde(default)]
        payload: Value,
    },
}

/// Execute the ports command.
pub async fn execute(args: PortsArgs, config: Config) -> anyhow::Result<()> {
    tracing::info!("Serving {:?} ports on stdin/stdout", args.role);
    let input = BufReader::new(tokio::io::stdin());
    serve(args.role.into(), config, &args.captures, input, std::io::stdout()).await?;
    Ok(())
}

/// Run a bridge for `role` until `input` ends and every answer is written.
///
/// Returns `output` once the bridge has shut down.
pub async fn serve<R, W>(
    role: Role,
    config: Config,
    captures: &Path,
    input: R,
    output: W,
) -> anyhow::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send + 'static,
{
    let gites = Gites::new(config);
    let channel = gites.config().channel.clone();

    let (transport, mut server) = LoopbackTransport::new(&channel);
    let (outbox, mut messages) = bounded_channel(&channel);
    let (commands, inbox) = bounded_channel::<UiCommand>(&channel);

    let bridge = Bridge::new(
        role,
        &channel,
        transport,
        gites.auth_storage(),
        gites.services(captures),
        outbox,
    );
    let mut bridge_task = tokio::spawn(bridge.run(inbox));

    let writer_task = tokio::task::spawn_blocking(move || {
        let mut writer = OutputWriter::new(output, OutputFormat::JsonLines, false);
        while let Some(message) = messages.blocking_recv() {
            writer.write(&message)?;
        }
        tracing::debug!("Wrote {} messages", writer.written());
        Ok::<_, std::io::Error>(writer.into_inner())
    });

    // Pushes keep draining while a command waits for room in the inbox.
    let mut lines = input.lines();
    let mut pending: Option<UiCommand> = None;
    let mut reading = true;
    while reading || pending.is_some() {
        tokio::select! {
            permit = commands.reserve(), if pending.is_some() => {
                let Ok(permit) = permit else {
                    tracing::error!("Bridge stopped; no longer accepting commands");
                    break;
                };
                if let Some(command) = pending.take() {
                    permit.send(command);
                }
            }
            line = lines.next_line(), if reading && pending.is_none() => {
                let Some(line) = line? else {
                    reading = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Input>(&line) {
                    Ok(Input::Command(command)) => pending = Some(command),
                    Ok(Input::Event { event, payload }) => {
                        if let Err(e) = server.emit(&event, payload).await {
                            tracing::warn!("Cannot deliver {}: {}", event, e);
                        }
                    }
                    Err(e) => tracing::warn!("Ignoring malformed input line: {}", e),
                }
            }
            Some(push) = server.next_push() => log_push(&push),
        }
    }

    drop(commands);
    loop {
        tokio::select! {
            result = &mut bridge_task => {
                result??;
                break;
            }
            Some(push) = server.next_push() => log_push(&push),
        }
    }
    while let Some(push) = server.next_push().await {
        log_push(&push);
    }

    Ok(writer_task.await??)
}

fn log_push(push: &PushedFrame) {
    tracing::info!("Push {} on {}: {}", push.event, push.topic, push.payload);
}
