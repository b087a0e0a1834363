//! Routes UI commands to the services and channel events back to the UI.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use crate::auth::AuthStorage;
use crate::config::ChannelConfig;
use crate::error::{ChannelError, GitesError};
use crate::export::{DocumentExporter, DocumentSink};
use crate::pipeline::ImageNormalizer;
use crate::storage::KeyValueStore;
use crate::types::{GroupId, ImageRequest};

use super::connection::{Connection, EventStream, Transport};
use super::events::{ChannelPush, Role, UiCommand, UiMessage};

/// The request/response services behind the UI ports.
pub struct Services {
    pub normalizer: ImageNormalizer,
    pub exporter: DocumentExporter,
    pub sink: Arc<dyn DocumentSink>,
}

/// Connects one UI application to the channel and the local services.
///
/// Image and export requests run as background tasks and answer on the
/// outbox when done; channel and storage commands are handled inline.
pub struct Bridge<T: Transport, S: KeyValueStore> {
    role: Role,
    config: ChannelConfig,
    connection: Connection<T>,
    auth: AuthStorage<S>,
    normalizer: Arc<ImageNormalizer>,
    exporter: Arc<DocumentExporter>,
    sink: Arc<dyn DocumentSink>,
    outbox: mpsc::Sender<UiMessage>,
    forwarder: Option<JoinHandle<()>>,
    tasks: JoinSet<()>,
}

impl<T: Transport, S: KeyValueStore> Bridge<T, S> {
    pub fn new(
        role: Role,
        config: &ChannelConfig,
        transport: T,
        auth: AuthStorage<S>,
        services: Services,
        outbox: mpsc::Sender<UiMessage>,
    ) -> Self {
        Self {
            role,
            config: config.clone(),
            connection: Connection::new(transport),
            auth,
            normalizer: Arc::new(services.normalizer),
            exporter: Arc::new(services.exporter),
            sink: services.sink,
            outbox,
            forwarder: None,
            tasks: JoinSet::new(),
        }
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    /// Open the socket; the admin app also joins straight away.
    pub async fn start(&mut self) -> Result<(), ChannelError> {
        self.connection.connect().await?;
        if self.role == Role::Admin {
            let uuid = self.config.admin_uuid.clone();
            self.join(&uuid).await?;
        }
        Ok(())
    }

    /// Process commands until the UI side closes, then finish in-flight work
    /// and disconnect.
    ///
    /// A channel that cannot be reached or joined is logged; the image,
    /// export and storage ports keep working without it.
    pub async fn run(mut self, mut commands: mpsc::Receiver<UiCommand>) -> Result<(), GitesError> {
        if let Err(e) = self.start().await {
            tracing::warn!("Channel unavailable, serving local ports only: {}", e);
        }

        while let Some(command) = commands.recv().await {
            if let Err(e) = self.handle(command).await {
                tracing::warn!("Command failed: {}", e);
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Handle a single UI command.
    pub async fn handle(&mut self, command: UiCommand) -> Result<(), GitesError> {
        self.reap_finished();
        match command {
            UiCommand::ToImageProcessor(request) => self.spawn_normalize(request),
            UiCommand::SavePdf(group) => self.spawn_export(group),
            UiCommand::JoinChannel(uuid) => {
                if self.connection.is_joined() {
                    self.connection.leave().await?;
                    self.stop_forwarding();
                }
                self.join(&uuid).await?;
            }
            UiCommand::BroadcastLockedDays(days) => {
                self.connection.push(ChannelPush::DaysLocked(days)).await?;
            }
            UiCommand::RequestRefresh => {
                self.connection.push(ChannelPush::RequestRefresh).await?;
            }
            UiCommand::ToAuthLocalStorage(command) => {
                let reply = self.auth.handle(command);
                self.outbox
                    .send(UiMessage::FromAuthLocalStorage(reply))
                    .await
                    .map_err(|_| ChannelError::Closed)?;
            }
        }
        Ok(())
    }

    /// Image and export tasks still running or not yet collected.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for background work, stop forwarding and close the socket.
    pub async fn shutdown(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!("Bridge task failed: {}", e);
            }
        }
        self.stop_forwarding();
        if let Err(e) = self.connection.disconnect().await {
            tracing::warn!("Disconnect failed: {}", e);
        }
    }

    async fn join(&mut self, uuid: &str) -> Result<(), ChannelError> {
        let topic = self.config.topic.clone();
        let events = self.connection.join(&topic, uuid).await?;
        self.forwarder = Some(tokio::spawn(forward_events(
            self.role,
            events,
            self.outbox.clone(),
        )));
        Ok(())
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                tracing::error!("Bridge task failed: {}", e);
            }
        }
    }

    fn stop_forwarding(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }

    fn spawn_normalize(&mut self, request: ImageRequest) {
        let normalizer = Arc::clone(&self.normalizer);
        let outbox = self.outbox.clone();
        self.tasks.spawn(async move {
            let message = match normalizer.normalize(&request).await {
                Ok(result) => UiMessage::ProcessedImages(result),
                Err(e) => {
                    tracing::warn!("Image processing failed: {}", e);
                    UiMessage::ImageFailed {
                        filename: request.filename,
                        error: e.to_string(),
                    }
                }
            };
            let _ = outbox.send(message).await;
        });
    }

    fn spawn_export(&mut self, group: GroupId) {
        let exporter = Arc::clone(&self.exporter);
        let sink = Arc::clone(&self.sink);
        let outbox = self.outbox.clone();
        self.tasks.spawn(async move {
            let outcome = match exporter.export(&group).await {
                Ok(document) => sink
                    .present(&document)
                    .map(|path| (path, document.page_count)),
                Err(e) => Err(e.into()),
            };
            let message = match outcome {
                Ok((path, pages)) => UiMessage::PdfReady { group, path, pages },
                Err(e) => {
                    tracing::warn!("Export of {} failed: {}", group, e);
                    UiMessage::PdfFailed {
                        group,
                        error: e.to_string(),
                    }
                }
            };
            let _ = outbox.send(message).await;
        });
    }
}

async fn forward_events(role: Role, mut events: EventStream, outbox: mpsc::Sender<UiMessage>) {
    while let Some(event) = events.next().await {
        let name = event.name();
        match role.forward(event) {
            Some(message) => {
                if outbox.send(message).await.is_err() {
                    break;
                }
            }
            None => tracing::debug!("{:?} app ignores {}", role, name),
        }
    }
}
