//! In-process transport.
//!
//! Stands in for the socket when no server is around: the paired
//! [`LoopbackHandle`] plays the server side, emitting broadcasts onto the
//! joined topic and reading back whatever the client pushed.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::config::ChannelConfig;
use crate::error::ChannelError;

use super::channel::bounded_channel;
use super::connection::{InboundFrame, Transport};

/// A push as seen by the server side.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedFrame {
    pub topic: String,
    pub event: String,
    pub payload: Value,
}

#[derive(Default)]
struct Shared {
    inbound: Option<mpsc::Sender<InboundFrame>>,
    joins: Vec<(String, Value)>,
    reject_join: Option<String>,
    drop_on_leave: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Client side of the loopback.
pub struct LoopbackTransport {
    config: ChannelConfig,
    shared: Arc<Mutex<Shared>>,
    pushes: mpsc::Sender<PushedFrame>,
}

/// Server side of the loopback.
pub struct LoopbackHandle {
    shared: Arc<Mutex<Shared>>,
    pushes: mpsc::Receiver<PushedFrame>,
}

impl LoopbackTransport {
    /// Create a connected pair; buffers follow `config.buffer_size`.
    pub fn new(config: &ChannelConfig) -> (Self, LoopbackHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (push_tx, push_rx) = bounded_channel(config);
        (
            Self {
                config: config.clone(),
                shared: Arc::clone(&shared),
                pushes: push_tx,
            },
            LoopbackHandle {
                shared,
                pushes: push_rx,
            },
        )
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn connect(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn join(
        &mut self,
        topic: &str,
        params: Value,
    ) -> Result<mpsc::Receiver<InboundFrame>, ChannelError> {
        let mut shared = lock(&self.shared);
        shared.joins.push((topic.to_string(), params));
        if let Some(reason) = &shared.reject_join {
            return Err(ChannelError::JoinRejected {
                topic: topic.to_string(),
                reason: reason.clone(),
            });
        }
        let (tx, rx) = bounded_channel(&self.config);
        shared.inbound = Some(tx);
        Ok(rx)
    }

    async fn push(
        &mut self,
        topic: &str,
        event: &str,
        payload: Value,
    ) -> Result<(), ChannelError> {
        self.pushes
            .send(PushedFrame {
                topic: topic.to_string(),
                event: event.to_string(),
                payload,
            })
            .await
            .map_err(|_| ChannelError::Closed)
    }

    async fn leave(&mut self, _topic: &str) -> Result<(), ChannelError> {
        let mut shared = lock(&self.shared);
        if shared.drop_on_leave {
            return Err(ChannelError::Closed);
        }
        shared.inbound = None;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ChannelError> {
        lock(&self.shared).inbound = None;
        Ok(())
    }
}

impl LoopbackHandle {
    /// Broadcast an event to the joined client.
    pub async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        let sender = lock(&self.shared)
            .inbound
            .clone()
            .ok_or(ChannelError::NotJoined)?;
        sender
            .send(InboundFrame {
                event: event.to_string(),
                payload,
            })
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Next push from the client, or `None` once the client is gone.
    pub async fn next_push(&mut self) -> Option<PushedFrame> {
        self.pushes.recv().await
    }

    /// Every join attempt so far, as `(topic, params)`.
    pub fn joins(&self) -> Vec<(String, Value)> {
        lock(&self.shared).joins.clone()
    }

    /// Refuse subsequent joins with `reason`.
    pub fn reject_joins(&self, reason: &str) {
        lock(&self.shared).reject_join = Some(reason.to_string());
    }

    /// Make subsequent leaves fail as if the socket dropped mid-request.
    /// The client stays joined.
    pub fn fail_leaves(&self) {
        lock(&self.shared).drop_on_leave = true;
    }

    /// True while a client is joined.
    pub fn is_joined(&self) -> bool {
        lock(&self.shared).inbound.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_without_join_fails() {
        let (_transport, handle) = LoopbackTransport::new(&ChannelConfig::default());
        let err = handle.emit("new_booking", json!({})).await.unwrap_err();
        assert_eq!(err, ChannelError::NotJoined);
    }

    #[tokio::test]
    async fn test_emit_reaches_joined_client() {
        let (mut transport, handle) = LoopbackTransport::new(&ChannelConfig::default());
        let mut frames = transport.join("t", json!({"uuid": "x"})).await.unwrap();
        assert!(handle.is_joined());

        handle.emit("presence_diff", json!({"joins": {}})).await.unwrap();
        let frame = frames.recv().await.unwrap();
        assert_eq!(frame.event, "presence_diff");
        assert_eq!(frame.payload, json!({"joins": {}}));

        transport.leave("t").await.unwrap();
        assert!(!handle.is_joined());
    }

    #[tokio::test]
    async fn test_failed_leave_keeps_client_joined() {
        let (mut transport, handle) = LoopbackTransport::new(&ChannelConfig::default());
        let _frames = transport.join("t", json!({"uuid": "x"})).await.unwrap();

        handle.fail_leaves();
        assert_eq!(transport.leave("t").await.unwrap_err(), ChannelError::Closed);
        assert!(handle.is_joined());
    }
}
