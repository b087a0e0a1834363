//! Owned channel connection with an explicit lifecycle.
//!
//! `Disconnected -> connect -> Connected -> join -> Joined -> leave -> Connected`,
//! and `disconnect` from any state. Pushes are only legal while joined.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::ChannelError;

use super::events::{ChannelEvent, ChannelPush};

/// A raw inbound frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    pub event: String,
    pub payload: Value,
}

/// The socket underneath a [`Connection`].
///
/// Implementations only move frames; lifecycle rules live in `Connection`.
#[async_trait]
pub trait Transport: Send {
    /// Open the socket.
    async fn connect(&mut self) -> Result<(), ChannelError>;

    /// Join `topic`; returns the stream of frames broadcast on it.
    async fn join(
        &mut self,
        topic: &str,
        params: Value,
    ) -> Result<mpsc::Receiver<InboundFrame>, ChannelError>;

    /// Send one event on a joined topic.
    async fn push(&mut self, topic: &str, event: &str, payload: Value)
        -> Result<(), ChannelError>;

    /// Leave `topic`; its frame stream ends.
    async fn leave(&mut self, topic: &str) -> Result<(), ChannelError>;

    /// Close the socket.
    async fn disconnect(&mut self) -> Result<(), ChannelError>;
}

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Joined { topic: String },
}

/// A transport plus the state machine guarding it.
pub struct Connection<T: Transport> {
    transport: T,
    state: ConnectionState,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.state, ConnectionState::Joined { .. })
    }

    /// Open the socket. No-op when already open.
    pub async fn connect(&mut self) -> Result<(), ChannelError> {
        if self.state == ConnectionState::Disconnected {
            self.transport.connect().await?;
            self.state = ConnectionState::Connected;
            tracing::debug!("Socket connected");
        }
        Ok(())
    }

    /// Join `topic` as client `uuid`.
    pub async fn join(&mut self, topic: &str, uuid: &str) -> Result<EventStream, ChannelError> {
        match &self.state {
            ConnectionState::Disconnected => return Err(ChannelError::NotConnected),
            ConnectionState::Joined { topic } => {
                return Err(ChannelError::AlreadyJoined(topic.clone()))
            }
            ConnectionState::Connected => {}
        }

        match self.transport.join(topic, json!({ "uuid": uuid })).await {
            Ok(frames) => {
                tracing::info!("Joined {} as {}", topic, uuid);
                self.state = ConnectionState::Joined {
                    topic: topic.to_string(),
                };
                Ok(EventStream { frames })
            }
            Err(e) => {
                tracing::warn!("Unable to join {}: {}", topic, e);
                Err(e)
            }
        }
    }

    /// Push a message on the joined topic.
    pub async fn push(&mut self, push: ChannelPush) -> Result<(), ChannelError> {
        let ConnectionState::Joined { topic } = &self.state else {
            return Err(ChannelError::NotJoined);
        };
        tracing::debug!("Pushing {} on {}", push.event(), topic);
        self.transport
            .push(topic, push.event(), push.payload())
            .await
    }

    /// Leave the joined topic, keeping the socket open.
    pub async fn leave(&mut self) -> Result<(), ChannelError> {
        let ConnectionState::Joined { topic } = &self.state else {
            return Err(ChannelError::NotJoined);
        };
        let topic = topic.clone();
        self.transport.leave(&topic).await?;
        self.state = ConnectionState::Connected;
        tracing::debug!("Left {}", topic);
        Ok(())
    }

    /// Leave any joined topic and close the socket.
    pub async fn disconnect(&mut self) -> Result<(), ChannelError> {
        if self.is_joined() {
            self.leave().await?;
        }
        if self.state == ConnectionState::Connected {
            self.transport.disconnect().await?;
            self.state = ConnectionState::Disconnected;
            tracing::debug!("Socket disconnected");
        }
        Ok(())
    }
}

/// Typed events of one joined topic.
pub struct EventStream {
    frames: mpsc::Receiver<InboundFrame>,
}

impl EventStream {
    /// Next known event; unknown frames are logged and skipped.
    ///
    /// Returns `None` once the topic is left or the transport closes.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        loop {
            let frame = self.frames.recv().await?;
            match ChannelEvent::from_frame(&frame.event, frame.payload) {
                Some(event) => return Some(event),
                None => tracing::debug!("Dropping unhandled channel event {}", frame.event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::events::LockedDays;
    use crate::bridge::loopback::LoopbackTransport;
    use crate::config::ChannelConfig;

    const TOPIC: &str = "bookings:locked_days";

    fn connection() -> (
        Connection<LoopbackTransport>,
        crate::bridge::loopback::LoopbackHandle,
    ) {
        let (transport, handle) = LoopbackTransport::new(&ChannelConfig::default());
        (Connection::new(transport), handle)
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let (mut conn, handle) = connection();
        assert_eq!(conn.state(), &ConnectionState::Disconnected);

        conn.connect().await.unwrap();
        assert_eq!(conn.state(), &ConnectionState::Connected);

        let _events = conn.join(TOPIC, "bookingsAdmin").await.unwrap();
        assert!(conn.is_joined());
        assert_eq!(
            handle.joins(),
            vec![(TOPIC.to_string(), json!({"uuid": "bookingsAdmin"}))]
        );

        conn.leave().await.unwrap();
        assert_eq!(conn.state(), &ConnectionState::Connected);

        conn.disconnect().await.unwrap();
        assert_eq!(conn.state(), &ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_join_requires_connect() {
        let (mut conn, _handle) = connection();
        let err = conn.join(TOPIC, "u1").await.err().unwrap();
        assert_eq!(err, ChannelError::NotConnected);
    }

    #[tokio::test]
    async fn test_double_join_is_rejected() {
        let (mut conn, _handle) = connection();
        conn.connect().await.unwrap();
        let _events = conn.join(TOPIC, "u1").await.unwrap();

        let err = conn.join(TOPIC, "u2").await.err().unwrap();
        assert_eq!(err, ChannelError::AlreadyJoined(TOPIC.to_string()));
    }

    #[tokio::test]
    async fn test_push_requires_join() {
        let (mut conn, _handle) = connection();
        conn.connect().await.unwrap();
        let err = conn.push(ChannelPush::RequestRefresh).await.unwrap_err();
        assert_eq!(err, ChannelError::NotJoined);
    }

    #[tokio::test]
    async fn test_push_reaches_transport() {
        let (mut conn, mut handle) = connection();
        conn.connect().await.unwrap();
        let _events = conn.join(TOPIC, "u1").await.unwrap();

        conn.push(ChannelPush::DaysLocked(LockedDays { c_in: 10, c_out: 12 }))
            .await
            .unwrap();

        let pushed = handle.next_push().await.unwrap();
        assert_eq!(pushed.topic, TOPIC);
        assert_eq!(pushed.event, "days_locked");
        assert_eq!(pushed.payload, json!({"cIn": 10, "cOut": 12}));
    }

    #[tokio::test]
    async fn test_rejected_join_stays_connected() {
        let (mut conn, handle) = connection();
        handle.reject_joins("unauthorized");
        conn.connect().await.unwrap();

        let err = conn.join(TOPIC, "u1").await.err().unwrap();
        assert!(matches!(err, ChannelError::JoinRejected { .. }));
        assert_eq!(conn.state(), &ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_event_stream_skips_unknown_and_ends_on_leave() {
        let (mut conn, handle) = connection();
        conn.connect().await.unwrap();
        let mut events = conn.join(TOPIC, "u1").await.unwrap();

        handle.emit("phx_reply", json!({})).await.unwrap();
        handle.emit("new_booking", json!({})).await.unwrap();
        assert_eq!(events.next().await, Some(ChannelEvent::NewBooking));

        conn.leave().await.unwrap();
        assert_eq!(events.next().await, None);
    }
}
