//! Typed messages crossing the UI and channel boundaries.
//!
//! UI traffic is tagged by port name (`{"port": "savePdf", "payload": ...}`);
//! channel traffic is an event name plus a JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::auth::{AuthCommand, AuthReply};
use crate::types::{GroupId, ImageRequest, ImageResult};

/// Which UI application the bridge is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office app: joins at start, manages photos and auth
    Admin,
    /// Public booking app: joins on request, also reacts to `need_refresh`
    Guest,
}

impl Role {
    /// The refresh notification this role's UI listens for.
    pub fn refresh_message(self) -> UiMessage {
        match self {
            Role::Admin => UiMessage::BroadcastRefresh,
            Role::Guest => UiMessage::BroadcastRefreshAv,
        }
    }

    /// Map a channel event onto the UI port it feeds, if this role listens.
    pub fn forward(self, event: ChannelEvent) -> Option<UiMessage> {
        match event {
            ChannelEvent::InitialLockedDays(payload) => {
                Some(UiMessage::ReceiveInitialLockedDays(payload))
            }
            ChannelEvent::LockedDays(payload) => Some(UiMessage::ReceiveLockedDays(payload)),
            ChannelEvent::NewBooking => Some(self.refresh_message()),
            ChannelEvent::NeedRefresh => match self {
                Role::Guest => Some(self.refresh_message()),
                Role::Admin => None,
            },
            ChannelEvent::PresenceState(payload) => Some(UiMessage::PresenceState(payload)),
            ChannelEvent::PresenceDiff(payload) => Some(UiMessage::PresenceDiff(payload)),
        }
    }
}

/// A range of days being held while someone books it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDays {
    #[serde(rename = "cIn")]
    pub c_in: i64,
    #[serde(rename = "cOut")]
    pub c_out: i64,
}

/// Events received on the locked-days channel.
///
/// Payloads stay opaque; the UI decodes them.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    InitialLockedDays(Value),
    LockedDays(Value),
    NewBooking,
    NeedRefresh,
    PresenceState(Value),
    PresenceDiff(Value),
}

impl ChannelEvent {
    /// Decode a raw frame; unknown event names yield `None`.
    pub fn from_frame(event: &str, payload: Value) -> Option<Self> {
        match event {
            "broadcast_initial_locked_days" => Some(Self::InitialLockedDays(payload)),
            "broadcast_locked_days" => Some(Self::LockedDays(payload)),
            "new_booking" => Some(Self::NewBooking),
            "need_refresh" => Some(Self::NeedRefresh),
            "presence_state" => Some(Self::PresenceState(payload)),
            "presence_diff" => Some(Self::PresenceDiff(payload)),
            _ => None,
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialLockedDays(_) => "broadcast_initial_locked_days",
            Self::LockedDays(_) => "broadcast_locked_days",
            Self::NewBooking => "new_booking",
            Self::NeedRefresh => "need_refresh",
            Self::PresenceState(_) => "presence_state",
            Self::PresenceDiff(_) => "presence_diff",
        }
    }
}

/// Messages pushed to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPush {
    DaysLocked(LockedDays),
    RequestRefresh,
}

impl ChannelPush {
    pub fn event(&self) -> &'static str {
        match self {
            Self::DaysLocked(_) => "days_locked",
            Self::RequestRefresh => "request_refresh",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::DaysLocked(days) => json!({"cIn": days.c_in, "cOut": days.c_out}),
            Self::RequestRefresh => json!({}),
        }
    }
}

/// Requests from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum UiCommand {
    ToImageProcessor(ImageRequest),
    SavePdf(GroupId),
    /// Join the locked-days channel with this client uuid
    JoinChannel(String),
    BroadcastLockedDays(LockedDays),
    RequestRefresh,
    ToAuthLocalStorage(AuthCommand),
}

/// Messages delivered to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum UiMessage {
    ProcessedImages(ImageResult),
    ImageFailed {
        filename: String,
        error: String,
    },
    PdfReady {
        group: GroupId,
        path: PathBuf,
        pages: usize,
    },
    PdfFailed {
        group: GroupId,
        error: String,
    },
    ReceiveInitialLockedDays(Value),
    ReceiveLockedDays(Value),
    BroadcastRefresh,
    BroadcastRefreshAv,
    PresenceState(Value),
    PresenceDiff(Value),
    FromAuthLocalStorage(AuthReply),
}
