//! Auth token persistence for the admin app.
//!
//! The UI sends `{"action": "set" | "get" | "clear", "payload": ...}` and
//! expects either `{"result": "ok" | "error"}` or the stored session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// A storage command from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuthCommand {
    /// Persist the token payload verbatim
    Set { payload: Value },
    /// Read back the stored session
    Get,
    /// Wipe the store
    Clear,
    /// Any action the store does not know
    #[serde(other)]
    Unknown,
}

/// Reply sent back to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthReply {
    Session {
        jwt: String,
        username: String,
        /// Milliseconds since the Unix epoch at read time
        time: u64,
    },
    Status {
        result: AuthStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Ok,
    Error,
}

impl AuthReply {
    pub fn ok() -> Self {
        Self::Status {
            result: AuthStatus::Ok,
        }
    }

    pub fn error() -> Self {
        Self::Status {
            result: AuthStatus::Error,
        }
    }
}

/// The part of the stored payload handed back on `get`.
#[derive(Debug, Deserialize)]
struct StoredSession {
    jwt: String,
    username: String,
}

/// Handles auth commands against a key-value store.
pub struct AuthStorage<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> AuthStorage<S> {
    /// Create a handler storing the token under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Apply a command and build the reply.
    ///
    /// Storage failures are logged and reported to the UI as `error`.
    pub fn handle(&mut self, command: AuthCommand) -> AuthReply {
        match self.try_handle(command) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Auth storage failed: {}", e);
                AuthReply::error()
            }
        }
    }

    fn try_handle(&mut self, command: AuthCommand) -> Result<AuthReply, StorageError> {
        match command {
            AuthCommand::Set { payload } => {
                self.store.set(&self.key, payload)?;
                Ok(AuthReply::ok())
            }
            AuthCommand::Get => match self.store.get(&self.key)? {
                Some(value) => {
                    let session: StoredSession = serde_json::from_value(value)?;
                    Ok(AuthReply::Session {
                        jwt: session.jwt,
                        username: session.username,
                        time: now_millis(),
                    })
                }
                None => Ok(AuthReply::error()),
            },
            AuthCommand::Clear => {
                self.store.clear()?;
                Ok(AuthReply::ok())
            }
            AuthCommand::Unknown => Ok(AuthReply::error()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
