//! Error types for gites.
//!
//! Errors are grouped by subsystem so callers can tell a bad upload apart
//! from a dead channel or an unreadable store, and every message carries the
//! filename, group or event it concerns.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for gites operations.
#[derive(Error, Debug)]
pub enum GitesError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image normalization or document export errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Real-time channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Persistent storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while normalizing an upload or exporting a group.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The image data is not a `data:<mime>;base64,<payload>` URI
    #[error("Invalid data URI for {filename}: {message}")]
    InvalidDataUri { filename: String, message: String },

    /// Image decoding failed
    #[error("Decode error for {filename}: {message}")]
    Decode { filename: String, message: String },

    /// JPEG encoding failed
    #[error("Encode error for {filename}: {message}")]
    Encode { filename: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {filename} after {timeout_ms}ms")]
    Timeout {
        filename: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Decoded payload exceeds the size limit
    #[error("Payload too large: {filename} ({size_mb}MB > {max_mb}MB)")]
    PayloadTooLarge {
        filename: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {filename} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        filename: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Group identifier cannot name an element group
    #[error("Invalid export group {group:?}: {message}")]
    InvalidGroup { group: String, message: String },

    /// An element could not be captured
    #[error("Rasterization failed for {element}: {message}")]
    Rasterize { element: String, message: String },

    /// PDF assembly failed
    #[error("Render error for group {group}: {message}")]
    Render { group: String, message: String },
}

/// Real-time channel lifecycle and transport errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Operation requires a connected socket
    #[error("Socket is not connected")]
    NotConnected,

    /// Push or leave attempted before joining a topic
    #[error("Channel is not joined")]
    NotJoined,

    /// A topic is already joined on this connection
    #[error("Channel already joined to {0}")]
    AlreadyJoined(String),

    /// The server refused the join
    #[error("Unable to join {topic}: {reason}")]
    JoinRejected { topic: String, reason: String },

    /// The transport has gone away
    #[error("Transport closed")]
    Closed,
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or replacing the backing file failed
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file or stored value is not valid JSON
    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for gites results.
pub type Result<T> = std::result::Result<T, GitesError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
