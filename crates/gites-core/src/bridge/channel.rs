//! Bounded channels for backpressure between transport, bridge and UI.

use tokio::sync::mpsc;

use crate::config::ChannelConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, the sender waits, so a stalled UI slows the
/// transport down instead of growing memory without bound.
pub fn bounded_channel<T>(config: &ChannelConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size)
}
