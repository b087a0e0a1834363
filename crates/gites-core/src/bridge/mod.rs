//! Bridge between the UI ports, the local services and the realtime channel.

pub mod channel;
pub mod connection;
pub mod events;
pub mod loopback;
pub mod router;

pub use channel::bounded_channel;
pub use connection::{Connection, ConnectionState, EventStream, InboundFrame, Transport};
pub use events::{ChannelEvent, ChannelPush, LockedDays, Role, UiCommand, UiMessage};
pub use loopback::{LoopbackHandle, LoopbackTransport, PushedFrame};
pub use router::{Bridge, Services};
