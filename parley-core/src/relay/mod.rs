//! Presence-and-delivery engine
//!
//! This module coordinates the three shared structures of the relay:
//!
//! - [`PresenceRegistry`]: which endpoints are reachable
//! - [`MessageStore`]: every accepted message, queryable by participant
//! - [`LiveChannelRegistry`]: push handles for endpoints with an open live channel
//!
//! [`DeliveryRouter`] owns shared references to all three and is the only
//! place routing decisions are made. Delivery is at-least-stored and
//! best-effort-live.

pub mod errors;
pub mod live;
pub mod presence;
pub mod router;
pub mod stamp;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-exports
pub use errors::{PresenceError, PushError, SendError};
pub use live::{ChannelToken, LiveChannelRegistry, LiveHandle, SharedHandle};
pub use presence::PresenceRegistry;
pub use router::{DeliveryRouter, RelayStats};
pub use stamp::{stamp, verify, Digest};
pub use store::MessageStore;
pub use types::{EndpointId, LiveEvent, Message, PresenceRecord, Timestamp};
