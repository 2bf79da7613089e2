//! Parley core: the presence-and-delivery engine of a one-to-one
//! real-time messaging relay, plus the process plumbing shared by its
//! transports.

pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod relay;
pub mod shutdown;
pub mod test_utils;

pub use logging::{init_logging, LogLevel};
pub use relay::{
    DeliveryRouter, EndpointId, LiveEvent, LiveHandle, Message, PresenceError, PushError,
    SendError,
};
