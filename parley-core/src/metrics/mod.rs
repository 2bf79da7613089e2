//! Relay metrics
//!
//! Recorded through the `metrics` facade. Nothing is exported until the
//! host process installs a recorder; until then every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Instant;

/// Metric names
pub mod names {
    pub const MESSAGES_SENT: &str = "relay.messages.sent";
    pub const MESSAGES_REJECTED: &str = "relay.messages.rejected";
    pub const PUSH_DISPATCHED: &str = "relay.push.dispatched";
    pub const PUSH_FAILED: &str = "relay.push.failed";
    pub const PRESENCE_REACHABLE: &str = "relay.presence.reachable";
    pub const LIVE_CHANNELS_BOUND: &str = "relay.live_channels.bound";
    pub const SEND_DURATION: &str = "relay.send.duration_ms";
}

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(names::MESSAGES_SENT, "Messages accepted and stored");
    describe_counter!(names::MESSAGES_REJECTED, "Sends rejected by validation or presence");
    describe_counter!(names::PUSH_DISPATCHED, "Live pushes handed to a transport");
    describe_counter!(names::PUSH_FAILED, "Live pushes the transport reported as failed");
    describe_gauge!(names::PRESENCE_REACHABLE, "Endpoints currently reachable");
    describe_gauge!(names::LIVE_CHANNELS_BOUND, "Endpoints with a bound live channel");
    describe_histogram!(names::SEND_DURATION, "Time to validate, store and enqueue an accepted send, in milliseconds");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Record a gauge metric
pub fn record_gauge(name: &'static str, value: f64) {
    gauge!(name).set(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self { name, start: Instant::now() }
    }

    /// Stop the timer and record the duration in milliseconds
    pub fn stop(self) {
        histogram!(self.name).record(self.start.elapsed().as_secs_f64() * 1000.0);
    }
}
