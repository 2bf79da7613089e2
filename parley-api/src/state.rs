//! Server state shared across requests

use parley_core::config::Config;
use parley_core::health::HealthChecker;
use parley_core::shutdown::ShutdownCoordinator;
use parley_core::DeliveryRouter;
use std::sync::Arc;

pub struct AppState {
    /// Presence, store and live channels
    pub router: Arc<DeliveryRouter>,

    pub health: Arc<HealthChecker>,

    /// Live channels close when this fires
    pub shutdown: Arc<ShutdownCoordinator>,

    /// Outbound buffer size for each live channel
    pub live_channel_capacity: usize,
}

impl AppState {
    pub fn new(
        router: Arc<DeliveryRouter>,
        health: Arc<HealthChecker>,
        shutdown: Arc<ShutdownCoordinator>,
        live_channel_capacity: usize,
    ) -> Self {
        Self { router, health, shutdown, live_channel_capacity }
    }

    /// Fresh in-memory state sized from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(DeliveryRouter::with_live_capacity(config.relay.live_channel_capacity)),
            Arc::new(HealthChecker::new(env!("CARGO_PKG_VERSION"))),
            Arc::new(ShutdownCoordinator::new(config.server.shutdown_timeout)),
            config.relay.live_channel_capacity,
        )
    }
}
