//! HTTP server

use crate::api::build_router;
use crate::state::AppState;
use anyhow::Result;
use parley_core::config::Config;
use parley_core::shutdown::ShutdownCoordinator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Relay HTTP server
pub struct ApiServer {
    state: Arc<AppState>,
    addr: SocketAddr,
    enable_cors: bool,
}

impl ApiServer {
    /// Create a server with fresh relay state
    pub fn new(config: &Config) -> Self {
        Self::with_state(
            Arc::new(AppState::from_config(config)),
            config.server.bind_address,
            config.server.enable_cors,
        )
    }

    pub fn with_state(state: Arc<AppState>, addr: SocketAddr, enable_cors: bool) -> Self {
        Self { state, addr, enable_cors }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Handle for triggering and observing shutdown
    pub fn shutdown_coordinator(&self) -> Arc<ShutdownCoordinator> {
        self.state.shutdown.clone()
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let mut shutdown_rx = self.state.shutdown.subscribe();
        self.state.health.register_component("relay").await;

        let router = build_router(self.state, self.enable_cors);
        info!("Parley relay listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
