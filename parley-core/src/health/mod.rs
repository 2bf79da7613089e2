//! Health reporting for the relay process

use crate::relay::RelayStats;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }
}

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub timestamp: SystemTime,
    pub components: Vec<ComponentHealth>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub last_check: SystemTime,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Healthy, None)
    }

    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Unhealthy, Some(message.into()))
    }

    fn with_status(name: impl Into<String>, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message,
            last_check: SystemTime::now(),
        }
    }
}

/// Tracks registered components and aggregates their status.
///
/// The worst component status wins.
pub struct HealthChecker {
    start_time: SystemTime,
    version: String,
    components: RwLock<Vec<ComponentHealth>>,
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            version: version.into(),
            components: RwLock::new(Vec::new()),
        }
    }

    /// Register a component as healthy
    pub async fn register_component(&self, name: impl Into<String>) {
        self.report(ComponentHealth::healthy(name)).await;
    }

    /// Replace the stored status of a component, registering it if unknown
    pub async fn report(&self, health: ComponentHealth) {
        let mut components = self.components.write().await;
        match components.iter_mut().find(|c| c.name == health.name) {
            Some(existing) => *existing = health,
            None => components.push(health),
        }
    }

    /// Get current health status
    pub async fn check_health(&self) -> HealthCheck {
        let components = self.components.read().await.clone();

        let status = if components.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if components.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let uptime = self
            .start_time
            .elapsed()
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        HealthCheck {
            status,
            timestamp: SystemTime::now(),
            components,
            version: self.version.clone(),
            uptime_seconds: uptime,
        }
    }
}

/// Built-in health checks
pub mod checks {
    use super::*;

    /// Relay engine health. Always serving; the message reports the counts.
    pub fn check_relay(stats: &RelayStats) -> ComponentHealth {
        ComponentHealth {
            message: Some(format!(
                "{} messages stored, {} endpoints reachable, {} live channels",
                stats.stored_messages, stats.reachable_endpoints, stats.live_channels
            )),
            ..ComponentHealth::healthy("relay")
        }
    }

    /// Server lifecycle health. Draining servers should stop receiving traffic.
    pub fn check_lifecycle(shutting_down: bool) -> ComponentHealth {
        if shutting_down {
            ComponentHealth::unhealthy("server", "Shutting down")
        } else {
            ComponentHealth::healthy("server")
        }
    }
}
