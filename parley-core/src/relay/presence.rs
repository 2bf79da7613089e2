//! Presence registry
//!
//! Tracks whether each endpoint is reachable and when it was last seen.
//! Records are created on first registration and kept for the lifetime of
//! the process, so `last_seen` survives an unregister.

use super::errors::PresenceError;
use super::types::{EndpointId, PresenceRecord, Timestamp};
use crate::metrics::{self, names};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct PresenceRegistry {
    records: RwLock<HashMap<EndpointId, PresenceRecord>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `endpoint` reachable, creating its record if needed
    pub async fn register(&self, endpoint: &EndpointId) {
        let now = Timestamp::now();
        let mut records = self.records.write().await;
        records
            .entry(endpoint.clone())
            .and_modify(|record| {
                record.reachable = true;
                record.last_seen = now;
            })
            .or_insert_with(|| PresenceRecord {
                endpoint: endpoint.clone(),
                reachable: true,
                last_seen: now,
            });
        publish_reachable(&records);

        debug!(endpoint = %endpoint, "presence registered");
    }

    /// Mark `endpoint` unreachable
    ///
    /// Fails with [`PresenceError::NotFound`] if it never registered.
    pub async fn unregister(&self, endpoint: &EndpointId) -> Result<(), PresenceError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(endpoint)
            .ok_or_else(|| PresenceError::NotFound(endpoint.clone()))?;

        record.reachable = false;
        record.last_seen = Timestamp::now();
        publish_reachable(&records);

        debug!(endpoint = %endpoint, "presence unregistered");
        Ok(())
    }

    pub async fn is_reachable(&self, endpoint: &EndpointId) -> bool {
        self.records
            .read()
            .await
            .get(endpoint)
            .map(|record| record.reachable)
            .unwrap_or(false)
    }

    pub async fn last_seen(&self, endpoint: &EndpointId) -> Option<Timestamp> {
        self.records.read().await.get(endpoint).map(|record| record.last_seen)
    }

    /// Snapshot of the record for `endpoint`
    pub async fn record(&self, endpoint: &EndpointId) -> Option<PresenceRecord> {
        self.records.read().await.get(endpoint).cloned()
    }

    /// Number of endpoints currently reachable
    pub async fn reachable_count(&self) -> usize {
        count_reachable(&*self.records.read().await)
    }
}

fn count_reachable(records: &HashMap<EndpointId, PresenceRecord>) -> usize {
    records.values().filter(|record| record.reachable).count()
}

/// Set the reachable gauge. Called with the write lock held so concurrent
/// updates publish in lock order.
fn publish_reachable(records: &HashMap<EndpointId, PresenceRecord>) {
    metrics::record_gauge(names::PRESENCE_REACHABLE, count_reachable(records) as f64);
}
