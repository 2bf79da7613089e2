//! Test fixtures: routers with preset presence and live-channel doubles

use crate::relay::{DeliveryRouter, EndpointId, LiveEvent, LiveHandle, PushError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Buffer size of a [`RecordingHandle`] created with `new()`
pub const RECORDING_CAPACITY: usize = 64;

/// Live handle for `endpoint` that forwards every pushed event to a
/// test-owned receiver
pub struct RecordingHandle {
    endpoint: EndpointId,
    tx: mpsc::Sender<LiveEvent>,
}

impl RecordingHandle {
    pub fn new(endpoint: impl Into<EndpointId>) -> (Arc<Self>, mpsc::Receiver<LiveEvent>) {
        Self::with_capacity(endpoint, RECORDING_CAPACITY)
    }

    pub fn with_capacity(
        endpoint: impl Into<EndpointId>,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<LiveEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(Self { endpoint: endpoint.into(), tx }), rx)
    }
}

#[async_trait]
impl LiveHandle for RecordingHandle {
    async fn push(&self, event: LiveEvent) -> Result<(), PushError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| PushError::ChannelClosed(self.endpoint.clone()))
    }
}

/// Live handle whose transport always fails. Counts attempts.
#[derive(Default)]
pub struct FailingHandle {
    attempts: AtomicUsize,
}

impl FailingHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveHandle for FailingHandle {
    async fn push(&self, _event: LiveEvent) -> Result<(), PushError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PushError::Transport("connection reset".to_string()))
    }
}

/// A fresh router with `endpoints` already registered
pub async fn online_router(endpoints: &[&str]) -> DeliveryRouter {
    let router = DeliveryRouter::in_memory();
    for endpoint in endpoints {
        router.register(EndpointId::from(*endpoint)).await;
    }
    router
}
