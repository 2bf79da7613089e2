//! Live channel registry
//!
//! Maps an online endpoint to the handle its transport connection uses to
//! receive real-time events. The registry never owns a connection: the
//! transport opens and closes sockets and reports closure through
//! [`LiveChannelRegistry::unbind`] or [`LiveChannelRegistry::unbind_if_current`].
//!
//! Every binding gets a bounded outbound queue drained by a single task, so
//! events reach a handle in the order they were enqueued and a slow handle
//! never blocks the sender. Only one binding per endpoint is tracked.
//! Binding again displaces the previous one; its drain task delivers what
//! is already queued and then exits.

use super::errors::PushError;
use super::types::{EndpointId, LiveEvent};
use crate::metrics::{self, names};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outbound events queued per binding when no capacity is given
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Push primitive supplied by a transport adapter
#[async_trait]
pub trait LiveHandle: Send + Sync {
    /// Deliver one event to the connection.
    ///
    /// Called from the binding's drain task, one event at a time. Failures
    /// are logged and never retried.
    async fn push(&self, event: LiveEvent) -> Result<(), PushError>;
}

pub type SharedHandle = Arc<dyn LiveHandle>;

/// Identifies one particular binding of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelToken(Uuid);

impl ChannelToken {
    fn generate() -> Self {
        ChannelToken(Uuid::new_v4())
    }
}

impl fmt::Display for ChannelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Binding {
    token: ChannelToken,
    handle: SharedHandle,
    queue: mpsc::Sender<LiveEvent>,
}

pub struct LiveChannelRegistry {
    bindings: RwLock<HashMap<EndpointId, Binding>>,
    queue_capacity: usize,
}

impl Default for LiveChannelRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl LiveChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose bindings each queue up to `queue_capacity` events
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Bind `handle` to `endpoint`, replacing any previous binding
    pub async fn bind(&self, endpoint: EndpointId, handle: SharedHandle) -> ChannelToken {
        let token = ChannelToken::generate();
        let (queue, rx) = mpsc::channel(self.queue_capacity);
        tokio::spawn(drain(endpoint.clone(), token, rx, handle.clone()));

        let mut bindings = self.bindings.write().await;
        let displaced = bindings.insert(endpoint.clone(), Binding { token, handle, queue });
        metrics::record_gauge(names::LIVE_CHANNELS_BOUND, bindings.len() as f64);

        debug!(
            endpoint = %endpoint,
            token = %token,
            displaced = displaced.is_some(),
            "live channel bound"
        );
        token
    }

    /// Remove whatever is bound to `endpoint`. Returns whether a binding existed.
    pub async fn unbind(&self, endpoint: &EndpointId) -> bool {
        let mut bindings = self.bindings.write().await;
        let removed = bindings.remove(endpoint).is_some();
        metrics::record_gauge(names::LIVE_CHANNELS_BOUND, bindings.len() as f64);
        if removed {
            debug!(endpoint = %endpoint, "live channel unbound");
        }
        removed
    }

    /// Remove the binding only if it is still the one identified by `token`.
    ///
    /// A connection that was displaced by a newer one can call this on close
    /// without evicting its replacement.
    pub async fn unbind_if_current(&self, endpoint: &EndpointId, token: ChannelToken) -> bool {
        let mut bindings = self.bindings.write().await;
        let removed = match bindings.get(endpoint) {
            Some(binding) if binding.token == token => bindings.remove(endpoint).is_some(),
            _ => false,
        };
        metrics::record_gauge(names::LIVE_CHANNELS_BOUND, bindings.len() as f64);
        if removed {
            debug!(endpoint = %endpoint, token = %token, "live channel unbound");
        }
        removed
    }

    /// Queue `event` for the channel bound to `endpoint` without waiting.
    ///
    /// `None` when nothing is bound. A full queue yields
    /// [`PushError::BufferFull`] and the event is dropped.
    pub async fn enqueue(
        &self,
        endpoint: &EndpointId,
        event: LiveEvent,
    ) -> Option<Result<(), PushError>> {
        let bindings = self.bindings.read().await;
        let binding = bindings.get(endpoint)?;
        Some(binding.queue.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => PushError::BufferFull(endpoint.clone()),
            TrySendError::Closed(_) => PushError::ChannelClosed(endpoint.clone()),
        }))
    }

    /// Handle currently bound to `endpoint`, if any
    pub async fn lookup(&self, endpoint: &EndpointId) -> Option<SharedHandle> {
        self.bindings.read().await.get(endpoint).map(|binding| binding.handle.clone())
    }

    pub async fn is_bound(&self, endpoint: &EndpointId) -> bool {
        self.bindings.read().await.contains_key(endpoint)
    }

    /// Number of endpoints with a bound channel
    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bindings.read().await.is_empty()
    }
}

/// Feed queued events to `handle` in order until the binding is dropped
async fn drain(
    endpoint: EndpointId,
    token: ChannelToken,
    mut rx: mpsc::Receiver<LiveEvent>,
    handle: SharedHandle,
) {
    while let Some(event) = rx.recv().await {
        match handle.push(event).await {
            Ok(()) => debug!(endpoint = %endpoint, "live push delivered"),
            Err(e) => {
                metrics::record_counter(names::PUSH_FAILED, 1);
                warn!(endpoint = %endpoint, error = %e, "live push dropped");
            }
        }
    }
    debug!(endpoint = %endpoint, token = %token, "live channel drained");
}
