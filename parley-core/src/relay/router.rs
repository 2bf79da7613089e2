//! Delivery router
//!
//! Entry point for sending. A send is validated, stamped, appended to the
//! store and then pushed to the receiver's live channel if one is bound.
//!
//! ```text
//! send(sender, receiver, body)
//!   │  validate: non-empty fields, receiver reachable
//!   ▼
//! Message::new ── stamp(body)
//!   │
//!   ▼
//! MessageStore::append
//!   │
//!   ├── LiveChannelRegistry::enqueue(receiver) ── bound ──► drain task ──► push
//!   ▼
//! Ok(stored message)
//! ```
//!
//! Enqueueing never waits, so a slow transport never holds up the sender,
//! and each binding's queue is drained in order. Push failures are logged
//! and counted, never returned.

use super::errors::{PresenceError, SendError};
use super::live::{ChannelToken, LiveChannelRegistry, SharedHandle};
use super::presence::PresenceRegistry;
use super::store::MessageStore;
use super::types::{EndpointId, LiveEvent, Message, PresenceRecord, Timestamp};
use crate::metrics::{self, names, Timer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Point-in-time counts across the three structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    pub stored_messages: usize,
    pub reachable_endpoints: usize,
    pub live_channels: usize,
}

/// Routes messages between endpoints.
///
/// Each structure is injected and guarded by its own lock, so presence
/// changes, binds and appends for unrelated endpoints never contend on a
/// shared lock.
pub struct DeliveryRouter {
    presence: Arc<PresenceRegistry>,
    store: Arc<MessageStore>,
    live: Arc<LiveChannelRegistry>,
}

impl DeliveryRouter {
    /// Create a router over existing structures
    pub fn new(
        presence: Arc<PresenceRegistry>,
        store: Arc<MessageStore>,
        live: Arc<LiveChannelRegistry>,
    ) -> Self {
        Self { presence, store, live }
    }

    /// Create a router over fresh, empty structures
    pub fn in_memory() -> Self {
        Self::with_live_capacity(super::live::DEFAULT_QUEUE_CAPACITY)
    }

    /// Fresh structures, queueing up to `capacity` undelivered events per live channel
    pub fn with_live_capacity(capacity: usize) -> Self {
        Self::new(
            Arc::new(PresenceRegistry::new()),
            Arc::new(MessageStore::new()),
            Arc::new(LiveChannelRegistry::with_capacity(capacity)),
        )
    }

    pub fn presence(&self) -> &Arc<PresenceRegistry> {
        &self.presence
    }

    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    pub fn live(&self) -> &Arc<LiveChannelRegistry> {
        &self.live
    }

    /// Send `body` from `sender` to `receiver`.
    ///
    /// Validation short-circuits in order: empty sender, receiver or body
    /// yields [`SendError::MissingField`]; a receiver that is not reachable
    /// yields [`SendError::ReceiverUnavailable`] and nothing is stored.
    ///
    /// On success the stored message is returned whether or not a live push
    /// happened.
    pub async fn send(
        &self,
        sender: impl Into<EndpointId>,
        receiver: impl Into<EndpointId>,
        body: impl Into<String>,
    ) -> Result<Message, SendError> {
        let sender = sender.into();
        let receiver = receiver.into();
        let body = body.into();
        let timer = Timer::new(names::SEND_DURATION);

        if let Err(e) = self.validate(&sender, &receiver, &body).await {
            metrics::record_counter(names::MESSAGES_REJECTED, 1);
            debug!(sender = %sender, receiver = %receiver, error = %e, "send rejected");
            return Err(e);
        }

        let message = Message::new(sender, receiver, body);
        self.store.append(message.clone()).await;
        metrics::record_counter(names::MESSAGES_SENT, 1);

        info!(
            sender = %message.sender,
            receiver = %message.receiver,
            digest = %message.digest,
            "message stored"
        );

        match self.live.enqueue(&message.receiver, LiveEvent::from(&message)).await {
            Some(Ok(())) => metrics::record_counter(names::PUSH_DISPATCHED, 1),
            Some(Err(e)) => {
                metrics::record_counter(names::PUSH_FAILED, 1);
                warn!(receiver = %message.receiver, error = %e, "live push dropped");
            }
            None => debug!(receiver = %message.receiver, "no live channel, store-only delivery"),
        }

        timer.stop();
        Ok(message)
    }

    async fn validate(
        &self,
        sender: &EndpointId,
        receiver: &EndpointId,
        body: &str,
    ) -> Result<(), SendError> {
        if sender.is_empty() {
            return Err(SendError::MissingField("sender"));
        }
        if receiver.is_empty() {
            return Err(SendError::MissingField("receiver"));
        }
        if body.is_empty() {
            return Err(SendError::MissingField("body"));
        }
        if !self.presence.is_reachable(receiver).await {
            return Err(SendError::ReceiverUnavailable(receiver.clone()));
        }
        Ok(())
    }

    /// Mark `endpoint` reachable
    pub async fn register(&self, endpoint: impl Into<EndpointId>) {
        let endpoint = endpoint.into();
        self.presence.register(&endpoint).await;
        info!(endpoint = %endpoint, "endpoint connected");
    }

    /// Mark `endpoint` unreachable
    pub async fn unregister(&self, endpoint: impl Into<EndpointId>) -> Result<(), PresenceError> {
        let endpoint = endpoint.into();
        self.presence.unregister(&endpoint).await?;
        info!(endpoint = %endpoint, "endpoint disconnected");
        Ok(())
    }

    pub async fn is_reachable(&self, endpoint: &EndpointId) -> bool {
        self.presence.is_reachable(endpoint).await
    }

    pub async fn last_seen(&self, endpoint: &EndpointId) -> Option<Timestamp> {
        self.presence.last_seen(endpoint).await
    }

    pub async fn presence_record(&self, endpoint: &EndpointId) -> Option<PresenceRecord> {
        self.presence.record(endpoint).await
    }

    /// All messages `endpoint` sent or received, oldest first
    pub async fn query_by_participant(&self, endpoint: &EndpointId) -> Vec<Message> {
        self.store.query_by_participant(endpoint).await
    }

    /// Attach a live channel for `endpoint`. Presence is not touched.
    pub async fn bind(&self, endpoint: impl Into<EndpointId>, handle: SharedHandle) -> ChannelToken {
        self.live.bind(endpoint.into(), handle).await
    }

    /// Detach the live channel for `endpoint`. Presence is not touched.
    pub async fn unbind(&self, endpoint: &EndpointId) -> bool {
        self.live.unbind(endpoint).await
    }

    /// Detach the live channel for `endpoint` only if `token` is still current
    pub async fn unbind_if_current(&self, endpoint: &EndpointId, token: ChannelToken) -> bool {
        self.live.unbind_if_current(endpoint, token).await
    }

    pub async fn stats(&self) -> RelayStats {
        RelayStats {
            stored_messages: self.store.len().await,
            reachable_endpoints: self.presence.reachable_count().await,
            live_channels: self.live.len().await,
        }
    }
}

impl Default for DeliveryRouter {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        assert_err, assert_times_out, online_router, recv_timeout, FailingHandle, MetricsCapture,
        RecordingHandle, SHORT_TEST_TIMEOUT,
    };

    #[tokio::test]
    async fn test_missing_fields_in_order() {
        let router = DeliveryRouter::in_memory();
        router.register("bob").await;

        assert_eq!(router.send("", "", "").await, Err(SendError::MissingField("sender")));
        assert_eq!(router.send("alice", "", "").await, Err(SendError::MissingField("receiver")));
        assert_eq!(router.send("alice", "bob", "").await, Err(SendError::MissingField("body")));
        assert!(router.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_field_checked_before_reachability() {
        let router = DeliveryRouter::in_memory();
        // "carol" is unknown too, but the empty body is reported first
        let err = assert_err(router.send("alice", "carol", "").await);
        assert_eq!(err, SendError::MissingField("body"));
    }

    #[tokio::test]
    async fn test_unknown_receiver_rejected() {
        let router = DeliveryRouter::in_memory();
        let err = assert_err(router.send("alice", "carol", "hi").await);
        assert_eq!(err, SendError::ReceiverUnavailable("carol".into()));
        assert!(router.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_disconnected_receiver_rejected() {
        let router = DeliveryRouter::in_memory();
        router.register("bob").await;
        router.unregister("bob").await.unwrap();

        let err = assert_err(router.send("alice", "bob", "hi").await);
        assert_eq!(err, SendError::ReceiverUnavailable("bob".into()));
    }

    #[tokio::test]
    async fn test_sender_need_not_be_registered() {
        let router = DeliveryRouter::in_memory();
        router.register("bob").await;
        assert!(router.send("anonymous", "bob", "hi").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_stores_stamped_message() {
        let router = DeliveryRouter::in_memory();
        router.register("bob").await;

        let sent = router.send("alice", "bob", "hi").await.unwrap();
        assert_eq!(sent.sender, EndpointId::from("alice"));
        assert_eq!(sent.receiver, EndpointId::from("bob"));
        assert_eq!(sent.body, "hi");
        assert!(sent.verify_integrity());

        assert_eq!(router.query_by_participant(&"alice".into()).await, vec![sent.clone()]);
        assert_eq!(router.query_by_participant(&"bob".into()).await, vec![sent]);
    }

    #[tokio::test]
    async fn test_live_push_carries_sender_and_body() {
        let router = DeliveryRouter::in_memory();
        let (handle, mut rx) = RecordingHandle::new("bob");
        router.register("bob").await;
        router.bind("bob", handle).await;

        router.send("alice", "bob", "ping").await.unwrap();

        let event = recv_timeout(&mut rx, SHORT_TEST_TIMEOUT).await.unwrap();
        assert_eq!(event, LiveEvent { sender: "alice".into(), body: "ping".to_string() });
    }

    #[tokio::test]
    async fn test_failing_push_does_not_fail_send() {
        let router = DeliveryRouter::in_memory();
        router.register("bob").await;
        router.bind("bob", FailingHandle::new()).await;

        let sent = router.send("alice", "bob", "ping").await.unwrap();
        assert_eq!(router.query_by_participant(&"bob".into()).await, vec![sent]);
    }

    #[tokio::test]
    async fn test_bound_but_unregistered_is_rejected() {
        let router = DeliveryRouter::in_memory();
        let (handle, mut rx) = RecordingHandle::new("bob");
        router.bind("bob", handle).await;

        let err = assert_err(router.send("alice", "bob", "hi").await);
        assert_eq!(err, SendError::ReceiverUnavailable("bob".into()));
        assert_times_out(SHORT_TEST_TIMEOUT, rx.recv()).await;
    }

    #[tokio::test]
    async fn test_presence_and_binding_are_independent() {
        let router = DeliveryRouter::in_memory();
        let (handle, _rx) = RecordingHandle::new("bob");
        router.register("bob").await;
        router.bind("bob", handle).await;

        router.unregister("bob").await.unwrap();
        assert!(router.live().is_bound(&"bob".into()).await);

        router.register("bob").await;
        assert!(router.unbind(&"bob".into()).await);
        assert!(router.is_reachable(&"bob".into()).await);
    }

    #[tokio::test]
    async fn test_stats() {
        let router = DeliveryRouter::in_memory();
        let (handle, _rx) = RecordingHandle::new("bob");
        router.register("alice").await;
        router.register("bob").await;
        router.bind("bob", handle).await;
        router.send("alice", "bob", "hi").await.unwrap();

        assert_eq!(
            router.stats().await,
            RelayStats { stored_messages: 1, reachable_endpoints: 2, live_channels: 1 }
        );
    }

    #[test]
    fn test_send_metrics() {
        let metrics = MetricsCapture::new();
        metrics.block_on(async {
            let router = online_router(&["bob"]).await;
            router.send("alice", "bob", "hi").await.unwrap();
            router.send("alice", "carol", "hi").await.unwrap_err();
        });

        assert_eq!(metrics.counter(names::MESSAGES_SENT), 1);
        assert_eq!(metrics.counter(names::MESSAGES_REJECTED), 1);
        assert_eq!(metrics.histogram_samples(names::SEND_DURATION), 1);
    }

    #[test]
    fn test_gauges_follow_registry_state() {
        let metrics = MetricsCapture::new();
        metrics.block_on(async {
            let router = DeliveryRouter::in_memory();
            router.register("alice").await;
            router.register("bob").await;
            router.unregister("alice").await.unwrap();

            let (first, _first_rx) = RecordingHandle::new("bob");
            let (second, _second_rx) = RecordingHandle::new("carol");
            let token = router.bind("bob", first).await;
            router.bind("carol", second).await;
            router.unbind_if_current(&"bob".into(), token).await;
        });

        assert_eq!(metrics.gauge(names::PRESENCE_REACHABLE), Some(1.0));
        assert_eq!(metrics.gauge(names::LIVE_CHANNELS_BOUND), Some(1.0));
    }

    #[test]
    fn test_failed_push_is_counted() {
        let metrics = MetricsCapture::new();
        metrics.block_on(async {
            let router = online_router(&["bob"]).await;
            let handle = FailingHandle::new();
            router.bind("bob", handle.clone()).await;
            router.send("alice", "bob", "ping").await.unwrap();

            while handle.attempts() < 1 {
                tokio::task::yield_now().await;
            }
        });

        assert_eq!(metrics.counter(names::PUSH_DISPATCHED), 1);
        assert_eq!(metrics.counter(names::PUSH_FAILED), 1);
    }
}
