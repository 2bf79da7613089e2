//! Append-only message log

use super::types::{EndpointId, Message};
use tokio::sync::RwLock;

/// In-memory message log. Growth is unbounded; nothing is ever evicted.
#[derive(Default)]
pub struct MessageStore {
    log: RwLock<Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Never rejects; validation happens in the router.
    pub async fn append(&self, message: Message) {
        self.log.write().await.push(message);
    }

    /// Every message sent or received by `endpoint`, in insertion order
    ///
    /// Returns an owned snapshot; appends that race with the caller are
    /// simply not included.
    pub async fn query_by_participant(&self, endpoint: &EndpointId) -> Vec<Message> {
        self.log
            .read()
            .await
            .iter()
            .filter(|message| message.involves(endpoint))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.log.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, receiver: &str, body: &str) -> Message {
        Message::new(sender.into(), receiver.into(), body.to_string())
    }

    #[tokio::test]
    async fn test_query_filters_by_participant() {
        let store = MessageStore::new();
        store.append(msg("alice", "bob", "1")).await;
        store.append(msg("carol", "dave", "2")).await;
        store.append(msg("bob", "alice", "3")).await;
        store.append(msg("bob", "carol", "4")).await;

        let alice: Vec<_> = store
            .query_by_participant(&"alice".into())
            .await
            .into_iter()
            .map(|m| m.body)
            .collect();
        assert_eq!(alice, vec!["1", "3"]);

        let bob: Vec<_> = store
            .query_by_participant(&"bob".into())
            .await
            .into_iter()
            .map(|m| m.body)
            .collect();
        assert_eq!(bob, vec!["1", "3", "4"]);

        assert!(store.query_by_participant(&"erin".into()).await.is_empty());
    }

    #[tokio::test]
    async fn test_self_message_listed_once() {
        let store = MessageStore::new();
        store.append(msg("alice", "alice", "note")).await;
        assert_eq!(store.query_by_participant(&"alice".into()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let store = MessageStore::new();
        store.append(msg("alice", "bob", "first")).await;

        let snapshot = store.query_by_participant(&"bob".into()).await;
        store.append(msg("alice", "bob", "second")).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.query_by_participant(&"bob".into()).await.len(), 2);
        assert_eq!(store.len().await, 2);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn test_append_never_rejects() {
        let store = MessageStore::new();
        store.append(msg("", "", "")).await;
        assert_eq!(store.len().await, 1);
    }
}
