use std::sync::Arc;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use super::{Subscription, Topic, Unsubscribe};
use crate::transport::Transport;

/// Opens live channels over the transport and turns raw payloads into typed items.
///
/// The hub does not track who holds which topic: each view owns the subscription it
/// opened, and the process-wide notification channel is opened once by the runtime.
#[derive(Clone)]
pub struct SubscriptionHub {
    transport: Arc<dyn Transport>,
    capacity: usize,
}

impl SubscriptionHub {
    pub fn new(transport: Arc<dyn Transport>, capacity: usize) -> Self {
        Self {
            transport,
            capacity: capacity.max(1),
        }
    }

    /// Open the channel for `topic`. Must be called from within a tokio runtime.
    pub fn subscribe<T>(&self, topic: Topic) -> Subscription<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.capacity);
        let handle = Unsubscribe::new(topic);
        let mut frames = self.transport.subscribe(topic.path());

        let pump_handle = handle.clone();
        let pump = tokio::spawn(async move {
            while let Some(frame) = frames.next().await {
                match serde_json::from_value::<T>(frame) {
                    Ok(item) => {
                        if tx.send(item).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(%topic, error = %e, "dropping malformed payload");
                    }
                }
            }
            pump_handle.mark_ended();
            tracing::debug!(%topic, "live channel ended");
        });
        handle.set_pump(pump);

        tracing::info!(%topic, "subscribed to live channel");
        Subscription::new(rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedItem;
    use crate::streaming::SubscriptionState;
    use crate::transport::memory::MemoryTransport;
    use serde_json::json;
    use std::time::Duration;

    fn wire_item(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "post": {
                "id": format!("p{}", id),
                "user": {"username": "alice"},
                "content": "hi",
                "createdAt": "2024-03-01T10:00:00Z"
            }
        })
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_skipped() {
        let transport = Arc::new(MemoryTransport::new());
        let hub = SubscriptionHub::new(transport.clone(), 8);
        let mut sub = hub.subscribe::<FeedItem>(Topic::Feed);

        transport.emit(Topic::Feed.path(), json!({"garbage": true}));
        transport.emit(Topic::Feed.path(), wire_item("1"));
        transport.emit(Topic::Feed.path(), json!("not an object"));
        transport.emit(Topic::Feed.path(), wire_item("2"));

        assert_eq!(sub.recv().await.unwrap().id, "1");
        assert_eq!(sub.recv().await.unwrap().id, "2");
        assert_eq!(sub.state(), SubscriptionState::Open);
    }

    #[tokio::test]
    async fn test_transport_end_closes_subscription() {
        let transport = Arc::new(MemoryTransport::new());
        let hub = SubscriptionHub::new(transport.clone(), 8);
        let mut sub = hub.subscribe::<FeedItem>(Topic::Feed);

        transport.emit(Topic::Feed.path(), wire_item("1"));
        transport.close_channels(Topic::Feed.path());

        assert_eq!(sub.recv().await.unwrap().id, "1");
        assert!(sub.recv().await.is_none());
        assert_eq!(sub.state(), SubscriptionState::Closed);

        // Teardown after the transport already dropped is still fine
        sub.unsubscribe();
        sub.unsubscribe();
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_transport_channel() {
        let transport = Arc::new(MemoryTransport::new());
        let hub = SubscriptionHub::new(transport.clone(), 8);
        let mut sub = hub.subscribe::<FeedItem>(Topic::Feed);
        settle().await;
        assert_eq!(transport.open_channels(Topic::Feed.path()), 1);

        sub.unsubscribe();
        settle().await;
        assert_eq!(transport.open_channels(Topic::Feed.path()), 0);

        transport.emit(Topic::Feed.path(), wire_item("late"));
        assert!(sub.recv().await.is_none());
    }
}
