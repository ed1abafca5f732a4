//! Per-mount stream views.
//!
//! A view lives from mount to unmount and owns the live queue and the subscription.
//! The cache it works on outlives it (see `runtime::SessionCaches`).

pub mod feed;

pub use feed::PostSubmitted;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::models::StreamItem;
use crate::store::{LiveQueue, SharedCache, UnreadBadges};
use crate::streaming::{Subscription, Topic};
use crate::transport::{get_json, Transport};

pub struct StreamView<T: StreamItem> {
    topic: Topic,
    transport: Arc<dyn Transport>,
    cache: SharedCache<T>,
    queue: LiveQueue<T>,
    live: Subscription<T>,
    badges: Option<UnreadBadges>,
}

impl<T> StreamView<T>
where
    T: StreamItem + DeserializeOwned,
{
    pub fn new(
        topic: Topic,
        transport: Arc<dyn Transport>,
        cache: SharedCache<T>,
        live: Subscription<T>,
    ) -> Self {
        Self {
            topic,
            transport,
            cache,
            queue: LiveQueue::new(),
            live,
            badges: None,
        }
    }

    /// Mark this view's topic unread when live items queue while it is not the
    /// active view.
    pub fn with_badges(mut self, badges: UnreadBadges) -> Self {
        self.badges = Some(badges);
        self
    }

    // ===== Getters =====

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn cache(&self) -> SharedCache<T> {
        self.cache.clone()
    }

    /// Current cache contents, newest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.cache.lock().snapshot()
    }

    pub fn has_more(&self) -> bool {
        self.cache.lock().has_more()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_label(&self) -> Option<String> {
        self.queue.label(self.topic.item_noun())
    }

    pub fn watch_pending(&self) -> watch::Receiver<usize> {
        self.queue.watch_count()
    }

    // ===== Loading =====

    /// Newest page. Served from the cache when this stream was already loaded in
    /// this session.
    pub async fn initial_load(&self) -> Result<Vec<T>, CoreError> {
        if self.cache.lock().is_warm() {
            tracing::debug!(topic = %self.topic, "serving warm cache");
            return Ok(self.snapshot());
        }

        let page: Vec<T> = get_json(self.transport.as_ref(), self.topic.path()).await?;

        let mut cache = self.cache.lock();
        if !cache.is_warm() {
            let appended = cache.complete_initial(page);
            tracing::info!(topic = %self.topic, count = appended.len(), "initial page loaded");
        }
        Ok(cache.snapshot())
    }

    /// Next older page, appended to the tail. Empty without a request when there is
    /// nothing older or a page request is still outstanding.
    pub async fn load_older(&self) -> Result<Vec<T>, CoreError> {
        let cursor = self.cache.lock().begin_older();
        let Some(cursor) = cursor else {
            return Ok(Vec::new());
        };

        let path = format!("{}?before={}", self.topic.path(), cursor);
        match get_json::<Vec<T>>(self.transport.as_ref(), &path).await {
            Ok(page) => {
                let appended = self.cache.lock().complete_older(page);
                tracing::debug!(topic = %self.topic, %cursor, count = appended.len(), "older page loaded");
                Ok(appended)
            }
            Err(e) => {
                self.cache.lock().abort_older();
                Err(e)
            }
        }
    }

    // ===== Live items =====

    /// Queue a live item. Returns false for an echo of something already cached or
    /// already queued.
    pub fn enqueue(&mut self, item: T) -> bool {
        if self.cache.lock().contains(item.id()) {
            tracing::debug!(topic = %self.topic, id = item.id(), "dropping echo of cached item");
            return false;
        }
        if !self.queue.enqueue(item) {
            return false;
        }
        if let Some(badges) = &self.badges {
            badges.on_live_arrival(self.topic);
        }
        true
    }

    /// Wait for the next live item that actually queued. Returns the pending count,
    /// or `None` once the live channel is closed.
    pub async fn next_live(&mut self) -> Option<usize> {
        loop {
            let item = self.live.recv().await?;
            if self.enqueue(item) {
                return Some(self.queue.len());
            }
        }
    }

    /// Move everything queued to the head of the cache. Returns the items in the
    /// order they were prepended (oldest first).
    pub fn flush(&mut self) -> Vec<T> {
        let drained = self.queue.flush();
        let mut cache = self.cache.lock();
        let mut prepended = Vec::with_capacity(drained.len());
        for item in drained {
            // A page may have brought it in while it sat in the queue
            if cache.contains(item.id()) {
                continue;
            }
            cache.prepend(item.clone());
            prepended.push(item);
        }
        prepended
    }

    /// Tear down the live channel. Anything still queued is dropped.
    pub fn unmount(mut self) {
        self.live.unsubscribe();
        let discarded = self.queue.flush().len();
        tracing::debug!(topic = %self.topic, discarded, "stream view unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::paths;
    use crate::models::feed_item::feed_item;
    use crate::models::FeedItem;
    use crate::store::StreamCache;
    use crate::streaming::SubscriptionHub;
    use crate::transport::memory::{Method, MemoryTransport};
    use serde_json::Value;

    fn page(ids: &[&str]) -> Value {
        let items: Vec<FeedItem> = ids.iter().map(|id| feed_item(id)).collect();
        serde_json::to_value(items).unwrap()
    }

    fn wire(id: &str) -> Value {
        serde_json::to_value(feed_item(id)).unwrap()
    }

    fn mount(transport: &Arc<MemoryTransport>, page_size: usize) -> StreamView<FeedItem> {
        mount_with(transport, StreamCache::shared(page_size))
    }

    fn mount_with(
        transport: &Arc<MemoryTransport>,
        cache: SharedCache<FeedItem>,
    ) -> StreamView<FeedItem> {
        let hub = SubscriptionHub::new(transport.clone(), 8);
        StreamView::new(
            Topic::Feed,
            transport.clone(),
            cache,
            hub.subscribe(Topic::Feed),
        )
    }

    fn ids(items: &[FeedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_flush_order_newest_arrival_on_top() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["x", "y"]));
        let mut view = mount(&transport, 25);
        view.initial_load().await.unwrap();

        for id in ["a", "b", "c"] {
            transport.emit(paths::FEED, wire(id));
        }
        assert_eq!(view.next_live().await, Some(1));
        assert_eq!(view.next_live().await, Some(2));
        assert_eq!(view.next_live().await, Some(3));
        assert_eq!(view.pending_label().as_deref(), Some("3 new posts"));
        // Nothing is visible until the flush
        assert_eq!(ids(&view.snapshot()), vec!["x", "y"]);

        let flushed = view.flush();
        assert_eq!(ids(&flushed), vec!["a", "b", "c"]);
        assert_eq!(ids(&view.snapshot()), vec!["c", "b", "a", "x", "y"]);
        assert_eq!(view.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_live_echo_of_cached_item_dropped() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["x"]));
        let mut view = mount(&transport, 25);
        view.initial_load().await.unwrap();

        assert!(!view.enqueue(feed_item("x")));
        assert!(view.enqueue(feed_item("a")));
        assert!(!view.enqueue(feed_item("a")));
        assert_eq!(view.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_warm_cache_skips_request() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["x", "y"]));
        let cache = StreamCache::shared(25);

        let first = mount_with(&transport, cache.clone());
        first.initial_load().await.unwrap();
        first.unmount();

        let second = mount_with(&transport, cache);
        assert_eq!(ids(&second.initial_load().await.unwrap()), vec!["x", "y"]);
        assert_eq!(transport.request_count(Method::Get, paths::FEED), 1);
    }

    #[tokio::test]
    async fn test_load_older_follows_cursor_until_short_page() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["9", "8"]));
        transport.respond_get("/api/feed?before=8", page(&["7", "6"]));
        transport.respond_get("/api/feed?before=6", page(&["5"]));
        let view = mount(&transport, 2);

        view.initial_load().await.unwrap();
        assert!(view.has_more());
        assert_eq!(ids(&view.load_older().await.unwrap()), vec!["7", "6"]);
        assert_eq!(ids(&view.load_older().await.unwrap()), vec!["5"]);
        assert!(!view.has_more());

        assert!(view.load_older().await.unwrap().is_empty());
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(ids(&view.snapshot()), vec!["9", "8", "7", "6", "5"]);
    }

    #[tokio::test]
    async fn test_short_initial_page_disables_paging() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["9"]));
        let view = mount(&transport, 25);

        view.initial_load().await.unwrap();
        assert!(!view.has_more());
        assert!(view.load_older().await.unwrap().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_load_older_error_allows_retry() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["9", "8"]));
        transport.fail_get(
            "/api/feed?before=8",
            crate::error::CoreError::transport("timeout"),
        );
        transport.respond_get("/api/feed?before=8", page(&["7"]));
        let view = mount(&transport, 2);

        view.initial_load().await.unwrap();
        assert!(view.load_older().await.is_err());
        assert_eq!(ids(&view.load_older().await.unwrap()), vec!["7"]);
    }

    #[tokio::test]
    async fn test_older_page_skips_flushed_ids() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["9", "8"]));
        transport.respond_get("/api/feed?before=8", page(&["7", "6"]));
        let mut view = mount(&transport, 2);
        view.initial_load().await.unwrap();

        // Out-of-order live delivery of something that also appears in an older page
        view.enqueue(feed_item("7"));
        view.flush();
        assert_eq!(ids(&view.load_older().await.unwrap()), vec!["6"]);
        assert_eq!(ids(&view.snapshot()), vec!["7", "9", "8", "6"]);
    }

    #[tokio::test]
    async fn test_end_of_live_stream() {
        let transport = Arc::new(MemoryTransport::new());
        let mut view = mount(&transport, 25);

        transport.emit(paths::FEED, wire("a"));
        transport.close_channels(paths::FEED);

        assert_eq!(view.next_live().await, Some(1));
        assert_eq!(view.next_live().await, None);
        assert_eq!(ids(&view.flush()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_unmount_discards_queue_keeps_cache() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond_get(paths::FEED, page(&["x"]));
        let cache = StreamCache::shared(25);
        let mut view = mount_with(&transport, cache.clone());
        view.initial_load().await.unwrap();
        view.enqueue(feed_item("a"));

        view.unmount();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(transport.open_channels(paths::FEED), 0);
        assert_eq!(ids(&cache.lock().snapshot()), vec!["x"]);
    }
}
