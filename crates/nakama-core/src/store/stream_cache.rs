use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::StreamItem;

/// Cache shared between successive mounts of the same stream.
pub type SharedCache<T> = Arc<Mutex<StreamCache<T>>>;

/// Newest-first materialized items of one stream, plus the pagination cursor.
///
/// Items enter at the tail from historical pages and at the head from flushed live
/// items. The id index is the only dedup authority: every id appears at most once.
#[derive(Debug)]
pub struct StreamCache<T> {
    items: VecDeque<T>,
    ids: HashSet<String>,
    /// Id of the oldest historically-loaded item
    cursor: Option<String>,
    page_size: usize,
    loaded: bool,
    has_more: bool,
    page_in_flight: bool,
}

impl<T: StreamItem> StreamCache<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            ids: HashSet::new(),
            cursor: None,
            page_size,
            loaded: false,
            has_more: false,
            page_in_flight: false,
        }
    }

    pub fn shared(page_size: usize) -> SharedCache<T> {
        Arc::new(Mutex::new(Self::new(page_size)))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.cursor = None;
        self.loaded = false;
        self.has_more = false;
        self.page_in_flight = false;
    }

    // ===== Getters =====

    /// True once the newest page has been fetched this session.
    pub fn is_warm(&self) -> bool {
        self.loaded
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().find(|item| item.id() == id)
    }

    // ===== Mutations =====

    /// Insert at the head. Callers check `contains` first.
    pub fn prepend(&mut self, item: T) {
        debug_assert!(
            !self.ids.contains(item.id()),
            "prepend of duplicate id {}",
            item.id()
        );
        self.ids.insert(item.id().to_string());
        self.items.push_front(item);
    }

    /// Mutate a cached item in place (like toggles). Returns false if absent.
    pub fn update<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if !self.contains(id) {
            return false;
        }
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Store the newest page. Returns what was actually appended.
    pub fn complete_initial(&mut self, page: Vec<T>) -> Vec<T> {
        self.loaded = true;
        self.append_page(page)
    }

    /// Claim the next older page. `None` when there is no cursor, the stream is
    /// exhausted, or another page request has not come back yet.
    pub fn begin_older(&mut self) -> Option<String> {
        if self.page_in_flight || !self.has_more {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.page_in_flight = true;
        Some(cursor)
    }

    pub fn complete_older(&mut self, page: Vec<T>) -> Vec<T> {
        self.page_in_flight = false;
        self.append_page(page)
    }

    /// Release the claim after a failed request so the caller can retry.
    pub fn abort_older(&mut self) {
        self.page_in_flight = false;
    }

    fn append_page(&mut self, page: Vec<T>) -> Vec<T> {
        self.has_more = page.len() >= self.page_size;
        if let Some(oldest) = page.last() {
            self.cursor = Some(oldest.id().to_string());
        }

        let mut appended = Vec::with_capacity(page.len());
        for item in page {
            // A live item flushed moments ago can also come back in a page
            if self.ids.insert(item.id().to_string()) {
                self.items.push_back(item.clone());
                appended.push(item);
            }
        }
        appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feed_item::feed_item;
    use crate::models::FeedItem;

    fn ids(cache: &StreamCache<FeedItem>) -> Vec<String> {
        cache.iter().map(|i| i.id.clone()).collect()
    }

    fn page(range: std::ops::RangeInclusive<u32>) -> Vec<FeedItem> {
        range.rev().map(|n| feed_item(&n.to_string())).collect()
    }

    #[test]
    fn test_initial_page_sets_cursor_and_more() {
        let mut cache = StreamCache::new(3);
        assert!(!cache.is_warm());
        assert!(cache.begin_older().is_none());

        let appended = cache.complete_initial(page(8..=10));
        assert_eq!(appended.len(), 3);
        assert!(cache.is_warm());
        assert_eq!(cache.cursor(), Some("8"));
        assert!(cache.has_more());
        assert_eq!(ids(&cache), vec!["10", "9", "8"]);
    }

    #[test]
    fn test_short_page_ends_stream() {
        let mut cache = StreamCache::new(3);
        cache.complete_initial(page(8..=10));

        let cursor = cache.begin_older().unwrap();
        assert_eq!(cursor, "8");
        cache.complete_older(page(6..=7));

        assert!(!cache.has_more());
        assert_eq!(cache.cursor(), Some("6"));
        assert!(cache.begin_older().is_none());
    }

    #[test]
    fn test_empty_stream_never_paginates() {
        let mut cache: StreamCache<FeedItem> = StreamCache::new(3);
        cache.complete_initial(Vec::new());
        assert!(cache.is_warm());
        assert_eq!(cache.cursor(), None);
        assert!(cache.begin_older().is_none());
    }

    #[test]
    fn test_only_one_older_page_in_flight() {
        let mut cache = StreamCache::new(3);
        cache.complete_initial(page(8..=10));

        assert!(cache.begin_older().is_some());
        assert!(cache.begin_older().is_none());

        cache.abort_older();
        assert_eq!(cache.begin_older().as_deref(), Some("8"));
    }

    #[test]
    fn test_prepend_goes_to_front() {
        let mut cache = StreamCache::new(3);
        cache.complete_initial(page(1..=2));
        cache.prepend(feed_item("3"));
        assert_eq!(ids(&cache), vec!["3", "2", "1"]);
        assert!(cache.contains("3"));
    }

    #[test]
    fn test_page_overlapping_live_items_is_deduped() {
        let mut cache = StreamCache::new(3);
        cache.complete_initial(page(5..=7));
        cache.prepend(feed_item("8"));

        let cursor = cache.begin_older().unwrap();
        assert_eq!(cursor, "5");
        // Server returned a boundary item we already hold
        let appended = cache.complete_older(vec![feed_item("8"), feed_item("4"), feed_item("3")]);

        assert_eq!(appended.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["4", "3"]);
        assert_eq!(ids(&cache), vec!["8", "7", "6", "5", "4", "3"]);
        assert_eq!(cache.cursor(), Some("3"));
    }

    #[test]
    fn test_no_duplicates_across_mixed_operations() {
        let mut cache = StreamCache::new(2);
        cache.complete_initial(page(9..=10));
        for n in [11, 12] {
            let id = n.to_string();
            if !cache.contains(&id) {
                cache.prepend(feed_item(&id));
            }
        }
        cache.begin_older();
        cache.complete_older(vec![feed_item("10"), feed_item("8")]);
        cache.begin_older();
        cache.complete_older(vec![feed_item("12"), feed_item("7")]);

        let all = ids(&cache);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all, vec!["12", "11", "10", "9", "8", "7"]);
    }

    #[test]
    fn test_update_in_place() {
        let mut cache = StreamCache::new(3);
        cache.complete_initial(page(1..=2));

        assert!(cache.update("1", |item: &mut FeedItem| item.set_liked(true, 1)));
        assert!(cache.get("1").unwrap().post.liked);
        assert!(!cache.update("missing", |_| {}));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cache = StreamCache::new(2);
        cache.complete_initial(page(1..=2));
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.is_warm());
        assert_eq!(cache.cursor(), None);
        assert!(!cache.contains("1"));
    }
}
