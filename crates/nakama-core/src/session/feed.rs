use super::StreamView;
use crate::constants::paths;
use crate::error::CoreError;
use crate::models::{CreatePost, FeedItem};
use crate::transport::post_json;

/// Result of a successful post submission.
#[derive(Debug, Clone)]
pub struct PostSubmitted {
    /// Queued live items that were flushed ahead of the new post
    pub flushed: Vec<FeedItem>,
    pub item: FeedItem,
}

impl StreamView<FeedItem> {
    /// Publish a post. Pending live items are flushed first so the new post lands on
    /// top; the live echo of it is later dropped as a duplicate.
    pub async fn submit_post(&mut self, post: CreatePost) -> Result<PostSubmitted, CoreError> {
        let payload = serde_json::to_value(&post)?;
        let item: FeedItem = post_json(self.transport.as_ref(), paths::POSTS, payload).await?;

        let flushed = self.flush();
        {
            let mut cache = self.cache.lock();
            if !cache.contains(&item.id) {
                cache.prepend(item.clone());
            }
        }
        tracing::info!(id = %item.id, flushed = flushed.len(), "post submitted");

        Ok(PostSubmitted { flushed, item })
    }

    /// Reflect a like toggle on a cached item. Returns false if it is not cached.
    pub fn set_liked(&self, id: &str, liked: bool, likes_count: u64) -> bool {
        self.cache
            .lock()
            .update(id, |item| item.set_liked(liked, likes_count))
    }
}
