use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StreamItem;
use crate::constants::{MAX_POST_CONTENT_CHARS, MAX_SPOILER_CHARS};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Subject this post spoils; rendered collapsed when set
    #[serde(default)]
    pub spoiler_of: Option<String>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub mine: bool,
    #[serde(default)]
    pub subscribed: bool,
}

/// One entry of the home timeline. `id` is the feed entry id, not the post id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub post: Post,
}

impl FeedItem {
    /// Applied by the like toggle on a cached item.
    pub fn set_liked(&mut self, liked: bool, likes_count: u64) {
        self.post.liked = liked;
        self.post.likes_count = likes_count;
    }

    pub fn href(&self) -> String {
        format!("/posts/{}", self.post.id)
    }
}

impl StreamItem for FeedItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoiler_of: Option<String>,
}

impl CreatePost {
    pub fn new(content: &str, spoiler_of: Option<&str>) -> Result<Self, CoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::invalid_input("post content is empty"));
        }
        if content.chars().count() > MAX_POST_CONTENT_CHARS {
            return Err(CoreError::invalid_input(format!(
                "post content exceeds {} characters",
                MAX_POST_CONTENT_CHARS
            )));
        }

        let spoiler_of = match spoiler_of.map(str::trim) {
            None => None,
            Some("") => return Err(CoreError::invalid_input("spoiler subject is empty")),
            Some(s) if s.chars().count() > MAX_SPOILER_CHARS => {
                return Err(CoreError::invalid_input(format!(
                    "spoiler subject exceeds {} characters",
                    MAX_SPOILER_CHARS
                )))
            }
            Some(s) => Some(s.to_string()),
        };

        Ok(Self {
            content: content.to_string(),
            spoiler_of,
        })
    }
}

#[cfg(test)]
pub(crate) fn feed_item(id: &str) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        post: Post {
            id: format!("post-{}", id),
            user: UserRef {
                username: "alice".to_string(),
                avatar_url: None,
            },
            content: format!("content {}", id),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            spoiler_of: None,
            likes_count: 0,
            liked: false,
            comments_count: 0,
            mine: false,
            subscribed: false,
        },
    }
}
