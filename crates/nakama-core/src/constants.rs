//! Application-wide constants
//!
//! Endpoint paths and limits shared by the transport, the stream views and the CLI.

/// Default server the CLI talks to when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Server page size. A page shorter than this means there is nothing older.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Buffer between a subscription's pump task and its consumer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

// Post limits enforced before submission (mirrors the server's form limits)
pub const MAX_POST_CONTENT_CHARS: usize = 480;
pub const MAX_SPOILER_CHARS: usize = 128;

/// Title used for every OS notification; the body carries the message
pub const NOTIFICATION_TITLE: &str = "New notification";

pub mod paths {
    pub const FEED: &str = "/api/feed";
    pub const NOTIFICATIONS: &str = "/api/notifications";
    pub const CHECK_UNREAD_NOTIFICATIONS: &str = "/api/check_unread_notifications";
    pub const POSTS: &str = "/api/posts";
}
