pub mod feed_item;
pub mod notification;

pub use feed_item::{CreatePost, FeedItem, Post, UserRef};
pub use notification::{NotificationEvent, NotificationKind};

/// Anything a stream can hold: identified by a server id, cheap to clone.
pub trait StreamItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}
