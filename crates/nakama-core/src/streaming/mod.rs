pub mod hub;
pub mod subscription;

pub use hub::SubscriptionHub;
pub use subscription::{Subscription, SubscriptionState, Unsubscribe};

use std::fmt;

use crate::constants::paths;

/// A named live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Feed,
    Notifications,
}

impl Topic {
    /// Endpoint serving both the paginated list and the event stream.
    pub fn path(&self) -> &'static str {
        match self {
            Topic::Feed => paths::FEED,
            Topic::Notifications => paths::NOTIFICATIONS,
        }
    }

    /// One-shot "anything unread?" endpoint, where the server has one.
    pub fn unread_probe_path(&self) -> Option<&'static str> {
        match self {
            Topic::Feed => None,
            Topic::Notifications => Some(paths::CHECK_UNREAD_NOTIFICATIONS),
        }
    }

    /// Noun for the pending label ("3 new posts").
    pub fn item_noun(&self) -> &'static str {
        match self {
            Topic::Feed => "post",
            Topic::Notifications => "notification",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Feed => write!(f, "feed"),
            Topic::Notifications => write!(f, "notifications"),
        }
    }
}
