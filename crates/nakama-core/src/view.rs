//! What the user is currently looking at.
//!
//! The active view decides two things: whether a notification is handed to the open
//! list instead of the OS, and which unread badge gets cleared on navigation.

use std::sync::Arc;

use tokio::sync::watch;

use crate::streaming::Topic;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Notifications,
    Post {
        post_id: String,
    },
    User {
        username: String,
    },
    Other(String),
}

impl View {
    /// Parse an app path such as `/posts/42` or `/notifications`.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => View::Feed,
            ["notifications"] => View::Notifications,
            ["posts", post_id] => View::Post {
                post_id: (*post_id).to_string(),
            },
            ["users", username] => View::User {
                username: (*username).to_string(),
            },
            _ => View::Other(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::Feed => "/".to_string(),
            View::Notifications => "/notifications".to_string(),
            View::Post { post_id } => format!("/posts/{}", post_id),
            View::User { username } => format!("/users/{}", username),
            View::Other(path) => path.clone(),
        }
    }

    /// The live topic this view displays, if any.
    pub fn topic(&self) -> Option<Topic> {
        match self {
            View::Feed => Some(Topic::Feed),
            View::Notifications => Some(Topic::Notifications),
            _ => None,
        }
    }
}

/// Shared, observable active view.
#[derive(Debug, Clone)]
pub struct ViewTracker {
    tx: Arc<watch::Sender<View>>,
}

impl ViewTracker {
    pub fn new(initial: View) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> View {
        self.tx.borrow().clone()
    }

    pub fn is_active(&self, topic: Topic) -> bool {
        self.tx.borrow().topic() == Some(topic)
    }

    /// Returns the previously active view.
    pub fn set(&self, view: View) -> View {
        self.tx.send_replace(view)
    }

    pub fn watch(&self) -> watch::Receiver<View> {
        self.tx.subscribe()
    }
}

impl Default for ViewTracker {
    fn default() -> Self {
        Self::new(View::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(View::from_path("/"), View::Feed);
        assert_eq!(View::from_path("/notifications"), View::Notifications);
        assert_eq!(
            View::from_path("/posts/42?x=1"),
            View::Post {
                post_id: "42".to_string()
            }
        );
        assert_eq!(
            View::from_path("/users/alice/"),
            View::User {
                username: "alice".to_string()
            }
        );
        assert_eq!(
            View::from_path("/users/alice/followers"),
            View::Other("/users/alice/followers".to_string())
        );
    }

    #[test]
    fn test_path_round_trips_through_parser() {
        for view in [
            View::Feed,
            View::Notifications,
            View::Post {
                post_id: "9".to_string(),
            },
            View::User {
                username: "bob".to_string(),
            },
        ] {
            assert_eq!(View::from_path(&view.path()), view);
        }
    }

    #[test]
    fn test_tracker_set_and_active() {
        let tracker = ViewTracker::default();
        assert!(tracker.is_active(Topic::Feed));

        let previous = tracker.set(View::Notifications);
        assert_eq!(previous, View::Feed);
        assert!(tracker.is_active(Topic::Notifications));
        assert!(!tracker.is_active(Topic::Feed));

        let rx = tracker.watch();
        tracker.set(View::from_path("/search"));
        assert_eq!(*rx.borrow(), View::Other("/search".to_string()));
    }
}
