use std::sync::Arc;

use tokio::sync::watch;

use crate::streaming::Topic;
use crate::transport::{get_json, Transport};
use crate::view::ViewTracker;

/// Which topics currently show an unread marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeState {
    pub feed: bool,
    pub notifications: bool,
}

impl BadgeState {
    pub fn get(&self, topic: Topic) -> bool {
        match topic {
            Topic::Feed => self.feed,
            Topic::Notifications => self.notifications,
        }
    }

    fn slot(&mut self, topic: Topic) -> &mut bool {
        match topic {
            Topic::Feed => &mut self.feed,
            Topic::Notifications => &mut self.notifications,
        }
    }
}

/// Per-topic unread badges, shared by every view.
///
/// Set by the unread probe and by live arrivals; cleared only when the topic's view
/// becomes active. Watchers are woken on actual transitions, never on a repeated set.
#[derive(Debug, Clone)]
pub struct UnreadBadges {
    tx: Arc<watch::Sender<BadgeState>>,
    views: ViewTracker,
}

impl UnreadBadges {
    pub fn new(views: ViewTracker) -> Self {
        let (tx, _rx) = watch::channel(BadgeState::default());
        Self {
            tx: Arc::new(tx),
            views,
        }
    }

    // ===== Getters =====

    pub fn is_unread(&self, topic: Topic) -> bool {
        self.tx.borrow().get(topic)
    }

    pub fn state(&self) -> BadgeState {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<BadgeState> {
        self.tx.subscribe()
    }

    // ===== Mutations =====

    /// Ask the server whether anything is unread. Skipped while the topic is on
    /// screen; failures are logged and read as "nothing unread".
    pub async fn probe_unread(&self, transport: &dyn Transport, topic: Topic) -> bool {
        if self.views.is_active(topic) {
            return false;
        }
        let Some(path) = topic.unread_probe_path() else {
            return false;
        };

        match get_json::<bool>(transport, path).await {
            Ok(true) => {
                self.set(topic);
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(%topic, error = %e, "unread probe failed");
                false
            }
        }
    }

    /// A live item arrived for `topic`. No-op while that view is active.
    pub fn on_live_arrival(&self, topic: Topic) {
        if self.views.is_active(topic) {
            return;
        }
        self.set(topic);
    }

    /// Set the badge even while the topic's view is active. Used when a live item
    /// could not be handed to that view.
    pub fn mark_unread(&self, topic: Topic) {
        self.set(topic);
    }

    pub fn clear(&self, topic: Topic) {
        self.tx.send_if_modified(|state| {
            let slot = state.slot(topic);
            let changed = *slot;
            *slot = false;
            changed
        });
    }

    fn set(&self, topic: Topic) {
        let changed = self.tx.send_if_modified(|state| {
            let slot = state.slot(topic);
            let changed = !*slot;
            *slot = true;
            changed
        });
        if changed {
            tracing::debug!(%topic, "badge set");
        }
    }
}
