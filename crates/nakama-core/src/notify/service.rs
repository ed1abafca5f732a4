use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::desktop::{DesktopNotifier, OsNotification, Permission};
use super::policy::{Dispatch, DispatchPolicy};
use crate::models::NotificationEvent;
use crate::store::UnreadBadges;
use crate::streaming::{Subscription, Topic};
use crate::view::ViewTracker;

/// How an OS notification attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Shown,
    PermissionDenied(Permission),
    Failed,
}

/// Process-wide consumer of the notifications channel.
///
/// Routing happens in arrival order. The permission prompt and display run on their
/// own task per event so a pending prompt never holds up later events.
pub struct NotificationService {
    policy: DispatchPolicy,
    badges: UnreadBadges,
    views: ViewTracker,
    notifier: Arc<dyn DesktopNotifier>,
    /// One sender per mounted notifications view
    in_view: Mutex<Vec<mpsc::Sender<NotificationEvent>>>,
    capacity: usize,
}

impl NotificationService {
    pub fn new(
        policy: DispatchPolicy,
        badges: UnreadBadges,
        views: ViewTracker,
        notifier: Arc<dyn DesktopNotifier>,
        capacity: usize,
    ) -> Self {
        Self {
            policy,
            badges,
            views,
            notifier,
            in_view: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn notifier(&self) -> &Arc<dyn DesktopNotifier> {
        &self.notifier
    }

    /// Local channel of events routed to the on-screen list.
    pub fn attach_view(&self) -> Subscription<NotificationEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut in_view = self.in_view.lock();
        in_view.retain(|tx| !tx.is_closed());
        in_view.push(tx);
        Subscription::from_channel(Topic::Notifications, rx)
    }

    /// Apply the policy to one event. Returns the OS notification still to deliver.
    pub fn route(&self, event: NotificationEvent) -> Option<OsNotification> {
        match self.policy.decide(&event, &self.views.current()) {
            Dispatch::InView => {
                self.hand_off(event);
                None
            }
            Dispatch::Notify(notification) => {
                self.badges.on_live_arrival(Topic::Notifications);
                Some(notification)
            }
            Dispatch::Suppress => {
                self.badges.on_live_arrival(Topic::Notifications);
                tracing::debug!(id = %event.id, "notification about current post suppressed");
                None
            }
        }
    }

    pub async fn deliver(&self, notification: OsNotification) -> Delivery {
        let permission = self.notifier.request_permission().await;
        if !permission.is_granted() {
            tracing::debug!(tag = %notification.tag, ?permission, "notification not shown");
            return Delivery::PermissionDenied(permission);
        }

        match self.notifier.show(&notification) {
            Ok(()) => Delivery::Shown,
            Err(e) => {
                tracing::warn!(tag = %notification.tag, error = %e, "failed to show notification");
                Delivery::Failed
            }
        }
    }

    /// Route and, when called for, deliver inline.
    pub async fn dispatch(&self, event: NotificationEvent) -> Option<Delivery> {
        let notification = self.route(event)?;
        Some(self.deliver(notification).await)
    }

    /// Consume `live` until it closes.
    pub fn spawn(self: Arc<Self>, mut live: Subscription<NotificationEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = live.recv().await {
                if let Some(notification) = self.route(event) {
                    let service = self.clone();
                    tokio::spawn(async move {
                        service.deliver(notification).await;
                    });
                }
            }
            tracing::debug!("notification channel closed");
        })
    }

    /// Pass an in-view event to every attached list. When no list takes it, the
    /// badge is set so the event is not lost without a trace.
    fn hand_off(&self, event: NotificationEvent) {
        let mut delivered = 0;
        let mut in_view = self.in_view.lock();
        in_view.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(id = %event.id, "notifications view lagging, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });
        drop(in_view);

        if delivered == 0 {
            tracing::debug!(id = %event.id, "no notifications view took the event");
            self.badges.mark_unread(Topic::Notifications);
        }
    }
}
