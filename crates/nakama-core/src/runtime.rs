use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::CoreConfig;
use crate::models::{FeedItem, NotificationEvent};
use crate::notify::{DesktopNotifier, DispatchPolicy, NotificationService, OsNotification};
use crate::session::StreamView;
use crate::store::{SharedCache, StreamCache, UnreadBadges};
use crate::streaming::{SubscriptionHub, Topic, Unsubscribe};
use crate::transport::Transport;
use crate::view::{View, ViewTracker};

/// Stream caches for the login session.
///
/// The feed cache survives unmounts. The notifications cache is reset on every
/// mount, since events keep arriving while the list is closed and only reach it
/// through a fresh fetch.
#[derive(Clone)]
pub struct SessionCaches {
    pub feed: SharedCache<FeedItem>,
    pub notifications: SharedCache<NotificationEvent>,
}

impl SessionCaches {
    pub fn new(page_size: usize) -> Self {
        Self {
            feed: StreamCache::shared(page_size),
            notifications: StreamCache::shared(page_size),
        }
    }

    pub fn clear(&self) {
        self.feed.lock().clear();
        self.notifications.lock().clear();
    }
}

/// Composition root: one per logged-in session.
pub struct CoreRuntime {
    config: CoreConfig,
    transport: Arc<dyn Transport>,
    hub: SubscriptionHub,
    views: ViewTracker,
    badges: UnreadBadges,
    caches: SessionCaches,
    notifications: Arc<NotificationService>,
    service_task: Mutex<Option<JoinHandle<()>>>,
    live_handle: Mutex<Option<Unsubscribe>>,
}

impl CoreRuntime {
    pub fn new(
        config: CoreConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn DesktopNotifier>,
    ) -> Self {
        let config = config.normalized();
        let views = ViewTracker::default();
        let badges = UnreadBadges::new(views.clone());
        let notifications = Arc::new(NotificationService::new(
            DispatchPolicy::new(config.suppress_current_post),
            badges.clone(),
            views.clone(),
            notifier,
            config.channel_capacity,
        ));

        Self {
            hub: SubscriptionHub::new(transport.clone(), config.channel_capacity),
            caches: SessionCaches::new(config.page_size),
            transport,
            views,
            badges,
            notifications,
            service_task: Mutex::new(None),
            live_handle: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub fn views(&self) -> &ViewTracker {
        &self.views
    }

    pub fn badges(&self) -> &UnreadBadges {
        &self.badges
    }

    pub fn caches(&self) -> &SessionCaches {
        &self.caches
    }

    pub fn is_started(&self) -> bool {
        self.service_task.lock().is_some()
    }

    /// Open the process-wide notifications channel and run the unread probe.
    /// Calling it again is a no-op.
    pub async fn start(&self) {
        {
            let mut task = self.service_task.lock();
            if task.is_some() {
                return;
            }
            let live = self.hub.subscribe::<NotificationEvent>(Topic::Notifications);
            *self.live_handle.lock() = Some(live.handle());
            *task = Some(self.notifications.clone().spawn(live));
        }
        tracing::info!(base_url = %self.config.base_url, "runtime started");

        self.probe_unread().await;
    }

    pub async fn probe_unread(&self) -> bool {
        self.badges
            .probe_unread(self.transport.as_ref(), Topic::Notifications)
            .await
    }

    /// Make `view` the active view and clear its topic's badge. Returns the previous
    /// view.
    pub fn navigate(&self, view: View) -> View {
        if let Some(topic) = view.topic() {
            self.badges.clear(topic);
        }
        let previous = self.views.set(view);
        tracing::debug!(from = %previous.path(), to = %self.views.current().path(), "navigated");
        previous
    }

    /// Live posts that queue while another view is active set the feed badge.
    pub fn mount_feed(&self) -> StreamView<FeedItem> {
        tracing::info!("mounting feed view");
        StreamView::new(
            Topic::Feed,
            self.transport.clone(),
            self.caches.feed.clone(),
            self.hub.subscribe(Topic::Feed),
        )
        .with_badges(self.badges.clone())
    }

    /// Live events reach this view through the notification service, so it only
    /// sees anything after `start`. Mount before `start` to catch the first one.
    ///
    /// The list always refetches its first page.
    pub fn mount_notifications(&self) -> StreamView<NotificationEvent> {
        tracing::info!("mounting notifications view");
        self.badges.clear(Topic::Notifications);
        self.caches.notifications.lock().clear();
        StreamView::new(
            Topic::Notifications,
            self.transport.clone(),
            self.caches.notifications.clone(),
            self.notifications.attach_view(),
        )
    }

    /// The user clicked an OS notification.
    pub fn activate_notification(&self, notification: &OsNotification) -> View {
        let target = View::from_path(&notification.href);
        self.navigate(target.clone());
        self.notifications.notifier().close(&notification.tag);
        target
    }

    /// End the session: stop the notifications channel and forget cached streams.
    pub fn shutdown(&self) {
        if let Some(handle) = self.live_handle.lock().take() {
            handle.unsubscribe();
        }
        if let Some(task) = self.service_task.lock().take() {
            task.abort();
        }
        self.caches.clear();
        tracing::info!("runtime shut down");
    }
}

impl Drop for CoreRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.live_handle.lock().take() {
            handle.unsubscribe();
        }
    }
}
