use super::desktop::OsNotification;
use crate::constants::NOTIFICATION_TITLE;
use crate::models::NotificationEvent;
use crate::view::View;

/// What to do with one live notification event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The notification list is on screen: hand the event to it
    InView,
    /// Mark unread and raise an OS notification
    Notify(OsNotification),
    /// Mark unread, nothing else
    Suppress,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchPolicy {
    /// Stay quiet about the post the user is already reading
    pub suppress_current_post: bool,
}

impl DispatchPolicy {
    pub fn new(suppress_current_post: bool) -> Self {
        Self {
            suppress_current_post,
        }
    }

    pub fn decide(&self, event: &NotificationEvent, active: &View) -> Dispatch {
        if *active == View::Notifications {
            return Dispatch::InView;
        }

        if self.suppress_current_post {
            if let (View::Post { post_id }, Some(target)) = (active, event.post_id()) {
                if post_id == target {
                    return Dispatch::Suppress;
                }
            }
        }

        Dispatch::Notify(OsNotification {
            tag: event.id.clone(),
            title: NOTIFICATION_TITLE.to_string(),
            body: event.message(),
            href: event.href(),
        })
    }
}
