use futures::future::BoxFuture;

use crate::error::CoreError;

/// Outcome of asking the user for notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The prompt was closed without an answer
    Dismissed,
    /// The platform has no notification facility
    Unsupported,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Permission::Granted)
    }
}

/// An OS-level notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsNotification {
    /// Collapses repeats of the same event; set to the event id
    pub tag: String,
    pub title: String,
    pub body: String,
    /// App path to open on activation
    pub href: String,
}

/// The platform side of notifications: permission prompt plus display.
pub trait DesktopNotifier: Send + Sync {
    fn request_permission(&self) -> BoxFuture<'_, Permission>;

    fn show(&self, notification: &OsNotification) -> Result<(), CoreError>;

    fn close(&self, _tag: &str) {}
}

#[cfg(test)]
pub(crate) struct RecordingNotifier {
    pub permission: Permission,
    pub prompts: std::sync::atomic::AtomicUsize,
    pub shown: parking_lot::Mutex<Vec<OsNotification>>,
    pub closed: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            prompts: std::sync::atomic::AtomicUsize::new(0),
            shown: parking_lot::Mutex::new(Vec::new()),
            closed: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn shown_tags(&self) -> Vec<String> {
        self.shown.lock().iter().map(|n| n.tag.clone()).collect()
    }
}

#[cfg(test)]
impl DesktopNotifier for RecordingNotifier {
    fn request_permission(&self) -> BoxFuture<'_, Permission> {
        self.prompts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Box::pin(async move { self.permission })
    }

    fn show(&self, notification: &OsNotification) -> Result<(), CoreError> {
        self.shown.lock().push(notification.clone());
        Ok(())
    }

    fn close(&self, tag: &str) {
        self.closed.lock().push(tag.to_string());
    }
}
