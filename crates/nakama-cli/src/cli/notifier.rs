use std::collections::HashSet;

use futures::future::BoxFuture;
use nakama_core::notify::{DesktopNotifier, OsNotification, Permission};
use nakama_core::CoreError;
use parking_lot::Mutex;

/// Prints OS notifications to the terminal.
///
/// Permission is decided up front by the `--notify` flag. Tags collapse repeats the
/// way a desktop notification center does.
pub struct TerminalNotifier {
    allowed: bool,
    shown: Mutex<HashSet<String>>,
}

impl TerminalNotifier {
    pub fn new(allowed: bool) -> Self {
        Self {
            allowed,
            shown: Mutex::new(HashSet::new()),
        }
    }

    pub fn format(notification: &OsNotification) -> String {
        format!(
            "[{}] {} ({})",
            notification.title, notification.body, notification.href
        )
    }

    /// Returns false when a notification with this tag is already on screen.
    fn claim(&self, tag: &str) -> bool {
        self.shown.lock().insert(tag.to_string())
    }
}

impl DesktopNotifier for TerminalNotifier {
    fn request_permission(&self) -> BoxFuture<'_, Permission> {
        let permission = if self.allowed {
            Permission::Granted
        } else {
            Permission::Denied
        };
        Box::pin(async move { permission })
    }

    fn show(&self, notification: &OsNotification) -> Result<(), CoreError> {
        if self.claim(&notification.tag) {
            println!("{}", Self::format(notification));
        }
        Ok(())
    }

    fn close(&self, tag: &str) {
        self.shown.lock().remove(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tag: &str) -> OsNotification {
        OsNotification {
            tag: tag.to_string(),
            title: "New notification".to_string(),
            body: "bob liked your post".to_string(),
            href: "/posts/1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_permission_follows_flag() {
        assert_eq!(
            TerminalNotifier::new(true).request_permission().await,
            Permission::Granted
        );
        assert_eq!(
            TerminalNotifier::new(false).request_permission().await,
            Permission::Denied
        );
    }

    #[test]
    fn test_same_tag_collapses_until_closed() {
        let notifier = TerminalNotifier::new(true);
        assert!(notifier.claim("n1"));
        assert!(!notifier.claim("n1"));
        notifier.close("n1");
        assert!(notifier.claim("n1"));
    }

    #[test]
    fn test_format() {
        assert_eq!(
            TerminalNotifier::format(&sample("n1")),
            "[New notification] bob liked your post (/posts/1)"
        );
    }
}
