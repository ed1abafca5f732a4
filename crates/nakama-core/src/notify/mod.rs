//! Turning live notification events into in-view updates or OS notifications.

pub mod desktop;
pub mod policy;
pub mod service;

pub use desktop::{DesktopNotifier, OsNotification, Permission};
pub use policy::{Dispatch, DispatchPolicy};
pub use service::{Delivery, NotificationService};
