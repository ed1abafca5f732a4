use chrono::{DateTime, Utc};
use nakama_core::models::{FeedItem, NotificationEvent};
use nakama_core::store::BadgeState;

/// Relative age such as "5m ago"; older than a week falls back to the date.
pub fn ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 7 * 86_400 => format!("{}d ago", s / 86_400),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

pub fn feed_line(item: &FeedItem, now: DateTime<Utc>) -> String {
    let post = &item.post;
    let content = match &post.spoiler_of {
        Some(subject) => format!("[spoiler of {}]", subject),
        None => post.content.replace('\n', " "),
    };
    let liked = if post.liked { "*" } else { "" };
    format!(
        "{:>10}  @{}: {}  ({}{} likes, {} comments)",
        ago(post.created_at, now),
        post.user.username,
        content,
        post.likes_count,
        liked,
        post.comments_count
    )
}

pub fn notification_line(event: &NotificationEvent, now: DateTime<Utc>) -> String {
    let marker = if event.read { " " } else { "•" };
    format!(
        "{} {:>10}  {}  -> {}",
        marker,
        ago(event.issued_at, now),
        event.message(),
        event.href()
    )
}

pub fn badge_line(state: BadgeState) -> String {
    let flag = |unread: bool| if unread { "unread" } else { "read" };
    format!(
        "badges: feed {}, notifications {}",
        flag(state.feed),
        flag(state.notifications)
    )
}
