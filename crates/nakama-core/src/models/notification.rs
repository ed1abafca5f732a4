use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::StreamItem;

/// What happened, with the fields each kind needs for its message and link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    Like { post_id: String },
    /// Any `comment*` verb (plain comment, comment mention, ...)
    Comment { post_id: String },
    Follow,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNotification")]
pub struct NotificationEvent {
    pub id: String,
    pub kind: NotificationKind,
    /// Username of whoever triggered the notification
    pub actor: String,
    pub issued_at: DateTime<Utc>,
    pub read: bool,
}

/// Wire shape. Only used at the parse boundary.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotification {
    id: String,
    verb: String,
    #[serde(default)]
    target_id: Option<String>,
    actor: String,
    issued_at: DateTime<Utc>,
    #[serde(default)]
    read: bool,
}

impl TryFrom<RawNotification> for NotificationEvent {
    type Error = String;

    fn try_from(raw: RawNotification) -> Result<Self, Self::Error> {
        let post_id = |verb: &str| {
            raw.target_id
                .clone()
                .ok_or_else(|| format!("{} notification without targetId", verb))
        };

        let kind = match raw.verb.as_str() {
            "like" => NotificationKind::Like {
                post_id: post_id("like")?,
            },
            "follow" => NotificationKind::Follow,
            verb if verb.starts_with("comment") => NotificationKind::Comment {
                post_id: post_id(verb)?,
            },
            other => return Err(format!("unknown notification verb: {}", other)),
        };

        Ok(NotificationEvent {
            id: raw.id,
            kind,
            actor: raw.actor,
            issued_at: raw.issued_at,
            read: raw.read,
        })
    }
}

impl NotificationEvent {
    pub fn message(&self) -> String {
        match &self.kind {
            NotificationKind::Like { .. } => format!("{} liked your post", self.actor),
            NotificationKind::Comment { .. } => format!("{} commented on your post", self.actor),
            NotificationKind::Follow => format!("{} followed you", self.actor),
        }
    }

    /// Where activating the notification should lead.
    pub fn href(&self) -> String {
        match &self.kind {
            NotificationKind::Like { post_id } | NotificationKind::Comment { post_id } => {
                format!("/posts/{}", post_id)
            }
            NotificationKind::Follow => format!("/users/{}", self.actor),
        }
    }

    pub fn post_id(&self) -> Option<&str> {
        match &self.kind {
            NotificationKind::Like { post_id } | NotificationKind::Comment { post_id } => {
                Some(post_id)
            }
            NotificationKind::Follow => None,
        }
    }
}

impl StreamItem for NotificationEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
pub(crate) fn notification(id: &str, kind: NotificationKind) -> NotificationEvent {
    NotificationEvent {
        id: id.to_string(),
        kind,
        actor: "bob".to_string(),
        issued_at: DateTime::<Utc>::UNIX_EPOCH,
        read: false,
    }
}
