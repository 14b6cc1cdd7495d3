//! In-app notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::NotificationId;
use super::id::resolve_id;

/// A notification addressed to the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawNotification")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: NotificationId,
    #[serde(default)]
    pub message: String,
    /// Whether the user has opened it. Some endpoints call this `isRead`.
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotification {
    #[serde(default, rename = "_id")]
    document_id: Option<NotificationId>,
    #[serde(default)]
    id: Option<NotificationId>,
    #[serde(default)]
    message: String,
    #[serde(default, alias = "isRead")]
    read: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawNotification> for Notification {
    type Error = String;

    fn try_from(raw: RawNotification) -> Result<Self, Self::Error> {
        Ok(Self {
            id: resolve_id(raw.document_id, raw.id)?,
            message: raw.message,
            read: raw.read,
            created_at: raw.created_at,
            extra: raw.extra,
        })
    }
}

/// Which notifications to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl NotificationFilter {
    #[must_use]
    pub const fn matches(self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !notification.read,
            Self::Read => notification.read,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for NotificationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            _ => Err(format!("invalid filter: {s}. Valid filters: all, unread, read")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn notification(read: bool) -> Notification {
        Notification {
            id: NotificationId::new("n"),
            message: String::new(),
            read,
            created_at: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_filter_matches() {
        assert!(NotificationFilter::All.matches(&notification(true)));
        assert!(NotificationFilter::All.matches(&notification(false)));
        assert!(NotificationFilter::Unread.matches(&notification(false)));
        assert!(!NotificationFilter::Unread.matches(&notification(true)));
        assert!(NotificationFilter::Read.matches(&notification(true)));
        assert!(!NotificationFilter::Read.matches(&notification(false)));
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("Unread".parse(), Ok(NotificationFilter::Unread));
        assert!("archived".parse::<NotificationFilter>().is_err());
    }

    #[test]
    fn test_notification_read_alias() {
        let n: Notification = serde_json::from_value(json!({
            "_id": "n1",
            "message": "Application viewed",
            "isRead": true,
            "createdAt": "2026-10-01T09:00:00Z"
        }))
        .expect("notification");
        assert!(n.read);
        assert_eq!(n.created_at.as_deref(), Some("2026-10-01T09:00:00Z"));
    }

    #[test]
    fn test_notification_with_both_id_fields() {
        let n: Notification = serde_json::from_value(json!({
            "_id": "n1",
            "id": "n1",
            "message": "Interview scheduled"
        }))
        .expect("notification");
        assert_eq!(n.id, NotificationId::new("n1"));
        assert!(!n.extra.contains_key("id"));

        let n: Notification =
            serde_json::from_value(json!({"id": "n2", "read": true})).expect("notification");
        assert_eq!(n.id, NotificationId::new("n2"));
        assert!(n.read);
    }
}
