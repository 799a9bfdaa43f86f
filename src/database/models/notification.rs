use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(NotificationKind::Like),
            "comment" => Some(NotificationKind::Comment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub sender: Uuid,
    pub post: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: Uuid,
    pub sender: Uuid,
    pub post: Uuid,
    pub kind: NotificationKind,
    pub message: String,
}

impl NewNotification {
    pub fn like(recipient: Uuid, sender: Uuid, sender_name: &str, post: Uuid) -> Self {
        Self {
            recipient,
            sender,
            post,
            kind: NotificationKind::Like,
            message: format!("{} liked your post.", sender_name),
        }
    }

    pub fn comment(recipient: Uuid, sender: Uuid, sender_name: &str, post: Uuid) -> Self {
        Self {
            recipient,
            sender,
            post,
            kind: NotificationKind::Comment,
            message: format!("{} commented on your post.", sender_name),
        }
    }

    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient: self.recipient,
            sender: self.sender,
            post: self.post,
            kind: self.kind,
            message: self.message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
