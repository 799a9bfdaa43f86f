use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{NewNotification, Notification};
use crate::database::repositories::NotificationRepository;
use crate::error::AppError;

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// 发送通知，失败只记录日志，不影响触发它的操作
    pub async fn emit(&self, notification: NewNotification) {
        let recipient = notification.recipient;
        let kind = notification.kind;
        if let Err(e) = self.notifications.create(notification).await {
            tracing::warn!(
                "Failed to create {} notification for {}: {}",
                kind.as_str(),
                recipient,
                e
            );
        }
    }

    pub async fn list(&self, recipient: Uuid) -> Result<Vec<Notification>, AppError> {
        Ok(self.notifications.list_for(recipient).await?)
    }

    pub async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, AppError> {
        Ok(self.notifications.mark_all_read(recipient).await?)
    }

    pub async fn unread_count(&self, recipient: Uuid) -> Result<i64, AppError> {
        Ok(self.notifications.unread_count(recipient).await?)
    }
}
