use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::notification_dto::{NotificationDetailsResponse, NotificationListResponse};
use crate::repository::notification_repo::{
    NotificationRepository, SqliteNotificationRepository,
};
use crate::util::error::{ServiceError, ServiceResult};

/// Operations over the manufacturer-facing upload notifications. Creation
/// has no entry point here: notifications are only ever written inside the
/// file-upload transaction.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> ServiceResult<NotificationListResponse>;
    /// Notification plus its file metadata; marks the notification read.
    async fn details(&self, id: i64) -> ServiceResult<NotificationDetailsResponse>;
    async fn mark_read(&self, id: i64) -> ServiceResult<bool>;
    async fn mark_all_read(&self) -> ServiceResult<u64>;
    async fn delete(&self, id: i64) -> ServiceResult<bool>;
    async fn delete_all(&self) -> ServiceResult<u64>;
}

pub struct NotificationServiceImpl {
    pub notification_repo: Arc<SqliteNotificationRepository>,
}

impl NotificationServiceImpl {
    pub fn new(notification_repo: Arc<SqliteNotificationRepository>) -> Self {
        NotificationServiceImpl { notification_repo }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    #[instrument(skip(self), fields(limit = limit, offset = offset, unread_only = unread_only))]
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> ServiceResult<NotificationListResponse> {
        info!("Listing notifications");
        let res = self.notification_repo.list(limit, offset, unread_only).await;
        match res {
            Ok((total, unread_count, notifications)) => {
                info!("Fetched {} notifications", notifications.len());
                Ok(NotificationListResponse {
                    total,
                    unread_count,
                    notifications,
                })
            }
            Err(e) => {
                error!("Failed to list notifications: {e}");
                Err(ServiceError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(id = id))]
    async fn details(&self, id: i64) -> ServiceResult<NotificationDetailsResponse> {
        info!("Fetching notification details");
        let (notification, file) = self
            .notification_repo
            .get_with_file(id)
            .await
            .map_err(ServiceError::from)?;
        self.notification_repo
            .mark_read(id)
            .await
            .map_err(ServiceError::from)?;
        Ok(NotificationDetailsResponse { notification, file })
    }

    #[instrument(skip(self), fields(id = id))]
    async fn mark_read(&self, id: i64) -> ServiceResult<bool> {
        let res = self.notification_repo.mark_read(id).await;
        match &res {
            Ok(true) => info!("Notification marked as read"),
            Ok(false) => info!("Notification not found"),
            Err(e) => error!("Failed to mark notification as read: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self) -> ServiceResult<u64> {
        let res = self.notification_repo.mark_all_read().await;
        match &res {
            Ok(count) => info!("Marked {} notifications as read", count),
            Err(e) => error!("Failed to mark all notifications as read: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn delete(&self, id: i64) -> ServiceResult<bool> {
        let res = self.notification_repo.delete(id).await;
        match &res {
            Ok(true) => info!("Notification deleted"),
            Ok(false) => info!("Notification not found, nothing deleted"),
            Err(e) => error!("Failed to delete notification: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> ServiceResult<u64> {
        let res = self.notification_repo.delete_all().await;
        match &res {
            Ok(count) => info!("Deleted {} notifications", count),
            Err(e) => error!("Failed to clear notifications: {e}"),
        }
        res.map_err(ServiceError::from)
    }
}
