use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::{error, info};

use crate::model::file::File;
use crate::model::notification::Notification;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Page of notifications plus the filtered total and the table-wide
    /// unread count. `unread_count` ignores both `unread_only` and paging.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> RepositoryResult<(i64, i64, Vec<Notification>)>;
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Notification>;
    /// Notification together with its file, when the file still exists.
    async fn get_with_file(&self, id: i64) -> RepositoryResult<(Notification, Option<File>)>;
    async fn mark_read(&self, id: i64) -> RepositoryResult<bool>;
    async fn mark_all_read(&self) -> RepositoryResult<u64>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn delete_all(&self) -> RepositoryResult<u64>;
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteNotificationRepository { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    #[tracing::instrument(skip(self), fields(limit = limit, offset = offset, unread_only = unread_only))]
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> RepositoryResult<(i64, i64, Vec<Notification>)> {
        info!("Listing upload notifications");

        let total = if unread_only {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE is_read = 0")
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications")
                .fetch_one(&self.pool)
                .await?
        };

        let unread_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE is_read = 0")
                .fetch_one(&self.pool)
                .await?;

        let notifications = if unread_only {
            sqlx::query_as::<_, Notification>(
                "SELECT * FROM notifications WHERE is_read = 0 \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Notification>(
                "SELECT * FROM notifications ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        info!(
            "Fetched {} notifications (total {}, unread {})",
            notifications.len(),
            total,
            unread_count
        );
        Ok((total, unread_count, notifications))
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Notification> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match notification {
            Some(notification) => Ok(notification),
            None => {
                error!("Notification not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Notification not found for ID: {}",
                    id
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn get_with_file(&self, id: i64) -> RepositoryResult<(Notification, Option<File>)> {
        let notification = self.get_by_id(id).await?;
        let file = sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(notification.file_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok((notification, file))
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn mark_read(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        let updated = result.rows_affected() > 0;
        if updated {
            info!("Marked notification {} as read", id);
        }
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_all_read(&self) -> RepositoryResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE is_read = 0",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        info!("Marked {} notifications as read", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted notification {}", id);
        }
        Ok(deleted)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all(&self) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM notifications")
            .execute(&self.pool)
            .await?;
        info!("Deleted {} notifications", result.rows_affected());
        Ok(result.rows_affected())
    }
}
