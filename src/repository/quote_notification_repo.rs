use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::info;

use crate::model::quote_notification::QuoteNotification;
use crate::repository::repository_error::RepositoryResult;

/// Store for manufacturer-to-buyer quote alerts. Rows are only ever created
/// inside the quote creation transaction; everything here is scoped to one
/// recipient.
#[async_trait]
pub trait QuoteNotificationRepository: Send + Sync {
    async fn list_for_recipient(
        &self,
        sent_to: &str,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<QuoteNotification>, i64)>;
    async fn unread_count(&self, sent_to: &str) -> RepositoryResult<i64>;
    async fn mark_read(&self, id: i64) -> RepositoryResult<bool>;
    async fn delete_for_recipient(&self, id: i64, sent_to: &str) -> RepositoryResult<bool>;
    async fn delete_all_for_recipient(&self, sent_to: &str) -> RepositoryResult<u64>;
}

pub struct SqliteQuoteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteQuoteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteQuoteNotificationRepository { pool }
    }
}

#[async_trait]
impl QuoteNotificationRepository for SqliteQuoteNotificationRepository {
    #[tracing::instrument(skip(self), fields(sent_to = %sent_to, limit = limit, offset = offset))]
    async fn list_for_recipient(
        &self,
        sent_to: &str,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<QuoteNotification>, i64)> {
        info!("Listing quote notifications for '{}'", sent_to);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quote_notifications WHERE sent_to = ?",
        )
        .bind(sent_to)
        .fetch_one(&self.pool)
        .await?;

        let notifications = sqlx::query_as::<_, QuoteNotification>(
            "SELECT * FROM quote_notifications WHERE sent_to = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(sent_to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        info!(
            "Fetched {} of {} quote notifications",
            notifications.len(),
            total
        );
        Ok((notifications, total))
    }

    #[tracing::instrument(skip(self), fields(sent_to = %sent_to))]
    async fn unread_count(&self, sent_to: &str) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quote_notifications WHERE sent_to = ? AND is_read = 0",
        )
        .bind(sent_to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn mark_read(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE quote_notifications SET is_read = 1, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        let updated = result.rows_affected() > 0;
        if updated {
            info!("Marked quote notification {} as read", id);
        }
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(id = id, sent_to = %sent_to))]
    async fn delete_for_recipient(&self, id: i64, sent_to: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "DELETE FROM quote_notifications WHERE id = ? AND sent_to = ?",
        )
        .bind(id)
        .bind(sent_to)
        .execute(&self.pool)
        .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted quote notification {}", id);
        }
        Ok(deleted)
    }

    #[tracing::instrument(skip(self), fields(sent_to = %sent_to))]
    async fn delete_all_for_recipient(&self, sent_to: &str) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM quote_notifications WHERE sent_to = ?")
            .bind(sent_to)
            .execute(&self.pool)
            .await?;
        info!(
            "Deleted {} quote notifications for '{}'",
            result.rows_affected(),
            sent_to
        );
        Ok(result.rows_affected())
    }
}
