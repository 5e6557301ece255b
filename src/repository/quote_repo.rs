use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::{error, info};

use crate::model::quote::{NewQuote, Quote, QuoteStatus, QuoteStatusCounts};
use crate::model::quote_notification::QuoteNotification;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Insert the quote and its buyer notification in one transaction.
    ///
    /// The referenced file must exist: its uploader becomes the
    /// notification recipient, and a missing file fails the whole creation.
    async fn create_with_notification(
        &self,
        quote: NewQuote,
    ) -> RepositoryResult<(Quote, QuoteNotification)>;
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Quote>;
    async fn list(
        &self,
        status: Option<QuoteStatus>,
        created_by: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Quote>, i64)>;
    async fn list_by_notification(&self, notification_id: i64) -> RepositoryResult<Vec<Quote>>;
    async fn list_by_file(&self, file_id: i64) -> RepositoryResult<Vec<Quote>>;
    async fn count_by_status(&self, created_by: &str) -> RepositoryResult<QuoteStatusCounts>;
    /// Apply a `sent -> accepted` or `sent -> rejected` transition.
    ///
    /// The update is conditional on the row still being in `sent`, so a
    /// quote that is already terminal fails with a validation error even
    /// under concurrent requests.
    async fn transition_from_sent(
        &self,
        id: i64,
        to: QuoteStatus,
        rejection_reason: Option<&str>,
    ) -> RepositoryResult<Quote>;
}

pub struct SqliteQuoteRepository {
    pool: SqlitePool,
}

impl SqliteQuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteQuoteRepository { pool }
    }
}

#[async_trait]
impl QuoteRepository for SqliteQuoteRepository {
    #[tracing::instrument(skip(self, quote), fields(file_id = quote.file_id, created_by = %quote.created_by))]
    async fn create_with_notification(
        &self,
        quote: NewQuote,
    ) -> RepositoryResult<(Quote, QuoteNotification)> {
        info!("Creating quote for file {}", quote.file_id);

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO quotes (notification_id, file_id, part_name, part_number, material, \
             quantity_unit, material_cost, labor_cost, machine_time_cost, subtotal, \
             profit_margin_percent, profit_amount, total_price, status, notes, created_by, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quote.notification_id)
        .bind(quote.file_id)
        .bind(&quote.part_name)
        .bind(&quote.part_number)
        .bind(&quote.material)
        .bind(&quote.quantity_unit)
        .bind(quote.material_cost)
        .bind(quote.labor_cost)
        .bind(quote.machine_time_cost)
        .bind(quote.subtotal)
        .bind(quote.profit_margin_percent)
        .bind(quote.profit_amount)
        .bind(quote.total_price)
        .bind(QuoteStatus::Sent)
        .bind(&quote.notes)
        .bind(&quote.created_by)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let quote_id = result.last_insert_rowid();

        // The buyer to notify is the file's uploader.
        let uploader = sqlx::query_scalar::<_, Option<String>>(
            "SELECT uploaded_by FROM files WHERE id = ?",
        )
        .bind(quote.file_id)
        .fetch_optional(&mut *tx)
        .await?;
        let sent_to = match uploader {
            Some(uploader) => uploader.unwrap_or_default(),
            None => {
                error!(
                    "File {} not found while creating quote, aborting",
                    quote.file_id
                );
                return Err(RepositoryError::not_found(format!(
                    "File not found for ID: {}",
                    quote.file_id
                )));
            }
        };

        let notification_result = sqlx::query(
            "INSERT INTO quote_notifications (quote_id, file_id, sent_by, sent_to, part_name, \
             is_read, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(quote_id)
        .bind(quote.file_id)
        .bind(&quote.created_by)
        .bind(&sent_to)
        .bind(&quote.part_name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let notification_id = notification_result.last_insert_rowid();

        tx.commit().await?;

        info!(
            quote_id = quote_id,
            quote_notification_id = notification_id,
            sent_to = %sent_to,
            "Quote created and buyer notified"
        );

        let created = Quote {
            id: quote_id,
            notification_id: quote.notification_id,
            file_id: quote.file_id,
            part_name: quote.part_name.clone(),
            part_number: quote.part_number,
            material: quote.material,
            quantity_unit: quote.quantity_unit,
            material_cost: quote.material_cost,
            labor_cost: quote.labor_cost,
            machine_time_cost: quote.machine_time_cost,
            subtotal: quote.subtotal,
            profit_margin_percent: quote.profit_margin_percent,
            profit_amount: quote.profit_amount,
            total_price: quote.total_price,
            status: QuoteStatus::Sent,
            notes: quote.notes,
            created_by: quote.created_by.clone(),
            created_at: now,
            updated_at: now,
            accepted_at: None,
            rejected_at: None,
            rejection_reason: None,
        };
        let quote_notification = QuoteNotification {
            id: notification_id,
            quote_id,
            file_id: quote.file_id,
            sent_by: quote.created_by,
            sent_to,
            part_name: quote.part_name,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        Ok((created, quote_notification))
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Quote> {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match quote {
            Some(quote) => Ok(quote),
            None => {
                error!("Quote not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Quote not found for ID: {}",
                    id
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list(
        &self,
        status: Option<QuoteStatus>,
        created_by: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Quote>, i64)> {
        info!("Listing quotes");

        let mut count_builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("SELECT COUNT(*) FROM quotes WHERE 1=1");
        if let Some(status) = status {
            count_builder.push(" AND status = ");
            count_builder.push_bind(status);
        }
        if let Some(creator) = created_by {
            count_builder.push(" AND created_by = ");
            count_builder.push_bind(creator);
        }
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select_builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("SELECT * FROM quotes WHERE 1=1");
        if let Some(status) = status {
            select_builder.push(" AND status = ");
            select_builder.push_bind(status);
        }
        if let Some(creator) = created_by {
            select_builder.push(" AND created_by = ");
            select_builder.push_bind(creator);
        }
        select_builder.push(" ORDER BY created_at DESC LIMIT ");
        select_builder.push_bind(limit);
        select_builder.push(" OFFSET ");
        select_builder.push_bind(offset);

        let quotes = select_builder
            .build_query_as::<Quote>()
            .fetch_all(&self.pool)
            .await?;

        info!("Fetched {} of {} quotes", quotes.len(), total);
        Ok((quotes, total))
    }

    #[tracing::instrument(skip(self), fields(notification_id = notification_id))]
    async fn list_by_notification(&self, notification_id: i64) -> RepositoryResult<Vec<Quote>> {
        let quotes =
            sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE notification_id = ?")
                .bind(notification_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(quotes)
    }

    #[tracing::instrument(skip(self), fields(file_id = file_id))]
    async fn list_by_file(&self, file_id: i64) -> RepositoryResult<Vec<Quote>> {
        let quotes = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE file_id = ?")
            .bind(file_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(quotes)
    }

    #[tracing::instrument(skip(self), fields(created_by = %created_by))]
    async fn count_by_status(&self, created_by: &str) -> RepositoryResult<QuoteStatusCounts> {
        let count_for = |status: Option<QuoteStatus>| {
            let pool = self.pool.clone();
            let created_by = created_by.to_string();
            async move {
                match status {
                    Some(status) => {
                        sqlx::query_scalar::<_, i64>(
                            "SELECT COUNT(*) FROM quotes WHERE created_by = ? AND status = ?",
                        )
                        .bind(created_by)
                        .bind(status)
                        .fetch_one(&pool)
                        .await
                    }
                    None => {
                        sqlx::query_scalar::<_, i64>(
                            "SELECT COUNT(*) FROM quotes WHERE created_by = ?",
                        )
                        .bind(created_by)
                        .fetch_one(&pool)
                        .await
                    }
                }
            }
        };

        let counts = QuoteStatusCounts {
            total_quotes: count_for(None).await?,
            pending_quotes: count_for(Some(QuoteStatus::Pending)).await?,
            sent_quotes: count_for(Some(QuoteStatus::Sent)).await?,
            accepted_quotes: count_for(Some(QuoteStatus::Accepted)).await?,
            rejected_quotes: count_for(Some(QuoteStatus::Rejected)).await?,
        };
        Ok(counts)
    }

    #[tracing::instrument(skip(self), fields(id = id, to = %to))]
    async fn transition_from_sent(
        &self,
        id: i64,
        to: QuoteStatus,
        rejection_reason: Option<&str>,
    ) -> RepositoryResult<Quote> {
        info!(quote_id = id, to = %to, "Updating quote status");

        let now = Utc::now();
        let result = match to {
            QuoteStatus::Accepted => {
                sqlx::query(
                    "UPDATE quotes SET status = ?, accepted_at = ?, updated_at = ? \
                     WHERE id = ? AND status = 'sent'",
                )
                .bind(QuoteStatus::Accepted)
                .bind(now)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            QuoteStatus::Rejected => {
                sqlx::query(
                    "UPDATE quotes SET status = ?, rejected_at = ?, rejection_reason = ?, \
                     updated_at = ? WHERE id = ? AND status = 'sent'",
                )
                .bind(QuoteStatus::Rejected)
                .bind(now)
                .bind(rejection_reason)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            other => {
                error!("Requested transition to non-terminal status '{}'", other);
                return Err(RepositoryError::validation(format!(
                    "Cannot transition a quote to '{}'",
                    other
                )));
            }
        };

        if result.rows_affected() == 0 {
            // Distinguish a missing quote from an illegal transition.
            let current = self.get_by_id(id).await?;
            error!(
                "Quote {} is '{}', cannot transition to '{}'",
                id, current.status, to
            );
            return Err(RepositoryError::validation(format!(
                "Quote {} is '{}' and cannot transition to '{}'",
                id, current.status, to
            )));
        }

        info!("Quote status updated successfully for ID: {}", id);
        self.get_by_id(id).await
    }
}
