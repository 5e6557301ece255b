use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::quote_dto::{CreateQuoteRequest, UpdateQuoteStatusRequest};
use crate::model::quote::{NewQuote, Quote, QuoteStatus, QuoteStatusCounts};
use crate::model::quote_notification::QuoteNotification;
use crate::repository::quote_notification_repo::{
    QuoteNotificationRepository, SqliteQuoteNotificationRepository,
};
use crate::repository::quote_repo::{QuoteRepository, SqliteQuoteRepository};
use crate::service::cascade::CascadeDeleteService;
use crate::service::pricing_service::compute_quote_pricing;
use crate::util::error::{ServiceError, ServiceResult};

/// Drives quotes through their lifecycle: creation (priced, persisted, and
/// announced to the buyer in one transaction), the status state machine,
/// retrieval, and deletion through the cascade coordinator.
#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        created_by: &str,
    ) -> ServiceResult<Quote>;
    async fn get_quote(&self, id: i64) -> ServiceResult<Quote>;
    async fn list_quotes(
        &self,
        status: Option<QuoteStatus>,
        created_by: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Quote>, i64)>;
    async fn quotes_by_notification(&self, notification_id: i64) -> ServiceResult<Vec<Quote>>;
    async fn quotes_by_file(&self, file_id: i64) -> ServiceResult<Vec<Quote>>;
    async fn quote_stats(&self, created_by: &str) -> ServiceResult<QuoteStatusCounts>;
    /// Accept or reject a sent quote. Every other requested transition
    /// fails with an invalid-input error.
    async fn update_status(
        &self,
        id: i64,
        request: UpdateQuoteStatusRequest,
    ) -> ServiceResult<Quote>;
    /// Remove the quote and its buyer notifications. Ownership is the
    /// caller's concern; deletion itself runs through the cascade
    /// coordinator.
    async fn delete_quote(&self, id: i64) -> ServiceResult<bool>;

    // Buyer-facing quote notifications
    async fn buyer_notifications(
        &self,
        sent_to: &str,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<QuoteNotification>, i64)>;
    async fn unread_notification_count(&self, sent_to: &str) -> ServiceResult<i64>;
    async fn mark_notification_read(&self, id: i64) -> ServiceResult<bool>;
    async fn delete_notification(&self, id: i64, sent_to: &str) -> ServiceResult<bool>;
    async fn clear_notifications(&self, sent_to: &str) -> ServiceResult<u64>;
}

pub struct QuoteServiceImpl {
    pub quote_repo: Arc<SqliteQuoteRepository>,
    pub quote_notification_repo: Arc<SqliteQuoteNotificationRepository>,
    pub cascade: Arc<CascadeDeleteService>,
}

impl QuoteServiceImpl {
    pub fn new(
        quote_repo: Arc<SqliteQuoteRepository>,
        quote_notification_repo: Arc<SqliteQuoteNotificationRepository>,
        cascade: Arc<CascadeDeleteService>,
    ) -> Self {
        QuoteServiceImpl {
            quote_repo,
            quote_notification_repo,
            cascade,
        }
    }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, request), fields(file_id = request.file_id, created_by = %created_by))]
    async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        created_by: &str,
    ) -> ServiceResult<Quote> {
        info!("Creating quote");

        let pricing = compute_quote_pricing(
            request.material_cost,
            request.labor_cost,
            request.machine_time_cost,
            request.profit_margin_percent,
        );

        let new_quote = NewQuote {
            notification_id: request.notification_id,
            file_id: request.file_id,
            part_name: request.part_name,
            part_number: request.part_number,
            material: request.material,
            quantity_unit: request.quantity_unit,
            material_cost: request.material_cost,
            labor_cost: request.labor_cost,
            machine_time_cost: request.machine_time_cost,
            subtotal: pricing.subtotal,
            profit_margin_percent: request.profit_margin_percent,
            profit_amount: pricing.profit_amount,
            total_price: pricing.total_price,
            notes: request.notes,
            created_by: created_by.to_string(),
        };

        let res = self.quote_repo.create_with_notification(new_quote).await;
        match res {
            Ok((quote, notification)) => {
                info!(
                    quote_id = quote.id,
                    sent_to = %notification.sent_to,
                    "Quote created and sent"
                );
                Ok(quote)
            }
            Err(e) => {
                error!("Failed to create quote: {e}");
                Err(ServiceError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(id = id))]
    async fn get_quote(&self, id: i64) -> ServiceResult<Quote> {
        self.quote_repo
            .get_by_id(id)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list_quotes(
        &self,
        status: Option<QuoteStatus>,
        created_by: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Quote>, i64)> {
        let res = self.quote_repo.list(status, created_by, limit, offset).await;
        match &res {
            Ok((quotes, total)) => info!("Fetched {} of {} quotes", quotes.len(), total),
            Err(e) => error!("Failed to list quotes: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(notification_id = notification_id))]
    async fn quotes_by_notification(&self, notification_id: i64) -> ServiceResult<Vec<Quote>> {
        self.quote_repo
            .list_by_notification(notification_id)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(file_id = file_id))]
    async fn quotes_by_file(&self, file_id: i64) -> ServiceResult<Vec<Quote>> {
        self.quote_repo
            .list_by_file(file_id)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(created_by = %created_by))]
    async fn quote_stats(&self, created_by: &str) -> ServiceResult<QuoteStatusCounts> {
        self.quote_repo
            .count_by_status(created_by)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self, request), fields(id = id, status = %request.status))]
    async fn update_status(
        &self,
        id: i64,
        request: UpdateQuoteStatusRequest,
    ) -> ServiceResult<Quote> {
        info!("Updating quote status");

        let target = match QuoteStatus::parse(&request.status) {
            Some(status) => status,
            None => {
                error!("Unrecognized quote status '{}'", request.status);
                return Err(ServiceError::InvalidInput(format!(
                    "Invalid status '{}'. Must be 'accepted' or 'rejected'",
                    request.status
                )));
            }
        };
        if !target.is_terminal() {
            error!("Requested transition to non-terminal status '{}'", target);
            return Err(ServiceError::InvalidInput(format!(
                "Invalid status '{}'. Must be 'accepted' or 'rejected'",
                target
            )));
        }

        let res = self
            .quote_repo
            .transition_from_sent(id, target, request.rejection_reason.as_deref())
            .await;
        match &res {
            Ok(quote) => info!(status = %quote.status, "Quote status updated"),
            Err(e) => error!("Failed to update quote status: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn delete_quote(&self, id: i64) -> ServiceResult<bool> {
        info!("Deleting quote");
        let res = self.cascade.delete_quote(id).await;
        match &res {
            Ok(true) => info!("Quote deleted"),
            Ok(false) => info!("Quote not found, nothing deleted"),
            Err(e) => error!("Failed to delete quote: {e}"),
        }
        res
    }

    #[instrument(skip(self), fields(sent_to = %sent_to, limit = limit, offset = offset))]
    async fn buyer_notifications(
        &self,
        sent_to: &str,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<QuoteNotification>, i64)> {
        self.quote_notification_repo
            .list_for_recipient(sent_to, limit, offset)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(sent_to = %sent_to))]
    async fn unread_notification_count(&self, sent_to: &str) -> ServiceResult<i64> {
        self.quote_notification_repo
            .unread_count(sent_to)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = id))]
    async fn mark_notification_read(&self, id: i64) -> ServiceResult<bool> {
        let res = self.quote_notification_repo.mark_read(id).await;
        match &res {
            Ok(true) => info!("Quote notification marked as read"),
            Ok(false) => info!("Quote notification not found"),
            Err(e) => error!("Failed to mark quote notification as read: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = id, sent_to = %sent_to))]
    async fn delete_notification(&self, id: i64, sent_to: &str) -> ServiceResult<bool> {
        self.quote_notification_repo
            .delete_for_recipient(id, sent_to)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(sent_to = %sent_to))]
    async fn clear_notifications(&self, sent_to: &str) -> ServiceResult<u64> {
        self.quote_notification_repo
            .delete_all_for_recipient(sent_to)
            .await
            .map_err(ServiceError::from)
    }
}
