use async_trait::async_trait;
use std::sync::Arc;

use partbroker_backend::dto::quote_dto::{CreateQuoteRequest, UpdateQuoteStatusRequest};
use partbroker_backend::model::file::NewFile;
use partbroker_backend::model::quote::QuoteStatus;
use partbroker_backend::repository::db;
use partbroker_backend::repository::file_repo::{FileRepository, SqliteFileRepository};
use partbroker_backend::repository::quote_notification_repo::{
    QuoteNotificationRepository, SqliteQuoteNotificationRepository,
};
use partbroker_backend::repository::quote_repo::SqliteQuoteRepository;
use partbroker_backend::service::cascade::CascadeDeleteService;
use partbroker_backend::service::quote_service::{QuoteService, QuoteServiceImpl};
use partbroker_backend::util::error::ServiceError;
use partbroker_backend::util::minio::{ObjectStore, StorageError};

struct StubObjectStore;

#[async_trait]
impl ObjectStore for StubObjectStore {
    fn upload_url(&self, object_key: &str) -> Result<String, StorageError> {
        Ok(format!("http://storage.test/upload/{object_key}"))
    }

    fn download_url(&self, object_key: &str) -> Result<String, StorageError> {
        Ok(format!("http://storage.test/{object_key}"))
    }

    async fn remove_object(&self, _object_key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

struct TestContext {
    pool: sqlx::SqlitePool,
    file_repo: SqliteFileRepository,
    quote_notification_repo: Arc<SqliteQuoteNotificationRepository>,
    service: QuoteServiceImpl,
}

async fn setup() -> TestContext {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool).await.expect("Failed to apply schema");

    let object_store: Arc<dyn ObjectStore> = Arc::new(StubObjectStore);
    let cascade = Arc::new(CascadeDeleteService::new(pool.clone(), object_store));
    let quote_notification_repo = Arc::new(SqliteQuoteNotificationRepository::new(pool.clone()));
    let service = QuoteServiceImpl::new(
        Arc::new(SqliteQuoteRepository::new(pool.clone())),
        quote_notification_repo.clone(),
        cascade,
    );
    TestContext {
        pool: pool.clone(),
        file_repo: SqliteFileRepository::new(pool),
        quote_notification_repo,
        service,
    }
}

async fn create_file(ctx: &TestContext, name: &str, uploaded_by: &str) -> (i64, i64) {
    let (file, notification) = ctx
        .file_repo
        .create_with_notification(
            NewFile {
                object_key: format!("stp/test_{name}"),
                original_name: name.to_string(),
                content_type: "application/stp".to_string(),
                file_size: Some(1024),
                uploaded_by: Some(uploaded_by.to_string()),
                description: None,
                material: Some("Steel".to_string()),
                part_number: Some("PN-100".to_string()),
                quantity_unit: Some("pieces".to_string()),
            },
            "bracket",
        )
        .await
        .expect("Failed to create file");
    (file.id, notification.id)
}

fn quote_request(notification_id: i64, file_id: i64) -> CreateQuoteRequest {
    CreateQuoteRequest {
        notification_id,
        file_id,
        part_name: "bracket".to_string(),
        part_number: Some("PN-100".to_string()),
        material: Some("Steel".to_string()),
        quantity_unit: Some("pieces".to_string()),
        material_cost: 1000.0,
        labor_cost: 200.0,
        machine_time_cost: 300.0,
        profit_margin_percent: 20.0,
        notes: Some("net 30".to_string()),
    }
}

#[tokio::test]
async fn test_create_quote_computes_pricing_and_notifies_buyer() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;

    let quote = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    assert_eq!(quote.subtotal, 1500.0);
    assert_eq!(quote.profit_amount, 300.0);
    assert_eq!(quote.total_price, 1800.0);
    assert_eq!(quote.status, QuoteStatus::Sent);
    assert_eq!(quote.created_by, "acme-machining");
    assert!(quote.accepted_at.is_none());
    assert!(quote.rejected_at.is_none());

    // Exactly one notification, addressed to the file's uploader.
    let (notifications, total) = ctx
        .quote_notification_repo
        .list_for_recipient("buyer@shop.example", 50, 0)
        .await
        .expect("Failed to list quote notifications");
    assert_eq!(total, 1);
    assert_eq!(notifications[0].quote_id, quote.id);
    assert_eq!(notifications[0].sent_by, "acme-machining");
    assert!(!notifications[0].is_read);
}

#[tokio::test]
async fn test_create_quote_for_missing_file_fails_and_persists_nothing() {
    let ctx = setup().await;

    let result = ctx
        .service
        .create_quote(quote_request(1, 999), "acme-machining")
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let quotes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count quotes");
    assert_eq!(quotes, 0);
    let notifications =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quote_notifications")
            .fetch_one(&ctx.pool)
            .await
            .expect("Failed to count quote notifications");
    assert_eq!(notifications, 0);
}

#[tokio::test]
async fn test_sent_quote_can_be_accepted() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;
    let quote = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    let accepted = ctx
        .service
        .update_status(
            quote.id,
            UpdateQuoteStatusRequest {
                status: "accepted".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .expect("Failed to accept quote");
    assert_eq!(accepted.status, QuoteStatus::Accepted);
    assert!(accepted.accepted_at.is_some());
    assert!(accepted.rejected_at.is_none());
}

#[tokio::test]
async fn test_sent_quote_can_be_rejected_with_reason() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;
    let quote = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    let rejected = ctx
        .service
        .update_status(
            quote.id,
            UpdateQuoteStatusRequest {
                status: "rejected".to_string(),
                rejection_reason: Some("Too expensive".to_string()),
            },
        )
        .await
        .expect("Failed to reject quote");
    assert_eq!(rejected.status, QuoteStatus::Rejected);
    assert!(rejected.rejected_at.is_some());
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Too expensive"));
}

#[tokio::test]
async fn test_invalid_transitions_fail() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;
    let quote = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    // Unrecognized status strings are rejected outright.
    for status in ["shipped", "SENT", "Accepted", ""] {
        let result = ctx
            .service
            .update_status(
                quote.id,
                UpdateQuoteStatusRequest {
                    status: status.to_string(),
                    rejection_reason: None,
                },
            )
            .await;
        assert!(
            matches!(result, Err(ServiceError::InvalidInput(_))),
            "status '{status}' should be rejected"
        );
    }

    // Recognized but non-terminal targets are rejected too.
    for status in ["pending", "sent"] {
        let result = ctx
            .service
            .update_status(
                quote.id,
                UpdateQuoteStatusRequest {
                    status: status.to_string(),
                    rejection_reason: None,
                },
            )
            .await;
        assert!(
            matches!(result, Err(ServiceError::InvalidInput(_))),
            "status '{status}' should be rejected"
        );
    }
}

#[tokio::test]
async fn test_terminal_quotes_admit_no_further_transitions() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;
    let quote = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    ctx.service
        .update_status(
            quote.id,
            UpdateQuoteStatusRequest {
                status: "accepted".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .expect("Failed to accept quote");

    let result = ctx
        .service
        .update_status(
            quote.id,
            UpdateQuoteStatusRequest {
                status: "rejected".to_string(),
                rejection_reason: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_transition_on_missing_quote_fails_with_not_found() {
    let ctx = setup().await;
    let result = ctx
        .service
        .update_status(
            4242,
            UpdateQuoteStatusRequest {
                status: "accepted".to_string(),
                rejection_reason: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_quote_stats_scoped_to_creator() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;

    for _ in 0..3 {
        ctx.service
            .create_quote(quote_request(notification_id, file_id), "acme-machining")
            .await
            .expect("Failed to create quote");
    }
    let other = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "other-shop")
        .await
        .expect("Failed to create quote");
    ctx.service
        .update_status(
            other.id,
            UpdateQuoteStatusRequest {
                status: "accepted".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .expect("Failed to accept quote");

    let stats = ctx
        .service
        .quote_stats("acme-machining")
        .await
        .expect("Failed to fetch stats");
    assert_eq!(stats.total_quotes, 3);
    assert_eq!(stats.sent_quotes, 3);
    assert_eq!(stats.accepted_quotes, 0);
    assert_eq!(stats.pending_quotes, 0);
    assert_eq!(stats.rejected_quotes, 0);

    let other_stats = ctx
        .service
        .quote_stats("other-shop")
        .await
        .expect("Failed to fetch stats");
    assert_eq!(other_stats.total_quotes, 1);
    assert_eq!(other_stats.accepted_quotes, 1);
}

#[tokio::test]
async fn test_list_quotes_filters_by_status_and_creator() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;

    let first = ctx
        .service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");
    ctx.service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");
    ctx.service
        .update_status(
            first.id,
            UpdateQuoteStatusRequest {
                status: "rejected".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .expect("Failed to reject quote");

    let (sent, sent_total) = ctx
        .service
        .list_quotes(Some(QuoteStatus::Sent), Some("acme-machining"), 50, 0)
        .await
        .expect("Failed to list quotes");
    assert_eq!(sent_total, 1);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, QuoteStatus::Sent);

    let (all, all_total) = ctx
        .service
        .list_quotes(None, Some("acme-machining"), 50, 0)
        .await
        .expect("Failed to list quotes");
    assert_eq!(all_total, 2);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_buyer_notification_read_tracking() {
    let ctx = setup().await;
    let (file_id, notification_id) = create_file(&ctx, "bracket.stp", "buyer@shop.example").await;
    ctx.service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");
    ctx.service
        .create_quote(quote_request(notification_id, file_id), "acme-machining")
        .await
        .expect("Failed to create quote");

    assert_eq!(
        ctx.service
            .unread_notification_count("buyer@shop.example")
            .await
            .expect("Failed to count unread"),
        2
    );

    let (notifications, _) = ctx
        .service
        .buyer_notifications("buyer@shop.example", 50, 0)
        .await
        .expect("Failed to list notifications");
    assert!(ctx
        .service
        .mark_notification_read(notifications[0].id)
        .await
        .expect("Failed to mark read"));

    assert_eq!(
        ctx.service
            .unread_notification_count("buyer@shop.example")
            .await
            .expect("Failed to count unread"),
        1
    );

    // Recipient scoping: another buyer sees nothing.
    assert_eq!(
        ctx.service
            .unread_notification_count("someone-else")
            .await
            .expect("Failed to count unread"),
        0
    );
}
