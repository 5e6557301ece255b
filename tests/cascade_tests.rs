use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use partbroker_backend::dto::quote_dto::CreateQuoteRequest;
use partbroker_backend::model::file::NewFile;
use partbroker_backend::repository::db;
use partbroker_backend::repository::file_repo::{FileRepository, SqliteFileRepository};
use partbroker_backend::repository::quote_notification_repo::SqliteQuoteNotificationRepository;
use partbroker_backend::repository::quote_repo::SqliteQuoteRepository;
use partbroker_backend::service::cascade::CascadeDeleteService;
use partbroker_backend::service::quote_service::{QuoteService, QuoteServiceImpl};
use partbroker_backend::util::minio::{ObjectStore, StorageError};

/// Records removals; optionally fails them to exercise the best-effort path.
struct StubObjectStore {
    fail_removals: bool,
    removed: Mutex<Vec<String>>,
}

impl StubObjectStore {
    fn new(fail_removals: bool) -> Self {
        StubObjectStore {
            fail_removals,
            removed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for StubObjectStore {
    fn upload_url(&self, object_key: &str) -> Result<String, StorageError> {
        Ok(format!("http://storage.test/upload/{object_key}"))
    }

    fn download_url(&self, object_key: &str) -> Result<String, StorageError> {
        Ok(format!("http://storage.test/{object_key}"))
    }

    async fn remove_object(&self, object_key: &str) -> Result<(), StorageError> {
        if self.fail_removals {
            return Err(StorageError::OperationError(
                "storage temporarily unavailable".to_string(),
            ));
        }
        self.removed.lock().unwrap().push(object_key.to_string());
        Ok(())
    }
}

struct TestContext {
    pool: sqlx::SqlitePool,
    file_repo: SqliteFileRepository,
    quote_service: QuoteServiceImpl,
    cascade: Arc<CascadeDeleteService>,
    store: Arc<StubObjectStore>,
}

async fn setup(fail_removals: bool) -> TestContext {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool).await.expect("Failed to apply schema");

    let store = Arc::new(StubObjectStore::new(fail_removals));
    let cascade = Arc::new(CascadeDeleteService::new(
        pool.clone(),
        store.clone() as Arc<dyn ObjectStore>,
    ));
    let quote_service = QuoteServiceImpl::new(
        Arc::new(SqliteQuoteRepository::new(pool.clone())),
        Arc::new(SqliteQuoteNotificationRepository::new(pool.clone())),
        cascade.clone(),
    );
    TestContext {
        pool: pool.clone(),
        file_repo: SqliteFileRepository::new(pool),
        quote_service,
        cascade,
        store,
    }
}

async fn create_file(ctx: &TestContext, name: &str) -> (i64, i64, String) {
    let object_key = format!("stp/test_{name}");
    let (file, notification) = ctx
        .file_repo
        .create_with_notification(
            NewFile {
                object_key: object_key.clone(),
                original_name: name.to_string(),
                content_type: "application/stp".to_string(),
                file_size: None,
                uploaded_by: Some("buyer@shop.example".to_string()),
                description: None,
                material: None,
                part_number: None,
                quantity_unit: None,
            },
            "part",
        )
        .await
        .expect("Failed to create file");
    (file.id, notification.id, object_key)
}

async fn create_quote(ctx: &TestContext, notification_id: i64, file_id: i64) -> i64 {
    ctx.quote_service
        .create_quote(
            CreateQuoteRequest {
                notification_id,
                file_id,
                part_name: "part".to_string(),
                part_number: None,
                material: None,
                quantity_unit: None,
                material_cost: 100.0,
                labor_cost: 50.0,
                machine_time_cost: 25.0,
                profit_margin_percent: 10.0,
                notes: None,
            },
            "acme-machining",
        )
        .await
        .expect("Failed to create quote")
        .id
}

async fn count(pool: &sqlx::SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
async fn test_delete_file_removes_every_dependent_record() {
    let ctx = setup(false).await;
    let (file_id, notification_id, object_key) = create_file(&ctx, "bracket.stp").await;
    // A second file that must survive untouched.
    let (other_file_id, other_notification_id, _) = create_file(&ctx, "housing.stp").await;
    let surviving_quote = create_quote(&ctx, other_notification_id, other_file_id).await;

    // N = 3 quotes on the doomed file, each with one quote notification.
    for _ in 0..3 {
        create_quote(&ctx, notification_id, file_id).await;
    }

    assert_eq!(count(&ctx.pool, "files").await, 2);
    assert_eq!(count(&ctx.pool, "notifications").await, 2);
    assert_eq!(count(&ctx.pool, "quotes").await, 4);
    assert_eq!(count(&ctx.pool, "quote_notifications").await, 4);

    let deleted = ctx
        .cascade
        .delete_file(file_id)
        .await
        .expect("Cascade delete failed");
    assert!(deleted);

    // Exactly the doomed file's records are gone.
    assert_eq!(count(&ctx.pool, "files").await, 1);
    assert_eq!(count(&ctx.pool, "notifications").await, 1);
    assert_eq!(count(&ctx.pool, "quotes").await, 1);
    assert_eq!(count(&ctx.pool, "quote_notifications").await, 1);

    let remaining_quote = sqlx::query_scalar::<_, i64>("SELECT id FROM quotes")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to fetch remaining quote");
    assert_eq!(remaining_quote, surviving_quote);

    // The stored object was removed too.
    assert_eq!(ctx.store.removed.lock().unwrap().as_slice(), &[object_key]);
}

#[tokio::test]
async fn test_delete_file_without_quotes_removes_file_and_notification_only() {
    let ctx = setup(false).await;
    let (file_id, _, _) = create_file(&ctx, "bracket.stp").await;

    let deleted = ctx
        .cascade
        .delete_file(file_id)
        .await
        .expect("Cascade delete failed");
    assert!(deleted);

    assert_eq!(count(&ctx.pool, "files").await, 0);
    assert_eq!(count(&ctx.pool, "notifications").await, 0);
}

#[tokio::test]
async fn test_delete_missing_file_is_a_clean_no_op() {
    let ctx = setup(false).await;
    let deleted = ctx
        .cascade
        .delete_file(12345)
        .await
        .expect("Cascade delete failed");
    assert!(!deleted);
    assert!(ctx.store.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_failure_does_not_keep_the_rows() {
    let ctx = setup(true).await;
    let (file_id, notification_id, _) = create_file(&ctx, "bracket.stp").await;
    create_quote(&ctx, notification_id, file_id).await;

    let deleted = ctx
        .cascade
        .delete_file(file_id)
        .await
        .expect("Cascade delete failed");
    assert!(deleted);

    // The object removal failed, but the metadata deletion still committed.
    assert_eq!(count(&ctx.pool, "files").await, 0);
    assert_eq!(count(&ctx.pool, "notifications").await, 0);
    assert_eq!(count(&ctx.pool, "quotes").await, 0);
    assert_eq!(count(&ctx.pool, "quote_notifications").await, 0);
}

#[tokio::test]
async fn test_delete_quote_leaves_file_and_upload_notification() {
    let ctx = setup(false).await;
    let (file_id, notification_id, _) = create_file(&ctx, "bracket.stp").await;
    let quote_id = create_quote(&ctx, notification_id, file_id).await;
    let other_quote = create_quote(&ctx, notification_id, file_id).await;

    let deleted = ctx
        .cascade
        .delete_quote(quote_id)
        .await
        .expect("Cascade delete failed");
    assert!(deleted);

    assert_eq!(count(&ctx.pool, "files").await, 1);
    assert_eq!(count(&ctx.pool, "notifications").await, 1);
    assert_eq!(count(&ctx.pool, "quotes").await, 1);
    assert_eq!(count(&ctx.pool, "quote_notifications").await, 1);

    let remaining = sqlx::query_scalar::<_, i64>("SELECT quote_id FROM quote_notifications")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to fetch remaining notification");
    assert_eq!(remaining, other_quote);

    // The stored object is not touched on the quote path.
    assert!(ctx.store.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_quote_is_a_clean_no_op() {
    let ctx = setup(false).await;
    let deleted = ctx
        .cascade
        .delete_quote(777)
        .await
        .expect("Cascade delete failed");
    assert!(!deleted);
}
