use async_trait::async_trait;
use std::sync::Arc;

use partbroker_backend::dto::file_dto::{FileSearchRequest, UploadRequest};
use partbroker_backend::repository::db;
use partbroker_backend::repository::file_repo::SqliteFileRepository;
use partbroker_backend::service::cascade::CascadeDeleteService;
use partbroker_backend::service::file_service::{FileService, FileServiceImpl};
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

/// Always fails to hand out URLs.
struct UnavailableObjectStore;

#[async_trait]
impl ObjectStore for UnavailableObjectStore {
    fn upload_url(&self, _object_key: &str) -> Result<String, StorageError> {
        Err(StorageError::ConnectionError("storage is down".to_string()))
    }

    fn download_url(&self, _object_key: &str) -> Result<String, StorageError> {
        Err(StorageError::ConnectionError("storage is down".to_string()))
    }

    async fn remove_object(&self, _object_key: &str) -> Result<(), StorageError> {
        Err(StorageError::ConnectionError("storage is down".to_string()))
    }
}

struct TestContext {
    pool: sqlx::SqlitePool,
    service: FileServiceImpl,
}

async fn setup_with_store(store: Arc<dyn ObjectStore>) -> TestContext {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool).await.expect("Failed to apply schema");

    let cascade = Arc::new(CascadeDeleteService::new(pool.clone(), store.clone()));
    let service = FileServiceImpl::new(
        Arc::new(SqliteFileRepository::new(pool.clone())),
        store,
        cascade,
    );
    TestContext { pool, service }
}

async fn setup() -> TestContext {
    setup_with_store(Arc::new(StubObjectStore)).await
}

fn upload_request(filename: &str) -> UploadRequest {
    UploadRequest {
        filename: filename.to_string(),
        content_type: "application/stp".to_string(),
        file_size: Some(2048),
        uploaded_by: Some("buyer@shop.example".to_string()),
        description: Some("first revision".to_string()),
        material: Some("Steel".to_string()),
        part_number: Some("PN-7".to_string()),
        quantity_unit: Some("pieces".to_string()),
    }
}

#[tokio::test]
async fn test_upload_registers_file_and_notification_atomically() {
    let ctx = setup().await;

    let response = ctx
        .service
        .request_upload(upload_request("bracket.stp"))
        .await
        .expect("Failed to register upload");

    assert!(response.upload_url.contains(&response.object_key));
    assert_eq!(response.notification.file_id, response.file_id);
    assert_eq!(response.notification.part_name, "bracket");
    assert!(!response.notification.is_read);

    let files = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count files");
    let notifications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count notifications");
    assert_eq!(files, 1);
    assert_eq!(notifications, 1);
}

#[tokio::test]
async fn test_upload_rejects_non_cad_extensions() {
    let ctx = setup().await;

    let result = ctx.service.request_upload(upload_request("render.stl")).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    let files = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count files");
    assert_eq!(files, 0);
}

#[tokio::test]
async fn test_duplicate_filename_conflicts_and_persists_nothing() {
    let ctx = setup().await;
    ctx.service
        .request_upload(upload_request("bracket.stp"))
        .await
        .expect("Failed to register upload");

    let result = ctx.service.request_upload(upload_request("bracket.stp")).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let notifications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count notifications");
    assert_eq!(notifications, 1);
}

#[tokio::test]
async fn test_unavailable_storage_fails_upload_and_persists_nothing() {
    let ctx = setup_with_store(Arc::new(UnavailableObjectStore)).await;

    let result = ctx.service.request_upload(upload_request("bracket.stp")).await;
    assert!(matches!(result, Err(ServiceError::StorageUnavailable(_))));

    let files = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count files");
    assert_eq!(files, 0);
}

#[tokio::test]
async fn test_download_returns_url_and_metadata() {
    let ctx = setup().await;
    let uploaded = ctx
        .service
        .request_upload(upload_request("bracket.stp"))
        .await
        .expect("Failed to register upload");

    let download = ctx
        .service
        .request_download(&uploaded.object_key)
        .await
        .expect("Failed to issue download link");
    assert!(download.download_url.contains(&uploaded.object_key));
    assert_eq!(download.file.original_name, "bracket.stp");

    let missing = ctx.service.request_download("stp/nope.stp").await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_by_uploader() {
    let ctx = setup().await;
    ctx.service
        .request_upload(upload_request("a.stp"))
        .await
        .expect("Failed to register upload");
    let mut other = upload_request("b.stp");
    other.uploaded_by = Some("someone-else".to_string());
    ctx.service
        .request_upload(other)
        .await
        .expect("Failed to register upload");

    let (all, total) = ctx.service.list(50, 0, None).await.expect("Failed to list");
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);

    let (mine, mine_total) = ctx
        .service
        .list(50, 0, Some("buyer@shop.example"))
        .await
        .expect("Failed to list");
    assert_eq!(mine_total, 1);
    assert_eq!(mine[0].original_name, "a.stp");
}

#[tokio::test]
async fn test_search_by_name_fragment() {
    let ctx = setup().await;
    ctx.service
        .request_upload(upload_request("gear-housing.stp"))
        .await
        .expect("Failed to register upload");
    ctx.service
        .request_upload(upload_request("bracket.stp"))
        .await
        .expect("Failed to register upload");

    let (matches, total) = ctx
        .service
        .search(FileSearchRequest {
            query: Some("housing".to_string()),
            uploaded_by: None,
            start_date: None,
            end_date: None,
            limit: 100,
            offset: 0,
        })
        .await
        .expect("Failed to search");
    assert_eq!(total, 1);
    assert_eq!(matches[0].original_name, "gear-housing.stp");
}

#[tokio::test]
async fn test_delete_by_object_key() {
    let ctx = setup().await;
    let uploaded = ctx
        .service
        .request_upload(upload_request("bracket.stp"))
        .await
        .expect("Failed to register upload");

    assert!(ctx
        .service
        .delete(&uploaded.object_key)
        .await
        .expect("Failed to delete"));
    assert!(!ctx
        .service
        .delete(&uploaded.object_key)
        .await
        .expect("Failed to delete"));

    let files = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count files");
    let notifications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count notifications");
    assert_eq!(files, 0);
    assert_eq!(notifications, 0);
}
