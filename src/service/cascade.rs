use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::model::file::File;
use crate::util::error::ServiceResult;
use crate::util::minio::ObjectStore;

/// Dependent-row deletion steps for `delete_file`, in dependency order:
/// quote notifications reference quotes, quotes and notifications reference
/// the file. Each statement binds the file id.
const FILE_CASCADE_STEPS: &[(&str, &str)] = &[
    (
        "quote_notifications",
        "DELETE FROM quote_notifications WHERE quote_id IN \
         (SELECT id FROM quotes WHERE file_id = ?)",
    ),
    ("quotes", "DELETE FROM quotes WHERE file_id = ?"),
    ("notifications", "DELETE FROM notifications WHERE file_id = ?"),
];

/// Enforces referential integrity on delete. The store has no foreign-key
/// cascade; every dependent row is removed here, inside one transaction.
pub struct CascadeDeleteService {
    pool: SqlitePool,
    object_store: Arc<dyn ObjectStore>,
}

impl CascadeDeleteService {
    pub fn new(pool: SqlitePool, object_store: Arc<dyn ObjectStore>) -> Self {
        CascadeDeleteService { pool, object_store }
    }

    /// Delete a file and everything that references it: the quote
    /// notifications of its quotes, the quotes, the upload notifications,
    /// and finally the file row. Removing the stored object is best-effort
    /// and never aborts the transaction. Returns false when the file does
    /// not exist.
    #[instrument(skip(self), fields(file_id = file_id))]
    pub async fn delete_file(&self, file_id: i64) -> ServiceResult<bool> {
        info!("Cascade-deleting file {}", file_id);

        let mut tx = self.pool.begin().await?;

        let file = sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(file_id)
            .fetch_optional(&mut *tx)
            .await?;
        let file = match file {
            Some(file) => file,
            None => {
                info!("File {} not found, nothing to delete", file_id);
                return Ok(false);
            }
        };

        for (entity, statement) in FILE_CASCADE_STEPS {
            let result = sqlx::query(statement)
                .bind(file_id)
                .execute(&mut *tx)
                .await?;
            debug!(
                entity = entity,
                rows = result.rows_affected(),
                "Removed dependent rows"
            );
        }

        // Best-effort: a missing or unreachable object must not keep the
        // metadata alive.
        if let Err(e) = self.object_store.remove_object(&file.object_key).await {
            warn!(
                "Failed to delete object '{}' from storage: {}",
                file.object_key, e
            );
        }

        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(file_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("File {} and all dependent records deleted", file_id);
        Ok(true)
    }

    /// Delete a quote and its buyer notifications. The file and its upload
    /// notification are left untouched. Returns false when the quote does
    /// not exist.
    #[instrument(skip(self), fields(quote_id = quote_id))]
    pub async fn delete_quote(&self, quote_id: i64) -> ServiceResult<bool> {
        info!("Cascade-deleting quote {}", quote_id);

        let mut tx = self.pool.begin().await?;

        let notifications = sqlx::query("DELETE FROM quote_notifications WHERE quote_id = ?")
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;
        debug!(
            rows = notifications.rows_affected(),
            "Removed quote notifications"
        );

        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            info!("Quote {} not found, nothing to delete", quote_id);
            return Ok(false);
        }

        tx.commit().await?;

        info!("Quote {} and its notifications deleted", quote_id);
        Ok(true)
    }
}
