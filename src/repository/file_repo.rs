use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{error, info};

use crate::dto::file_dto::FileSearchRequest;
use crate::model::file::{File, NewFile};
use crate::model::notification::Notification;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert the file row and its upload notification in one transaction.
    /// A file must never exist without its notification.
    async fn create_with_notification(
        &self,
        file: NewFile,
        part_name: &str,
    ) -> RepositoryResult<(File, Notification)>;
    async fn get_by_id(&self, id: i64) -> RepositoryResult<File>;
    async fn get_by_object_key(&self, object_key: &str) -> RepositoryResult<File>;
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        uploaded_by: Option<&str>,
    ) -> RepositoryResult<(Vec<File>, i64)>;
    async fn search(&self, params: &FileSearchRequest) -> RepositoryResult<(Vec<File>, i64)>;
}

pub struct SqliteFileRepository {
    pool: SqlitePool,
}

impl SqliteFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteFileRepository { pool }
    }
}

#[async_trait]
impl FileRepository for SqliteFileRepository {
    #[tracing::instrument(skip(self, file), fields(original_name = %file.original_name))]
    async fn create_with_notification(
        &self,
        file: NewFile,
        part_name: &str,
    ) -> RepositoryResult<(File, Notification)> {
        info!("Registering uploaded file '{}'", file.original_name);

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM files WHERE original_name = ?",
        )
        .bind(&file.original_name)
        .fetch_one(&mut *tx)
        .await?;
        if duplicate > 0 {
            error!("File '{}' already exists", file.original_name);
            return Err(RepositoryError::already_exists(format!(
                "File '{}' already exists. Please rename the file or delete the existing one.",
                file.original_name
            )));
        }

        let result = sqlx::query(
            "INSERT INTO files (object_key, original_name, content_type, file_size, uploaded_by, \
             description, material, part_number, quantity_unit, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.object_key)
        .bind(&file.original_name)
        .bind(&file.content_type)
        .bind(file.file_size)
        .bind(&file.uploaded_by)
        .bind(&file.description)
        .bind(&file.material)
        .bind(&file.part_number)
        .bind(&file.quantity_unit)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let file_id = result.last_insert_rowid();

        let notification_result = sqlx::query(
            "INSERT INTO notifications (file_id, object_key, part_name, material, part_number, \
             quantity_unit, uploaded_by, description, is_read, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(file_id)
        .bind(&file.object_key)
        .bind(part_name)
        .bind(&file.material)
        .bind(&file.part_number)
        .bind(&file.quantity_unit)
        .bind(&file.uploaded_by)
        .bind(&file.description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let notification_id = notification_result.last_insert_rowid();

        tx.commit().await?;

        info!(
            file_id = file_id,
            notification_id = notification_id,
            "File registered and manufacturer notified"
        );

        let created_file = File {
            id: file_id,
            object_key: file.object_key.clone(),
            original_name: file.original_name,
            content_type: file.content_type,
            file_size: file.file_size,
            uploaded_by: file.uploaded_by.clone(),
            description: file.description.clone(),
            material: file.material.clone(),
            part_number: file.part_number.clone(),
            quantity_unit: file.quantity_unit.clone(),
            created_at: now,
            updated_at: now,
        };
        let notification = Notification {
            id: notification_id,
            file_id,
            object_key: file.object_key,
            part_name: part_name.to_string(),
            material: file.material,
            part_number: file.part_number,
            quantity_unit: file.quantity_unit,
            uploaded_by: file.uploaded_by,
            description: file.description,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        Ok((created_file, notification))
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn get_by_id(&self, id: i64) -> RepositoryResult<File> {
        let file = sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match file {
            Some(file) => Ok(file),
            None => {
                error!("File not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "File not found for ID: {}",
                    id
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(object_key = %object_key))]
    async fn get_by_object_key(&self, object_key: &str) -> RepositoryResult<File> {
        let file = sqlx::query_as::<_, File>("SELECT * FROM files WHERE object_key = ?")
            .bind(object_key)
            .fetch_optional(&self.pool)
            .await?;
        match file {
            Some(file) => Ok(file),
            None => {
                error!("File not found for object key: {}", object_key);
                Err(RepositoryError::not_found(format!(
                    "File not found in database: {}",
                    object_key
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        uploaded_by: Option<&str>,
    ) -> RepositoryResult<(Vec<File>, i64)> {
        info!("Listing files with limit: {}, offset: {}", limit, offset);

        let (files, total) = match uploaded_by {
            Some(uploader) => {
                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM files WHERE uploaded_by = ?",
                )
                .bind(uploader)
                .fetch_one(&self.pool)
                .await?;
                let files = sqlx::query_as::<_, File>(
                    "SELECT * FROM files WHERE uploaded_by = ? \
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(uploader)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (files, total)
            }
            None => {
                let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
                    .fetch_one(&self.pool)
                    .await?;
                let files = sqlx::query_as::<_, File>(
                    "SELECT * FROM files ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (files, total)
            }
        };

        info!("Fetched {} of {} files", files.len(), total);
        Ok((files, total))
    }

    #[tracing::instrument(skip(self, params))]
    async fn search(&self, params: &FileSearchRequest) -> RepositoryResult<(Vec<File>, i64)> {
        info!("Searching files");

        let mut count_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM files WHERE 1=1");
        if let Some(query) = &params.query {
            count_builder.push(" AND original_name LIKE ");
            count_builder.push_bind(format!("%{}%", query));
        }
        if let Some(uploader) = &params.uploaded_by {
            count_builder.push(" AND uploaded_by = ");
            count_builder.push_bind(uploader);
        }
        if let Some(start) = params.start_date {
            count_builder.push(" AND created_at >= ");
            count_builder.push_bind(start);
        }
        if let Some(end) = params.end_date {
            count_builder.push(" AND created_at <= ");
            count_builder.push_bind(end);
        }
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM files WHERE 1=1");
        if let Some(query) = &params.query {
            select_builder.push(" AND original_name LIKE ");
            select_builder.push_bind(format!("%{}%", query));
        }
        if let Some(uploader) = &params.uploaded_by {
            select_builder.push(" AND uploaded_by = ");
            select_builder.push_bind(uploader);
        }
        if let Some(start) = params.start_date {
            select_builder.push(" AND created_at >= ");
            select_builder.push_bind(start);
        }
        if let Some(end) = params.end_date {
            select_builder.push(" AND created_at <= ");
            select_builder.push_bind(end);
        }
        select_builder.push(" ORDER BY created_at DESC LIMIT ");
        select_builder.push_bind(params.limit);
        select_builder.push(" OFFSET ");
        select_builder.push_bind(params.offset);

        let files = select_builder
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await?;

        info!("Search matched {} of {} files", files.len(), total);
        Ok((files, total))
    }
}
