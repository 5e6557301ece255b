use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::dto::file_dto::{
    DownloadResponse, FileSearchRequest, UploadRequest, UploadResponse,
};
use crate::model::file::{File, NewFile};
use crate::repository::file_repo::{FileRepository, SqliteFileRepository};
use crate::service::cascade::CascadeDeleteService;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::minio::ObjectStore;

/// Manufacturing CAD interchange formats accepted for upload.
const CAD_EXTENSIONS: &[&str] = &[".stp", ".step", ".igs", ".iges"];

fn has_cad_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    CAD_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Display name of the part, i.e. the filename without its CAD extension.
fn part_name_from(filename: &str) -> String {
    let lower = filename.to_lowercase();
    for ext in CAD_EXTENSIONS {
        if lower.ends_with(ext) {
            return filename[..filename.len() - ext.len()].to_string();
        }
    }
    filename.to_string()
}

#[async_trait]
pub trait FileService: Send + Sync {
    /// Register an upload: hand out a transfer URL and persist the file row
    /// together with its manufacturer notification in one transaction.
    async fn request_upload(&self, request: UploadRequest) -> ServiceResult<UploadResponse>;
    async fn request_download(&self, object_key: &str) -> ServiceResult<DownloadResponse>;
    async fn get_metadata(&self, file_id: i64) -> ServiceResult<File>;
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        uploaded_by: Option<&str>,
    ) -> ServiceResult<(Vec<File>, i64)>;
    async fn search(&self, params: FileSearchRequest) -> ServiceResult<(Vec<File>, i64)>;
    /// Delete the file addressed by its object key, cascading to every
    /// dependent record. Returns false when no such file exists.
    async fn delete(&self, object_key: &str) -> ServiceResult<bool>;
}

pub struct FileServiceImpl {
    pub file_repo: Arc<SqliteFileRepository>,
    pub object_store: Arc<dyn ObjectStore>,
    pub cascade: Arc<CascadeDeleteService>,
}

impl FileServiceImpl {
    pub fn new(
        file_repo: Arc<SqliteFileRepository>,
        object_store: Arc<dyn ObjectStore>,
        cascade: Arc<CascadeDeleteService>,
    ) -> Self {
        FileServiceImpl {
            file_repo,
            object_store,
            cascade,
        }
    }
}

#[async_trait]
impl FileService for FileServiceImpl {
    #[instrument(skip(self, request), fields(filename = %request.filename))]
    async fn request_upload(&self, request: UploadRequest) -> ServiceResult<UploadResponse> {
        info!("Registering upload for '{}'", request.filename);

        if !has_cad_extension(&request.filename) {
            error!("Rejected upload with unsupported extension");
            return Err(ServiceError::InvalidInput(
                "Only .stp, .step, .igs, or .iges files are allowed for manufacturing CAD files"
                    .to_string(),
            ));
        }

        let object_key = format!(
            "stp/{}_{}_{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            Uuid::new_v4(),
            request.filename
        );

        // URL issuance failure is fatal on this path: nothing may be
        // persisted for an upload the client cannot perform.
        let upload_url = self.object_store.upload_url(&object_key)?;

        let part_name = part_name_from(&request.filename);
        let new_file = NewFile {
            object_key: object_key.clone(),
            original_name: request.filename,
            content_type: request.content_type,
            file_size: request.file_size,
            uploaded_by: request.uploaded_by,
            description: request.description,
            material: request.material,
            part_number: request.part_number,
            quantity_unit: request.quantity_unit,
        };

        let res = self
            .file_repo
            .create_with_notification(new_file, &part_name)
            .await;
        match res {
            Ok((file, notification)) => {
                info!(file_id = file.id, "Upload registered");
                Ok(UploadResponse {
                    upload_url,
                    object_key,
                    file_id: file.id,
                    notification,
                })
            }
            Err(e) => {
                error!("Failed to register upload: {e}");
                Err(ServiceError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(object_key = %object_key))]
    async fn request_download(&self, object_key: &str) -> ServiceResult<DownloadResponse> {
        info!("Issuing download link");
        let file = self
            .file_repo
            .get_by_object_key(object_key)
            .await
            .map_err(ServiceError::from)?;
        let download_url = self.object_store.download_url(object_key)?;
        Ok(DownloadResponse { download_url, file })
    }

    #[instrument(skip(self), fields(file_id = file_id))]
    async fn get_metadata(&self, file_id: i64) -> ServiceResult<File> {
        self.file_repo
            .get_by_id(file_id)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        uploaded_by: Option<&str>,
    ) -> ServiceResult<(Vec<File>, i64)> {
        self.file_repo
            .list(limit, offset, uploaded_by)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self, params))]
    async fn search(&self, params: FileSearchRequest) -> ServiceResult<(Vec<File>, i64)> {
        self.file_repo
            .search(&params)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(object_key = %object_key))]
    async fn delete(&self, object_key: &str) -> ServiceResult<bool> {
        info!("Deleting file");
        let file = match self.file_repo.get_by_object_key(object_key).await {
            Ok(file) => file,
            Err(crate::repository::repository_error::RepositoryError::NotFound(_)) => {
                info!("File not found, nothing deleted");
                return Ok(false);
            }
            Err(e) => {
                error!("Failed to resolve file for deletion: {e}");
                return Err(ServiceError::from(e));
            }
        };
        self.cascade.delete_file(file.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_cad_extension() {
        assert!(has_cad_extension("bracket.stp"));
        assert!(has_cad_extension("BRACKET.STEP"));
        assert!(has_cad_extension("housing.iges"));
        assert!(!has_cad_extension("drawing.pdf"));
        assert!(!has_cad_extension("model.stl"));
    }

    #[test]
    fn test_part_name_strips_extension() {
        assert_eq!(part_name_from("bracket.stp"), "bracket");
        assert_eq!(part_name_from("Gear Housing.STEP"), "Gear Housing");
        assert_eq!(part_name_from("unversioned"), "unversioned");
    }
}
