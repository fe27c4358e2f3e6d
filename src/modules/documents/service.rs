use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::file_storage::{mime_from_file_name, sanitize_file_name};
use drivers_hub_core::{AppError, FileStorage, StorageError};
use drivers_hub_models::CandidateDocument;

const DOCUMENT_COLUMNS: &str =
    "id, candidate_id, name, file_name, storage_key, mime_type, size_bytes, uploaded_by, created_at";

/// A file received from a multipart upload, before it is stored.
#[derive(Debug)]
pub struct DocumentUpload {
    pub name: Option<String>,
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl DocumentUpload {
    /// Declared content type, falling back to the file extension when the
    /// client sent none or a generic one.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| mime_from_file_name(&self.file_name).map(str::to_string))
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.file_name)
            .to_string()
    }
}

pub fn storage_key(candidate_id: Uuid, file_name: &str) -> String {
    format!(
        "candidates/{}/{}-{}",
        candidate_id,
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::NotFound => AppError::not_found(anyhow::anyhow!("Document file not found")),
        e if e.is_client_error() => AppError::bad_request(e),
        e => AppError::internal(e),
    }
}

fn with_url(
    storage: &dyn FileStorage,
    mut document: CandidateDocument,
) -> Result<CandidateDocument, AppError> {
    document.url = Some(storage.get_url(&document.storage_key).map_err(storage_error)?);
    Ok(document)
}

pub struct DocumentService;

impl DocumentService {
    async fn ensure_candidate(db: &PgPool, candidate_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM candidates WHERE id = $1)",
        )
        .bind(candidate_id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("Candidate not found")));
        }
        Ok(())
    }

    #[instrument(skip(db, storage, upload), fields(file.size = upload.content.len()))]
    pub async fn upload_document(
        db: &PgPool,
        storage: &dyn FileStorage,
        candidate_id: Uuid,
        uploaded_by: Uuid,
        upload: DocumentUpload,
    ) -> Result<CandidateDocument, AppError> {
        Self::ensure_candidate(db, candidate_id).await?;

        let mime_type = upload.mime_type().ok_or_else(|| {
            AppError::bad_request(anyhow::anyhow!("Could not determine the file type"))
        })?;
        let key = storage_key(candidate_id, &upload.file_name);

        storage
            .save(&key, &upload.content, &mime_type)
            .await
            .map_err(storage_error)?;

        let inserted = sqlx::query_as::<_, CandidateDocument>(&format!(
            r#"INSERT INTO candidate_documents
                (candidate_id, name, file_name, storage_key, mime_type, size_bytes, uploaded_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {}"#,
            DOCUMENT_COLUMNS
        ))
        .bind(candidate_id)
        .bind(upload.display_name())
        .bind(&upload.file_name)
        .bind(&key)
        .bind(&mime_type)
        .bind(upload.content.len() as i64)
        .bind(uploaded_by)
        .fetch_one(db)
        .await;

        let document = match inserted {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = storage.delete(&key).await {
                    tracing::warn!(%key, error = %cleanup, "Orphaned upload could not be removed");
                }
                return Err(e.into());
            }
        };

        tracing::info!(document_id = %document.id, %candidate_id, %mime_type, "Document uploaded");
        with_url(storage, document)
    }

    #[instrument(skip(db, storage))]
    pub async fn list_documents(
        db: &PgPool,
        storage: &dyn FileStorage,
        candidate_id: Uuid,
    ) -> Result<Vec<CandidateDocument>, AppError> {
        Self::ensure_candidate(db, candidate_id).await?;

        let documents = sqlx::query_as::<_, CandidateDocument>(&format!(
            "SELECT {} FROM candidate_documents WHERE candidate_id = $1 ORDER BY created_at DESC, id",
            DOCUMENT_COLUMNS
        ))
        .bind(candidate_id)
        .fetch_all(db)
        .await?;

        documents
            .into_iter()
            .map(|document| with_url(storage, document))
            .collect()
    }

    #[instrument(skip(db))]
    pub async fn get_document(
        db: &PgPool,
        candidate_id: Uuid,
        document_id: Uuid,
    ) -> Result<CandidateDocument, AppError> {
        sqlx::query_as::<_, CandidateDocument>(&format!(
            "SELECT {} FROM candidate_documents WHERE id = $1 AND candidate_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(document_id)
        .bind(candidate_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Document not found")))
    }

    /// Document metadata together with the stored bytes.
    #[instrument(skip(db, storage))]
    pub async fn download_document(
        db: &PgPool,
        storage: &dyn FileStorage,
        candidate_id: Uuid,
        document_id: Uuid,
    ) -> Result<(CandidateDocument, Vec<u8>), AppError> {
        let document = Self::get_document(db, candidate_id, document_id).await?;
        let content = storage
            .read(&document.storage_key)
            .await
            .map_err(storage_error)?;
        Ok((document, content))
    }

    /// Delete the row, then the file. A file that cannot be removed is only logged.
    #[instrument(skip(db, storage))]
    pub async fn delete_document(
        db: &PgPool,
        storage: &dyn FileStorage,
        candidate_id: Uuid,
        document_id: Uuid,
    ) -> Result<(), AppError> {
        let key = sqlx::query_scalar::<_, String>(
            "DELETE FROM candidate_documents WHERE id = $1 AND candidate_id = $2 RETURNING storage_key",
        )
        .bind(document_id)
        .bind(candidate_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Document not found")))?;

        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(%document_id, %key, error = %e, "Could not remove stored document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: Option<&str>) -> DocumentUpload {
        DocumentUpload {
            name: None,
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            content: b"data".to_vec(),
        }
    }

    #[test]
    fn test_mime_type_prefers_declared_type() {
        assert_eq!(
            upload("scan.bin", Some("image/png")).mime_type().as_deref(),
            Some("image/png")
        );
        assert_eq!(
            upload("scan.pdf", Some("Application/PDF; charset=binary")).mime_type().as_deref(),
            Some("application/pdf")
        );
    }

    #[test]
    fn test_mime_type_falls_back_to_extension() {
        assert_eq!(
            upload("licence.jpg", Some("application/octet-stream")).mime_type().as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(upload("licence.webp", None).mime_type().as_deref(), Some("image/webp"));
        assert_eq!(upload("notes.txt", None).mime_type(), None);
    }

    #[test]
    fn test_display_name_defaults_to_file_name() {
        let mut named = upload("id.pdf", None);
        assert_eq!(named.display_name(), "id.pdf");
        named.name = Some("  Identity card ".to_string());
        assert_eq!(named.display_name(), "Identity card");
    }

    #[test]
    fn test_storage_key_layout() {
        let candidate_id = Uuid::new_v4();
        let key = storage_key(candidate_id, "../my id (front).png");
        let prefix = format!("candidates/{}/", candidate_id);
        assert!(key.starts_with(&prefix));
        assert!(key.ends_with("-my_id__front_.png"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_storage_errors_map_to_status() {
        assert_eq!(storage_error(StorageError::EmptyFile).status.as_u16(), 400);
        assert_eq!(storage_error(StorageError::NotFound).status.as_u16(), 404);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(storage_error(StorageError::IoError(io)).status.as_u16(), 500);
    }
}
