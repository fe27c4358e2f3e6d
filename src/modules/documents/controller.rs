use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use drivers_hub_core::file_storage::sanitize_file_name;
use drivers_hub_core::{AppError, ErrorResponse};
use drivers_hub_models::CandidateDocument;

use crate::middleware::auth::AuthUser;
use crate::modules::documents::service::{DocumentService, DocumentUpload};
use crate::state::AppState;

/// Multipart body accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DocumentUploadForm {
    /// PDF, PNG, JPEG or WebP
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Display name; defaults to the file name
    name: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<DocumentUpload, AppError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Could not read uploaded file: {}", e))
                })?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "name" => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Invalid name field: {}", e))
                })?;
                name = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, content_type, content) =
        file.ok_or_else(|| AppError::bad_request(anyhow::anyhow!("No file uploaded")))?;

    Ok(DocumentUpload {
        name,
        file_name,
        content_type,
        content,
    })
}

#[utoipa::path(
    post,
    path = "/api/documents/candidate/{candidate_id}",
    params(("candidate_id" = Uuid, Path, description = "Candidate ID")),
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document uploaded", body = CandidateDocument),
        (status = 400, description = "Missing file, disallowed type or too large", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.id()))]
pub async fn upload_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(candidate_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CandidateDocument>), AppError> {
    let upload = read_upload(multipart).await?;
    let document = DocumentService::upload_document(
        &state.db,
        state.storage.as_ref(),
        candidate_id,
        auth_user.id(),
        upload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/documents/candidate/{candidate_id}",
    params(("candidate_id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate documents, newest first", body = Vec<CandidateDocument>),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<CandidateDocument>>, AppError> {
    let documents =
        DocumentService::list_documents(&state.db, state.storage.as_ref(), candidate_id).await?;
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/candidate/{candidate_id}/{document_id}",
    params(
        ("candidate_id" = Uuid, Path, description = "Candidate ID"),
        ("document_id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "The stored file", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn download_document(
    State(state): State<AppState>,
    Path((candidate_id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let (document, content) = DocumentService::download_document(
        &state.db,
        state.storage.as_ref(),
        candidate_id,
        document_id,
    )
    .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&document.file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/documents/candidate/{candidate_id}/{document_id}",
    params(
        ("candidate_id" = Uuid, Path, description = "Candidate ID"),
        ("document_id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_document(
    State(state): State<AppState>,
    Path((candidate_id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    DocumentService::delete_document(&state.db, state.storage.as_ref(), candidate_id, document_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
