use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A file attached to a candidate, e.g. an ID card or medical certificate.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct CandidateDocument {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub name: String,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Public URL under `/uploads`
    #[sqlx(skip)]
    pub url: Option<String>,
}
