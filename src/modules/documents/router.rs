use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::state::AppState;

use super::controller::{delete_document, download_document, list_documents, upload_document};

/// Multipart overhead allowed on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn init_documents_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/candidate/{candidate_id}",
            get(list_documents).post(upload_document),
        )
        .route(
            "/candidate/{candidate_id}/{document_id}",
            get(download_document).delete(delete_document),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
}
