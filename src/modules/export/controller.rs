use axum::extract::{Query, State};
use tracing::instrument;

use drivers_hub_core::{AppError, ErrorResponse};
use drivers_hub_models::ExportParams;

use crate::modules::export::service::{ExportFile, ExportService};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/export/candidate",
    params(ExportParams),
    responses(
        (status = 200, description = "All candidates as an attachment", content_type = "text/csv"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Export",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn export_candidates(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<ExportFile, AppError> {
    ExportService::export_candidates(&state.db, params.format()).await
}

#[utoipa::path(
    get,
    path = "/api/export/instructor",
    params(ExportParams),
    responses(
        (status = 200, description = "All instructors as an attachment", content_type = "text/csv"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Export",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn export_instructors(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<ExportFile, AppError> {
    ExportService::export_instructors(&state.db, params.format()).await
}
