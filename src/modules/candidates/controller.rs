use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{Candidate, CandidateFilterParams, CreateCandidateDto, UpdateCandidateDto};

use crate::modules::candidates::service::CandidateService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(CandidateFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Candidates, newest first", body = Paginated<Candidate>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Candidates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_candidates(
    State(state): State<AppState>,
    Query(filters): Query<CandidateFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Candidate>>, AppError> {
    let page = CandidateService::get_candidates(&state.db, &filters, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate details", body = Candidate),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    ),
    tag = "Candidates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = CandidateService::get_candidate(&state.db, id).await?;
    Ok(Json(candidate))
}

/// Create a candidate. A `CLI-NNNNNN` client number is generated unless one is supplied.
#[utoipa::path(
    post,
    path = "/api/candidates",
    request_body = CreateCandidateDto,
    responses(
        (status = 201, description = "Candidate created", body = Candidate),
        (status = 400, description = "Invalid input, duplicate client number or unknown reference", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Candidates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_candidate(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCandidateDto>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let candidate = CandidateService::create_candidate(&state.db, &state.email, dto).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    put,
    path = "/api/candidates/{id}",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = UpdateCandidateDto,
    responses(
        (status = 200, description = "Candidate updated", body = Candidate),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    ),
    tag = "Candidates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCandidateDto>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = CandidateService::update_candidate(&state.db, &state.email, id, dto).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 204, description = "Candidate and dependent records deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    ),
    tag = "Candidates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CandidateService::delete_candidate(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
