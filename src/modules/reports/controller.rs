use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{CreateReportDto, Report, ReportFilterParams, UpdateReportDto};

use crate::middleware::auth::AuthUser;
use crate::modules::reports::service::ReportService;
use crate::state::AppState;
use crate::utils::auth_helpers::instructor_scope;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Reports, newest first", body = Paginated<Report>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin or instructor only", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_reports(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<ReportFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Report>>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    let page = ReportService::get_reports(&state.db, scope, &filters, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report details", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    Ok(Json(ReportService::get_report(&state.db, scope, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report written", body = Report),
        (status = 400, description = "Invalid input or unknown reference", body = ErrorResponse),
        (status = 403, description = "Reporting as another instructor", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn create_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateReportDto>,
) -> Result<(StatusCode, Json<Report>), AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    let report = ReportService::create_report(&state.db, scope, dto).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateReportDto>,
) -> Result<Json<Report>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    Ok(Json(ReportService::update_report(&state.db, scope, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn delete_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    ReportService::delete_report(&state.db, scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
