use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{CreatePackageDto, Package, UpdatePackageDto};

use crate::modules::packages::service::PackageService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/packages",
    params(PaginationParams),
    responses(
        (status = 200, description = "Packages, cheapest first", body = Paginated<Package>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_packages(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Package>>, AppError> {
    Ok(Json(PackageService::get_packages(&state.db, &pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package details", body = Package),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Package>, AppError> {
    Ok(Json(PackageService::get_package(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/packages",
    request_body = CreatePackageDto,
    responses(
        (status = 201, description = "Package created", body = Package),
        (status = 400, description = "Invalid input or duplicate name", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_package(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePackageDto>,
) -> Result<(StatusCode, Json<Package>), AppError> {
    let package = PackageService::create_package(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

#[utoipa::path(
    put,
    path = "/api/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    request_body = UpdatePackageDto,
    responses(
        (status = 200, description = "Package updated", body = Package),
        (status = 400, description = "Invalid input or duplicate name", body = ErrorResponse),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdatePackageDto>,
) -> Result<Json<Package>, AppError> {
    Ok(Json(PackageService::update_package(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 204, description = "Package deleted"),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PackageService::delete_package(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
