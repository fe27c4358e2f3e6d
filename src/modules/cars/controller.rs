use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{Car, CarFilterParams, CreateCarDto, UpdateCarDto};

use crate::modules::cars::service::CarService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/cars",
    params(CarFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Cars", body = Paginated<Car>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Cars",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_cars(
    State(state): State<AppState>,
    Query(filters): Query<CarFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Car>>, AppError> {
    Ok(Json(CarService::get_cars(&state.db, &filters, &pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car details", body = Car),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    tag = "Cars",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    Ok(Json(CarService::get_car(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/cars",
    request_body = CreateCarDto,
    responses(
        (status = 201, description = "Car created", body = Car),
        (status = 400, description = "Invalid input or duplicate license plate", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Cars",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_car(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCarDto>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    let car = CarService::create_car(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    request_body = UpdateCarDto,
    responses(
        (status = 200, description = "Car updated", body = Car),
        (status = 400, description = "Invalid input or duplicate license plate", body = ErrorResponse),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    tag = "Cars",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCarDto>,
) -> Result<Json<Car>, AppError> {
    Ok(Json(CarService::update_car(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 404, description = "Car not found", body = ErrorResponse)
    ),
    tag = "Cars",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CarService::delete_car(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
