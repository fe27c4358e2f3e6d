use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{
    ChangePasswordDto, CreateInstructorDto, Instructor, InstructorFilterParams, MessageResponse,
    UpdateInstructorDto, UpdateInstructorProfileDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::service::AuthService;
use crate::modules::instructors::service::InstructorService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructors",
    params(InstructorFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Instructors", body = Paginated<Instructor>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_instructors(
    State(state): State<AppState>,
    Query(filters): Query<InstructorFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Instructor>>, AppError> {
    let page = InstructorService::get_instructors(&state.db, &filters, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor details", body = Instructor),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::get_instructor(&state.db, id).await?;
    Ok(Json(instructor))
}

/// Create an instructor together with their login account.
#[utoipa::path(
    post,
    path = "/api/instructors",
    request_body = CreateInstructorDto,
    responses(
        (status = 201, description = "Instructor created", body = Instructor),
        (status = 400, description = "Invalid input, email taken or unknown car", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_instructor(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateInstructorDto>,
) -> Result<(StatusCode, Json<Instructor>), AppError> {
    let instructor = InstructorService::create_instructor(&state.db, &state.email, dto).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

#[utoipa::path(
    put,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    request_body = UpdateInstructorDto,
    responses(
        (status = 200, description = "Instructor updated", body = Instructor),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateInstructorDto>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::update_instructor(&state.db, id, dto).await?;
    Ok(Json(instructor))
}

/// Deactivate an instructor. The record and account are kept.
#[utoipa::path(
    delete,
    path = "/api/instructors/{id}",
    params(("id" = Uuid, Path, description = "Instructor ID")),
    responses(
        (status = 204, description = "Instructor deactivated"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    InstructorService::deactivate_instructor(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/instructors/me",
    responses(
        (status = 200, description = "The caller's instructor profile", body = Instructor),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Instructor only", body = ErrorResponse),
        (status = 404, description = "No instructor profile", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::get_instructor_by_user(&state.db, auth_user.id()).await?;
    Ok(Json(instructor))
}

#[utoipa::path(
    put,
    path = "/api/instructors/profile",
    request_body = UpdateInstructorProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Instructor),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Instructor only", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateInstructorProfileDto>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = InstructorService::update_profile(&state.db, auth_user.id(), dto).await?;
    Ok(Json(instructor))
}

#[utoipa::path(
    put,
    path = "/api/instructors/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Wrong current password or invalid new password", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Instructor only", body = ErrorResponse)
    ),
    tag = "Instructors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn change_my_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::change_password(&state.db, auth_user.id(), dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
