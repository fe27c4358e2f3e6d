use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use drivers_hub_models::{
    Appointment, AppointmentFilterParams, CreateAppointmentDto, MessageResponse,
    UpdateAppointmentDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::appointments::service::AppointmentService;
use crate::state::AppState;
use crate::utils::auth_helpers::instructor_scope;
use crate::validator::ValidatedJson;

/// List appointments. Instructors only ever see their own, whatever `instructor_id` says.
#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Appointments ordered by start time", body = Paginated<Appointment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin or instructor only", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_appointments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AppointmentFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<Appointment>>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    let page = AppointmentService::get_appointments(&state.db, scope, &filters, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = Appointment),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn get_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    Ok(Json(AppointmentService::get_appointment(&state.db, scope, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentDto,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Invalid input, bad time window or unknown reference", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Booking for another instructor", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn create_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAppointmentDto>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    let appointment = AppointmentService::create_appointment(&state.db, scope, dto).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentDto,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 400, description = "Invalid input or bad time window", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn update_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAppointmentDto>,
) -> Result<Json<Appointment>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    let appointment = AppointmentService::update_appointment(&state.db, scope, id, dto).await?;
    Ok(Json(appointment))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn delete_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    AppointmentService::delete_appointment(&state.db, scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/remind",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Reminder sent", body = MessageResponse),
        (status = 400, description = "Candidate has no usable email address", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 500, description = "Mail transport failed", body = ErrorResponse)
    ),
    tag = "Appointments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.id()))]
pub async fn send_reminder(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let scope = instructor_scope(&state.db, &auth_user).await?;
    AppointmentService::send_reminder(&state.db, &state.email, scope, id).await?;
    Ok(Json(MessageResponse::new("Reminder sent")))
}
