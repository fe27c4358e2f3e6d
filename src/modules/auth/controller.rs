use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use drivers_hub_core::{AppError, ErrorResponse};
use drivers_hub_models::{
    ChangePasswordDto, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, User,
};

use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Register a user.
///
/// Without a token this only succeeds while no account exists (the first
/// user becomes admin). With an admin token it creates a user of the
/// requested role.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Validation error or email already exists", body = ErrorResponse),
        (status = 403, description = "Registration closed or caller is not an admin", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, caller, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let caller = caller.map(|AuthUser(user)| user);
    let user = AuthService::register_user(&state.db, dto, caller.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth_user))]
pub async fn get_me(auth_user: AuthUser) -> Json<User> {
    Json(auth_user.0)
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error or wrong current password", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::change_password(&state.db, auth_user.id(), dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
