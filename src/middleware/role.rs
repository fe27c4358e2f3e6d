//! Role-based authorization.
//!
//! Every gate in the API goes through [`check_any_role`]. Routers attach it
//! with `route_layer(from_fn_with_state(state, require_admin))` and friends;
//! handlers needing a finer rule call the predicate directly.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use drivers_hub_core::AppError;
use drivers_hub_models::UserRole;

use crate::metrics::track_authorization_check;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Whether `role` is one of `allowed`.
pub fn has_any_role(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(&role)
}

/// 403 unless the user holds one of `allowed`.
pub fn check_any_role(user: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    let allowed_now = has_any_role(user.role(), allowed);
    track_authorization_check(allowed_now, user.role().as_str());

    if !allowed_now {
        tracing::debug!(user_id = %user.id(), role = user.role().as_str(), "Role check denied");
        let names: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}",
            names.join(" or ")
        )));
    }
    Ok(())
}

/// Authenticate, then require one of `allowed_roles`.
pub async fn require_roles(
    state: AppState,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn gate(state: AppState, req: Request, next: Next, allowed: &[UserRole]) -> Response {
    match require_roles(state, req, next, allowed).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, &[UserRole::Admin]).await
}

pub async fn require_admin_or_staff(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, &[UserRole::Admin, UserRole::Staff]).await
}

pub async fn require_admin_or_instructor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, &[UserRole::Admin, UserRole::Instructor]).await
}

pub async fn require_instructor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, &[UserRole::Instructor]).await
}

/// Any valid token.
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, &UserRole::ALL).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivers_hub_models::User;
    use uuid::Uuid;

    fn user(role: UserRole) -> AuthUser {
        AuthUser(User {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@drivershub.local".to_string(),
            phone: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_has_any_role() {
        assert!(has_any_role(UserRole::Admin, &[UserRole::Admin]));
        assert!(has_any_role(UserRole::Staff, &[UserRole::Admin, UserRole::Staff]));
        assert!(!has_any_role(UserRole::Instructor, &[UserRole::Admin, UserRole::Staff]));
        assert!(!has_any_role(UserRole::Admin, &[]));
    }

    #[test]
    fn test_staff_is_limited_to_payment_routes() {
        let staff = user(UserRole::Staff);
        assert!(check_any_role(&staff, &[UserRole::Admin, UserRole::Staff]).is_ok());
        assert!(check_any_role(&staff, &[UserRole::Admin]).is_err());
        assert!(check_any_role(&staff, &[UserRole::Admin, UserRole::Instructor]).is_err());
    }

    #[test]
    fn test_denial_is_forbidden_and_names_roles() {
        let err = check_any_role(&user(UserRole::Instructor), &[UserRole::Admin, UserRole::Staff])
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.public_message(), "Access denied. Required role: admin or staff");
    }

    #[test]
    fn test_every_role_passes_authenticated_gate() {
        for role in UserRole::ALL {
            assert!(check_any_role(&user(role), &UserRole::ALL).is_ok());
        }
    }
}
