use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    change_my_password, create_instructor, delete_instructor, get_instructor, get_instructors,
    get_my_profile, update_instructor, update_my_profile,
};

/// Admin management of instructors.
pub fn init_instructors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_instructors).post(create_instructor))
        .route(
            "/{id}",
            get(get_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
}

/// Routes an instructor uses on their own account.
pub fn init_instructor_self_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile))
        .route("/profile", put(update_my_profile))
        .route("/change-password", put(change_my_password))
}
