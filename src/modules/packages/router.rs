use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_package, delete_package, get_package, get_packages, update_package};

pub fn init_packages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_packages).post(create_package))
        .route(
            "/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
}
