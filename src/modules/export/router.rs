use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{export_candidates, export_instructors};

pub fn init_export_router() -> Router<AppState> {
    Router::new()
        .route("/candidate", get(export_candidates))
        .route("/instructor", get(export_instructors))
}
