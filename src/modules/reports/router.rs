use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_report, delete_report, get_report, get_reports, update_report};

pub fn init_reports_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_reports).post(create_report))
        .route(
            "/{id}",
            get(get_report).put(update_report).delete(delete_report),
        )
}
