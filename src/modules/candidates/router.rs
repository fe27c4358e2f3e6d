use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_candidate, delete_candidate, get_candidate, get_candidates, update_candidate,
};

pub fn init_candidates_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_candidates).post(create_candidate))
        .route(
            "/{id}",
            get(get_candidate)
                .put(update_candidate)
                .delete(delete_candidate),
        )
}
