use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_car, delete_car, get_car, get_cars, update_car};

pub fn init_cars_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cars).post(create_car))
        .route("/{id}", get(get_car).put(update_car).delete(delete_car))
}
