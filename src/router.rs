use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, render_metrics};
use crate::middleware::role::{
    require_admin, require_admin_or_instructor, require_admin_or_staff, require_authenticated,
    require_instructor,
};
use crate::modules::appointments::init_appointments_router;
use crate::modules::auth::init_auth_router;
use crate::modules::candidates::init_candidates_router;
use crate::modules::cars::init_cars_router;
use crate::modules::documents::init_documents_router;
use crate::modules::export::init_export_router;
use crate::modules::instructors::{init_instructor_self_router, init_instructors_router};
use crate::modules::notifications::init_notifications_router;
use crate::modules::packages::init_packages_router;
use crate::modules::payments::init_payments_router;
use crate::modules::reports::init_reports_router;
use crate::state::AppState;

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
}

fn api_router(state: &AppState) -> Router<AppState> {
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .nest("/auth", init_auth_router())
        .nest("/candidates", init_candidates_router().route_layer(admin()))
        .nest(
            "/instructors",
            init_instructors_router().route_layer(admin()).merge(
                init_instructor_self_router().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_instructor,
                )),
            ),
        )
        .nest("/cars", init_cars_router().route_layer(admin()))
        .nest("/packages", init_packages_router().route_layer(admin()))
        .nest(
            "/payments",
            init_payments_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_or_staff,
            )),
        )
        .nest(
            "/appointments",
            init_appointments_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_or_instructor,
            )),
        )
        .nest(
            "/reports",
            init_reports_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin_or_instructor,
            )),
        )
        .nest(
            "/notifications",
            init_notifications_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_authenticated,
            )),
        )
        .nest(
            "/documents",
            init_documents_router(state.server_config.max_upload_bytes).route_layer(admin()),
        )
        .nest("/export", init_export_router().route_layer(admin()))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/metrics", get(render_metrics))
        .nest("/api", api_router(&state))
        .nest_service("/uploads", ServeDir::new(&state.server_config.upload_dir))
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
