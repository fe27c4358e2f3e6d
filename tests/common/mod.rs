#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use drivers_hub::drivers_hub_auth::create_access_token;
use drivers_hub::drivers_hub_config::{
    CorsConfig, EmailConfig, Environment, JwtConfig, ServerConfig,
};
use drivers_hub::drivers_hub_core::hash_password;
use drivers_hub::drivers_hub_models::UserRole;
use drivers_hub::router::init_router;
use drivers_hub::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "drivers-hub-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    let upload_dir: PathBuf =
        std::env::temp_dir().join(format!("drivers-hub-test-{}", Uuid::new_v4()));
    let server_config = ServerConfig {
        port: 5000,
        environment: Environment::Development,
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        public_url: "http://localhost:5000".to_string(),
        log_dir: std::env::temp_dir(),
        metrics_enabled: false,
    };

    AppState::new(
        pool,
        jwt_config(),
        CorsConfig::from_list("http://localhost:5173"),
        server_config,
        &EmailConfig::log_only(),
        None,
    )
    .unwrap()
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@drivershub.test", Uuid::new_v4())
}

/// Inserts a user directly and issues a token for it.
pub async fn create_test_user(pool: &PgPool, role: UserRole) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO users (first_name, last_name, email, password, role)
           VALUES ('Test', 'User', $1, $2, $3)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    let token = create_access_token(id, &email, role.code(), &jwt_config()).unwrap();
    TestUser { id, email, token }
}

/// Creates an instructor user plus its instructor row. Returns the user and the instructor id.
pub async fn create_test_instructor(pool: &PgPool) -> (TestUser, Uuid) {
    let user = create_test_user(pool, UserRole::Instructor).await;
    let instructor_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO instructors (user_id) VALUES ($1) RETURNING id",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await
    .unwrap();
    (user, instructor_id)
}

pub async fn create_test_candidate(pool: &PgPool, instructor_id: Option<Uuid>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO candidates (unique_client_number, first_name, last_name, email, instructor_id)
           VALUES ($1, 'Test', 'Candidate', $2, $3)
           RETURNING id"#,
    )
    .bind(format!("IMP-{}", &Uuid::new_v4().simple().to_string()[..12]))
    .bind(generate_unique_email())
    .bind(instructor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status with the decoded JSON body (`Null` when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Inserts a candidate holding the given client number, as an import would.
pub async fn create_candidate_with_number(pool: &PgPool, client_number: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO candidates (unique_client_number, first_name, last_name)
           VALUES ($1, 'Imported', 'Candidate')
           RETURNING id"#,
    )
    .bind(client_number)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Unread notifications held by a user.
pub async fn unread_for(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Marks an instructor inactive directly in the database.
pub async fn deactivate_instructor(pool: &PgPool, instructor_id: Uuid) {
    sqlx::query("UPDATE instructors SET status = 'inactive' WHERE id = $1")
        .bind(instructor_id)
        .execute(pool)
        .await
        .unwrap();
}
