mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    TEST_PASSWORD, create_test_user, generate_unique_email, json_request, send, setup_test_app,
};
use drivers_hub::drivers_hub_models::UserRole;

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "first_name": "Ada",
        "last_name": "Driver",
        "email": email,
        "password": TEST_PASSWORD
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_first_registration_bootstraps_admin(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/register", None, Some(register_body(&generate_unique_email()))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], 0);
    assert!(body.get("password").is_none());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/auth/register", None, Some(register_body(&generate_unique_email()))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_registers_instructor_with_profile(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool.clone());

    let mut body = register_body(&generate_unique_email());
    body["role"] = json!(1);
    let (status, user) = send(
        &app,
        json_request("POST", "/api/auth/register", Some(&admin.token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], 1);

    let user_id: uuid::Uuid = user["id"].as_str().unwrap().parse().unwrap();
    let profiles = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM instructors WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_admin_cannot_register_users(pool: PgPool) {
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            Some(&staff.token),
            Some(register_body(&generate_unique_email())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_then_me(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email.to_uppercase(), "password": TEST_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], user.email);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, json_request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user.id.to_string());
    assert_eq!(me["role"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_credentials(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    for (email, password) in [
        (user.email.as_str(), "wrong-password"),
        ("nobody@drivershub.test", TEST_PASSWORD),
    ] {
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_validation_error(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_token_is_unauthorized_before_role_check(pool: PgPool) {
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, json_request("GET", "/api/candidates", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request("GET", "/api/candidates", Some("not-a-jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request("GET", "/api/candidates", Some(&staff.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password(pool: PgPool) {
    let user = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/auth/change-password",
            Some(&user.token),
            Some(json!({ "current_password": "wrong", "new_password": "new-secret" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/auth/change-password",
            Some(&user.token),
            Some(json!({ "current_password": TEST_PASSWORD, "new_password": "new-secret" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "new-secret" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
