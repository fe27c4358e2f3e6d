mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    create_test_candidate, create_test_instructor, create_test_user, json_request, send,
    setup_test_app,
};
use drivers_hub::drivers_hub_models::UserRole;

#[sqlx::test(migrations = "./migrations")]
async fn test_staff_records_payments(pool: PgPool) {
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let candidate_id = create_test_candidate(&pool, None).await;
    let app = setup_test_app(pool);

    let (status, pending) = send(
        &app,
        json_request(
            "POST",
            "/api/payments",
            Some(&staff.token),
            Some(json!({ "candidate_id": candidate_id, "amount": 120.5, "method": "cash" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pending["status"], "pending");
    assert!(pending["paid_at"].is_null());
    assert_eq!(pending["created_by"], staff.id.to_string());

    let (status, paid) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/payments/{}", pending["id"].as_str().unwrap()),
            Some(&staff.token),
            Some(json!({ "status": "paid" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");
    assert!(paid["paid_at"].is_string());
    assert_eq!(paid["amount"], 120.5);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_payment_validation(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let candidate_id = create_test_candidate(&pool, None).await;
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/payments",
            Some(&admin.token),
            Some(json!({ "candidate_id": candidate_id, "amount": 0, "method": "bank" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/payments",
            Some(&admin.token),
            Some(json!({ "candidate_id": uuid::Uuid::new_v4(), "amount": 50, "method": "bank" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Candidate not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_instructors_cannot_reach_payments(pool: PgPool) {
    let (instructor, _) = create_test_instructor(&pool).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, json_request("GET", "/api/payments", Some(&instructor.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
