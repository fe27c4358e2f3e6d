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
async fn test_instructor_writes_own_report(pool: PgPool) {
    let (instructor, instructor_id) = create_test_instructor(&pool).await;
    let candidate_id = create_test_candidate(&pool, Some(instructor_id)).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/reports",
            Some(&instructor.token),
            Some(json!({ "candidate_id": candidate_id, "notes": "Smooth roundabouts", "rating": 4 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["instructor_id"], instructor_id.to_string());
    assert_eq!(body["candidate_name"], "Test Candidate");
    assert_eq!(body["rating"], 4);

    let uri = format!("/api/reports/{}", body["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        json_request("PUT", &uri, Some(&instructor.token), Some(json!({ "rating": 5 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 5);
    assert_eq!(updated["notes"], "Smooth roundabouts");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_must_be_between_one_and_five(pool: PgPool) {
    let (instructor, instructor_id) = create_test_instructor(&pool).await;
    let candidate_id = create_test_candidate(&pool, Some(instructor_id)).await;
    let app = setup_test_app(pool);

    for rating in [0, 6] {
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/reports",
                Some(&instructor.token),
                Some(json!({ "candidate_id": candidate_id, "notes": "Parking", "rating": rating })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "rating");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reports_are_scoped_to_their_instructor(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let (alice, alice_id) = create_test_instructor(&pool).await;
    let (bob, _) = create_test_instructor(&pool).await;
    let candidate_id = create_test_candidate(&pool, Some(alice_id)).await;
    let app = setup_test_app(pool);

    let (_, report) = send(
        &app,
        json_request(
            "POST",
            "/api/reports",
            Some(&alice.token),
            Some(json!({ "candidate_id": candidate_id, "notes": "Mirror checks" })),
        ),
    )
    .await;
    let uri = format!("/api/reports/{}", report["id"].as_str().unwrap());

    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, json_request(method, &uri, Some(&bob.token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Report not found");
    }
    let (status, _) = send(
        &app,
        json_request("PUT", &uri, Some(&bob.token), Some(json!({ "rating": 1 }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/reports?instructor_id={}", alice_id),
            Some(&bob.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 0);

    let (status, list) = send(&app, json_request("GET", "/api/reports", Some(&admin.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 1);

    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&alice.token), None)).await;
    assert!(status.is_success());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_staff_cannot_reach_reports(pool: PgPool) {
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, json_request("GET", "/api/reports", Some(&staff.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
