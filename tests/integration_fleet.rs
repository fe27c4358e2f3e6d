mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{create_test_user, json_request, send, setup_test_app, unread_for};
use drivers_hub::drivers_hub_models::UserRole;

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_car_uppercases_plate_and_notifies(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool.clone());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/cars",
            Some(&admin.token),
            Some(json!({ "model": "Toyota Yaris", "license_plate": " ab-123 ", "year": 2021 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["license_plate"], "AB-123");
    assert_eq!(body["status"], "active");

    assert_eq!(unread_for(&pool, admin.id).await, 1);
    assert_eq!(unread_for(&pool, staff.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_plate_is_rejected(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool.clone());

    let car = |plate: &str| json!({ "model": "VW Golf", "license_plate": plate });
    let (status, _) = send(&app, json_request("POST", "/api/cars", Some(&admin.token), Some(car("XY-999")))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, json_request("POST", "/api/cars", Some(&admin.token), Some(car("xy-999")))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A car with this license plate already exists");

    assert_eq!(count(&pool, "cars").await, 1);
    assert_eq!(unread_for(&pool, admin.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_car_crud(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool);

    let (_, created) = send(
        &app,
        json_request(
            "POST",
            "/api/cars",
            Some(&admin.token),
            Some(json!({ "model": "Ford Fiesta", "license_plate": "FF-100" })),
        ),
    )
    .await;
    let uri = format!("/api/cars/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        json_request("PUT", &uri, Some(&admin.token), Some(json!({ "status": "maintenance" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");
    assert_eq!(updated["license_plate"], "FF-100");

    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&admin.token), None)).await;
    assert!(status.is_success());

    let (status, body) = send(&app, json_request("GET", &uri, Some(&admin.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Car not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_package_notifies_and_rejects_duplicates(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let other_admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool.clone());

    let package = json!({ "name": "Weekend Intensive", "price": 499.0, "hours": 20 });
    let (status, body) = send(
        &app,
        json_request("POST", "/api/packages", Some(&admin.token), Some(package.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["hours"], 20);

    assert_eq!(unread_for(&pool, admin.id).await, 1);
    assert_eq!(unread_for(&pool, other_admin.id).await, 1);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/packages", Some(&admin.token), Some(package)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A package with this name already exists");
    assert_eq!(count(&pool, "packages").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_package_validation(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/packages",
            Some(&admin.token),
            Some(json!({ "name": "Free", "price": -5.0, "hours": 0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"hours"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_fan_out_rolls_back_entity(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    sqlx::query(
        r#"CREATE FUNCTION reject_notifications() RETURNS trigger AS $$
           BEGIN
               RAISE EXCEPTION 'notifications unavailable';
           END;
           $$ LANGUAGE plpgsql"#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications FOR EACH ROW EXECUTE FUNCTION reject_notifications()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool.clone());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/cars",
            Some(&admin.token),
            Some(json!({ "model": "Kia Rio", "license_plate": "RB-001" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(count(&pool, "cars").await, 0);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/candidates",
            Some(&admin.token),
            Some(json!({ "first_name": "Rolled", "last_name": "Back" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(count(&pool, "candidates").await, 0);

    let counter = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT value FROM counters WHERE name = 'candidate_client_number'",
    )
    .fetch_optional(&pool)
    .await
    .unwrap()
    .flatten();
    assert_eq!(counter, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_fleet_is_admin_only(pool: PgPool) {
    let staff = create_test_user(&pool, UserRole::Staff).await;
    let app = setup_test_app(pool);

    for uri in ["/api/cars", "/api/packages"] {
        let (status, _) = send(&app, json_request("GET", uri, Some(&staff.token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, json_request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
