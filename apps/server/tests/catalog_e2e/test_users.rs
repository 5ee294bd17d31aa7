//! E2E tests: registration and email/password sign-in.

use actix_web::http::Method;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_register_then_signin() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let (status, user) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "secret123",
            "phone": "+1 555 123 4567",
        })),
    )
    .await;
    assert_eq!(status, 201, "{}", user);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "customer");
    assert!(user.get("password_hash").is_none());

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["user"]["id"], user["id"]);

    let claims = env
        .tokens
        .verify(body["token"].as_str().unwrap())
        .expect("issued token verifies");
    assert_eq!(claims.email, "ada@example.com");
    assert!(!claims.is_admin());
}

#[actix_rt::test]
async fn test_admin_token_from_signin_can_write() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "secret123",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, 201);

    let (_, body) = send_json(
        &app,
        Method::POST,
        "/api/users/signin",
        None,
        Some(json!({ "email": "root@example.com", "password": "secret123" })),
    )
    .await;
    let token = body["token"].as_str().unwrap();

    create_product(&app, token, "Signed-in product").await;
}

#[actix_rt::test]
async fn test_duplicate_email_conflicts() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;
    let body = json!({ "name": "Bo", "email": "bo@example.com", "password": "secret123" });

    let (status, _) =
        send_json(&app, Method::POST, "/api/users/register", None, Some(body.clone())).await;
    assert_eq!(status, 201);

    let (status, resp) =
        send_json(&app, Method::POST, "/api/users/register", None, Some(body)).await;
    assert_eq!(status, 409);
    assert_eq!(resp["error"], "Email already registered");
}

#[actix_rt::test]
async fn test_register_validation_errors() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({
            "name": "",
            "email": "not-an-email",
            "password": "123",
            "phone": "call me",
        })),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password", "phone"]);
}

#[actix_rt::test]
async fn test_signin_failures() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    send_json(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "name": "Cy", "email": "cy@example.com", "password": "secret123" })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/signin",
        None,
        Some(json!({ "email": "cy@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/users/signin",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "User not found");
}

#[actix_rt::test]
async fn test_malformed_json_is_bad_request() {
    let env = TestEnv::new().await;
    let app = create_test_app(&env).await;

    let req = actix_web::test::TestRequest::post()
        .uri("/api/users/signin")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = into_parts(actix_web::test::call_service(&app, req).await).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}
