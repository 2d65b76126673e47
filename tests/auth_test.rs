//! Integration tests for registration, login and profile routes

mod common;
use serial_test::serial;

use actix_web::{test, App};
use common::{database::*, fixtures::*};
use placementhub::middleware::ClientCtx;
use placementhub::orm::experiences::ModerationStatus;
use serde_json::{json, Value};

#[actix_rt::test]
#[serial]
async fn test_register_issues_token_and_hides_password() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("X-Forwarded-For", "203.0.113.10"))
        .set_json(json!({
            "name": "Asha Rao",
            "email": "Asha@Test.edu",
            "password": "password123",
            "username": "asha_rao",
            "branch": "CSE",
            "graduation_year": 2025
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().expect("Token missing");
    assert!(!token.is_empty());
    // Email is normalized, the role defaults to student, and the password
    // hash stays server-side.
    assert_eq!(body["data"]["user"]["email"], "asha@test.edu");
    assert_eq!(body["data"]["user"]["role"], "student");
    assert!(body["data"]["user"].get("password").is_none());

    let me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, me).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "asha_rao");
}

#[actix_rt::test]
#[serial]
async fn test_register_alumni_role() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("X-Forwarded-For", "203.0.113.11"))
        .set_json(json!({
            "name": "Ravi Menon",
            "email": "ravi@test.edu",
            "password": "password123",
            "is_alumni": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "alumni");
    assert_eq!(body["data"]["user"]["is_alumni"], true);
}

#[actix_rt::test]
#[serial]
async fn test_register_rejects_duplicates_and_short_passwords() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let duplicate = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("X-Forwarded-For", "203.0.113.12"))
        .set_json(json!({
            "name": "Another Asha",
            "email": "ASHA@test.edu",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, duplicate).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User already exists with this email");

    let short = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("X-Forwarded-For", "203.0.113.13"))
        .set_json(json!({
            "name": "Ravi Menon",
            "email": "ravi@test.edu",
            "password": "abc"
        }))
        .to_request();
    let resp = test::call_service(&app, short).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[actix_rt::test]
#[serial]
async fn test_login_accepts_valid_and_rejects_invalid_credentials() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("X-Forwarded-For", "203.0.113.14"))
        .set_json(json!({"email": "asha@test.edu", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, login).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert!(!body["data"]["token"].as_str().expect("Token missing").is_empty());
    assert_eq!(body["data"]["user"]["id"], user.id);

    // Wrong password and unknown account are indistinguishable.
    let wrong = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("X-Forwarded-For", "203.0.113.14"))
        .set_json(json!({"email": "asha@test.edu", "password": "nope123"}))
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid credentials");

    let unknown = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("X-Forwarded-For", "203.0.113.14"))
        .set_json(json!({"email": "ghost@test.edu", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, unknown).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[actix_rt::test]
#[serial]
async fn test_me_requires_token() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let bare = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, bare).await;
    assert_eq!(resp.status(), 401);

    // Garbage tokens resolve as guests, not as errors.
    let garbage = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, garbage).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_profile_update_round_trips() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");
    let token = bearer_for(&db, user.id).await.expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let update = test::TestRequest::put()
        .uri("/api/users/profile")
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({
            "current_company": "Google",
            "is_alumni": true,
            "profile": {"bio": "SDE at Google", "github": "asharao"}
        }))
        .to_request();
    let resp = test::call_service(&app, update).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["current_company"], "Google");
    assert_eq!(body["data"]["is_alumni"], true);
    assert_eq!(body["data"]["profile"]["bio"], "SDE at Google");

    let view = test::TestRequest::get()
        .uri("/api/users/profile")
        .insert_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, view).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["profile"]["github"], "asharao");
    // Untouched fields survive the partial update.
    assert_eq!(body["data"]["name"], "Asha Rao");
}

#[actix_rt::test]
#[serial]
async fn test_member_page_shows_only_approved_experiences() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");
    create_test_experience(&db, Some(user.id), "Google", "SDE", ModerationStatus::Approved)
        .await
        .expect("Failed to create experience");
    create_test_experience(&db, Some(user.id), "Amazon", "SDE", ModerationStatus::Pending)
        .await
        .expect("Failed to create experience");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/users/asha_rao").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["username"], "asha_rao");
    // Member pages carry no email.
    assert!(body["data"]["user"].get("email").is_none());
    let listed = body["data"]["experiences"]
        .as_array()
        .expect("Experiences missing");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["company"], "Google");

    let missing = test::TestRequest::get().uri("/api/users/nobody").to_request();
    let resp = test::call_service(&app, missing).await;
    assert_eq!(resp.status(), 404);
}
