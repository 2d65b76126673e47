//! Integration tests for the staff and admin surface

mod common;
use serial_test::serial;

use actix_web::{test, App};
use common::{database::*, fixtures::*};
use placementhub::experiences;
use placementhub::middleware::ClientCtx;
use placementhub::orm::experiences::ModerationStatus;
use placementhub::orm::reports::ReportReason;
use placementhub::orm::users::Role;
use serde_json::{json, Value};

#[actix_rt::test]
#[serial]
async fn test_pending_queue_requires_staff() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");
    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    create_test_experience(&db, Some(student.id), "Google", "SDE", ModerationStatus::Pending)
        .await
        .expect("Failed to create experience");

    let student_token = bearer_for(&db, student.id).await.expect("Failed to login");
    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let as_student = test::TestRequest::get()
        .uri("/api/admin/experiences/pending")
        .insert_header(("Authorization", student_token))
        .to_request();
    let resp = test::call_service(&app, as_student).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Staff access required");

    let as_staff = test::TestRequest::get()
        .uri("/api/admin/experiences/pending")
        .insert_header(("Authorization", staff_token))
        .to_request();
    let resp = test::call_service(&app, as_staff).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["company"], "Google");
    assert_eq!(body["data"][0]["moderation_status"], "pending");
    // The submitter's account is attached for the review screen.
    assert_eq!(body["data"][0]["author"]["email"], "asha@test.edu");
}

#[actix_rt::test]
#[serial]
async fn test_approve_and_reject_over_http() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");
    let first = create_test_experience(&db, None, "Google", "SDE", ModerationStatus::Pending)
        .await
        .expect("Failed to create experience");
    let second = create_test_experience(&db, None, "Amazon", "SDE", ModerationStatus::Pending)
        .await
        .expect("Failed to create experience");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    // Approval works without a body.
    let approve = test::TestRequest::put()
        .uri(&format!("/api/admin/experiences/{}/approve", first.id))
        .insert_header(("Authorization", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, approve).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["moderation_status"], "approved");
    assert_eq!(body["data"]["moderated_by"], coordinator.id);

    let reject = test::TestRequest::put()
        .uri(&format!("/api/admin/experiences/{}/reject", second.id))
        .insert_header(("Authorization", staff_token.clone()))
        .set_json(json!({"notes": "Reads like an ad"}))
        .to_request();
    let resp = test::call_service(&app, reject).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["moderation_status"], "rejected");
    assert_eq!(body["data"]["moderation_notes"], "Reads like an ad");

    // Status filter on the corpus listing.
    let approved = test::TestRequest::get()
        .uri("/api/admin/experiences?status=approved")
        .insert_header(("Authorization", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, approved).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["company"], "Google");
    assert_eq!(body["data"][0]["moderator"]["name"], "Meera Iyer");

    // Unknown filter values match nothing.
    let bogus = test::TestRequest::get()
        .uri("/api/admin/experiences?status=bogus")
        .insert_header(("Authorization", staff_token))
        .to_request();
    let resp = test::call_service(&app, bogus).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 0);
}

#[actix_rt::test]
#[serial]
async fn test_reset_moderation_is_admin_only() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    let admin = create_role_user(&db, "Dean Kapoor", "dean@test.edu", "password123", Role::Admin)
        .await
        .expect("Failed to create user");
    create_test_experience(&db, None, "Google", "SDE", ModerationStatus::Approved)
        .await
        .expect("Failed to create experience");

    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");
    let admin_token = bearer_for(&db, admin.id).await.expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let as_staff = test::TestRequest::post()
        .uri("/api/admin/experiences/reset-moderation")
        .insert_header(("Authorization", staff_token))
        .to_request();
    let resp = test::call_service(&app, as_staff).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Admin access required");

    let as_admin = test::TestRequest::post()
        .uri("/api/admin/experiences/reset-moderation")
        .insert_header(("Authorization", admin_token))
        .to_request();
    let resp = test::call_service(&app, as_admin).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["modified"], 1);
    assert_eq!(body["message"], "Reset 1 experiences to pending status");
}

#[actix_rt::test]
#[serial]
async fn test_report_review_lifecycle() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");
    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    let experience = create_test_experience(&db, None, "Google", "SDE", ModerationStatus::Approved)
        .await
        .expect("Failed to create experience");
    let report = experiences::file_report(
        &db,
        experience.id,
        Some(student.id),
        ReportReason::Spam,
        Some("Copied from a blog".to_owned()),
    )
    .await
    .expect("Failed to file report");

    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let list = test::TestRequest::get()
        .uri("/api/admin/reports?status=pending")
        .insert_header(("Authorization", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, list).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["reason"], "spam");
    assert_eq!(body["data"][0]["experience"]["company"], "Google");
    assert_eq!(body["data"][0]["reporter"]["name"], "Asha Rao");

    let review = test::TestRequest::put()
        .uri(&format!("/api/admin/reports/{}/review", report.id))
        .insert_header(("Authorization", staff_token.clone()))
        .set_json(json!({"status": "resolved", "admin_notes": "Original author confirmed"}))
        .to_request();
    let resp = test::call_service(&app, review).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "resolved");
    assert_eq!(body["data"]["admin_notes"], "Original author confirmed");
    assert_eq!(body["data"]["reviewed_by"], coordinator.id);

    // Resolved reports drop out of the pending filter.
    let pending = test::TestRequest::get()
        .uri("/api/admin/reports?status=pending")
        .insert_header(("Authorization", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, pending).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 0);

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/admin/reports/{}", report.id))
        .insert_header(("Authorization", staff_token.clone()))
        .to_request();
    let resp = test::call_service(&app, delete).await;
    assert!(resp.status().is_success());

    let repeat = test::TestRequest::delete()
        .uri(&format!("/api/admin/reports/{}", report.id))
        .insert_header(("Authorization", staff_token))
        .to_request();
    let resp = test::call_service(&app, repeat).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_stats_counts() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    create_test_experience(&db, None, "Google", "SDE", ModerationStatus::Pending)
        .await
        .expect("Failed to create experience");
    let approved = create_test_experience(&db, None, "Amazon", "SDE", ModerationStatus::Approved)
        .await
        .expect("Failed to create experience");
    experiences::file_report(&db, approved.id, None, ReportReason::Other, None)
        .await
        .expect("Failed to file report");
    create_test_announcement(&db, coordinator.id, "Open house", true, None)
        .await
        .expect("Failed to create announcement");
    create_test_announcement(&db, coordinator.id, "Draft", false, None)
        .await
        .expect("Failed to create announcement");

    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/admin/stats")
        .insert_header(("Authorization", staff_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["experiences"]["pending"], 1);
    assert_eq!(body["data"]["experiences"]["total"], 2);
    assert_eq!(body["data"]["reports"]["pending"], 1);
    assert_eq!(body["data"]["reports"]["total"], 1);
    assert_eq!(body["data"]["announcements"]["active"], 1);
    assert_eq!(body["data"]["announcements"]["total"], 2);
}

#[actix_rt::test]
#[serial]
async fn test_user_directory_is_admin_only() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_user(&db, "Asha Rao", "asha@test.edu", "password123")
        .await
        .expect("Failed to create user");
    let coordinator = create_role_user(
        &db,
        "Meera Iyer",
        "meera@test.edu",
        "password123",
        Role::Coordinator,
    )
    .await
    .expect("Failed to create user");
    let admin = create_role_user(&db, "Dean Kapoor", "dean@test.edu", "password123", Role::Admin)
        .await
        .expect("Failed to create user");

    let student_token = bearer_for(&db, student.id).await.expect("Failed to login");
    let staff_token = bearer_for(&db, coordinator.id)
        .await
        .expect("Failed to login");
    let admin_token = bearer_for(&db, admin.id).await.expect("Failed to login");

    let app = test::init_service(
        App::new()
            .wrap(ClientCtx::default())
            .configure(placementhub::web::configure),
    )
    .await;

    for token in [&student_token, &staff_token] {
        let req = test::TestRequest::get()
            .uri("/api/admin/users")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    let all = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", admin_token.clone()))
        .to_request();
    let resp = test::call_service(&app, all).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 3);

    let students_only = test::TestRequest::get()
        .uri("/api/admin/users?role=student")
        .insert_header(("Authorization", admin_token.clone()))
        .to_request();
    let resp = test::call_service(&app, students_only).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Asha Rao");

    let searched = test::TestRequest::get()
        .uri("/api/admin/users?search=meera")
        .insert_header(("Authorization", admin_token.clone()))
        .to_request();
    let resp = test::call_service(&app, searched).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["email"], "meera@test.edu");

    let filters = test::TestRequest::get()
        .uri("/api/admin/users/filters")
        .insert_header(("Authorization", admin_token))
        .to_request();
    let resp = test::call_service(&app, filters).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["branches"], json!(["CSE"]));
    assert_eq!(body["data"]["graduation_years"], json!([2024]));
    let roles = body["data"]["roles"].as_array().expect("Roles missing");
    assert_eq!(roles.len(), 3);
}
