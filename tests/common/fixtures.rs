//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::{NaiveDateTime, Utc};
use placementhub::orm::announcements::{AnnouncementPriority, AnnouncementType};
use placementhub::orm::experiences::{ModerationStatus, OfferStatus};
use placementhub::orm::users::Role;
use placementhub::orm::{announcements, experience_rounds, experiences, round_questions};
use placementhub::user::{insert_new_user, NewUser};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Test user fixture
pub struct TestUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String, // Plain text password for testing
}

/// Create a student account with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, DbErr> {
    create_role_user(db, name, email, password, Role::Student).await
}

/// Create an account with a specific role and known credentials
pub async fn create_role_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<TestUser, DbErr> {
    let user = insert_new_user(
        db,
        NewUser {
            name: name.to_owned(),
            username: Some(name.to_lowercase().replace(' ', "_")),
            email: email.to_owned(),
            password: password.to_owned(),
            role,
            branch: Some("CSE".to_owned()),
            graduation_year: Some(2024),
            is_alumni: false,
        },
    )
    .await?;

    Ok(TestUser {
        id: user.id,
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

/// Issue a session and return the Authorization header value for it.
pub async fn bearer_for(db: &DatabaseConnection, user_id: i32) -> Result<String, DbErr> {
    let session = placementhub::session::create_session(db, user_id).await?;
    Ok(format!("Bearer {}", session.id))
}

/// Insert an experience directly, bypassing the submission route.
pub async fn create_test_experience(
    db: &DatabaseConnection,
    author_id: Option<i32>,
    company: &str,
    role: &str,
    status: ModerationStatus,
) -> Result<experiences::Model, DbErr> {
    let now = Utc::now().naive_utc();
    experiences::ActiveModel {
        company: Set(company.to_owned()),
        role: Set(role.to_owned()),
        branch: Set("CSE".to_owned()),
        year: Set(2024),
        offer_status: Set(OfferStatus::Selected),
        author_id: Set(author_id),
        author_name: Set(match author_id {
            Some(_) => "Known Author".to_owned(),
            None => "Anonymous".to_owned(),
        }),
        views: Set(0),
        helpful: Set(0),
        moderation_status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Approved experience with a package figure, for insights tests.
pub async fn create_experience_with_package(
    db: &DatabaseConnection,
    company: &str,
    role: &str,
    package: &str,
    year: i32,
) -> Result<experiences::Model, DbErr> {
    let now = Utc::now().naive_utc();
    experiences::ActiveModel {
        company: Set(company.to_owned()),
        role: Set(role.to_owned()),
        branch: Set("CSE".to_owned()),
        year: Set(year),
        package: Set(Some(package.to_owned())),
        offer_status: Set(OfferStatus::Selected),
        author_id: Set(None),
        author_name: Set("Anonymous".to_owned()),
        views: Set(0),
        helpful: Set(0),
        moderation_status: Set(ModerationStatus::Approved),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Attach an interview round with its questions to an experience.
pub async fn add_round(
    db: &DatabaseConnection,
    experience_id: i32,
    round_number: i32,
    round_name: &str,
    questions: &[&str],
) -> Result<experience_rounds::Model, DbErr> {
    let round = experience_rounds::ActiveModel {
        experience_id: Set(experience_id),
        round_number: Set(round_number),
        round_name: Set(round_name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (position, content) in questions.iter().enumerate() {
        round_questions::ActiveModel {
            round_id: Set(round.id),
            position: Set(position as i32),
            content: Set((*content).to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(round)
}

/// Insert an announcement directly, bypassing the admin route.
pub async fn create_test_announcement(
    db: &DatabaseConnection,
    published_by: i32,
    title: &str,
    is_active: bool,
    expires_at: Option<NaiveDateTime>,
) -> Result<announcements::Model, DbErr> {
    let now = Utc::now().naive_utc();
    announcements::ActiveModel {
        title: Set(title.to_owned()),
        content: Set("Details inside".to_owned()),
        type_: Set(AnnouncementType::General),
        priority: Set(AnnouncementPriority::Medium),
        is_active: Set(is_active),
        published_by: Set(published_by),
        published_at: Set(now),
        expires_at: Set(expires_at),
        views: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}
