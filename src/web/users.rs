//! Member profile routes

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::middleware::ClientCtx;
use crate::orm::experiences;
use crate::orm::experiences::{ModerationStatus, OfferStatus};
use crate::orm::users;
use crate::user::{self, ProfileDetailsUpdate, ProfileUpdate, PublicUserView, UserView};
use actix_web::{get, put, web, HttpResponse};
use chrono::NaiveDateTime;
use sea_orm::{entity::*, query::*};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // The static /profile routes must register before the {username} catch.
    conf.service(view_profile)
        .service(update_profile)
        .service(view_member);
}

/// GET /api/users/profile - Own account
#[get("/api/users/profile")]
pub async fn view_profile(client: ClientCtx) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;

    let user = users::Entity::find_by_id(user_id)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| OpError::unauthorized("Session user no longer exists"))?;

    Ok(super::ok(UserView::from(user)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfilePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_company: Option<String>,
    pub is_alumni: Option<bool>,
    pub profile: Option<ProfileDetailsPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileDetailsPayload {
    #[validate(length(max = 500, message = "Bio must be less than 500 characters"))]
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// PUT /api/users/profile - Partial update of own account
#[put("/api/users/profile")]
pub async fn update_profile(
    client: ClientCtx,
    payload: web::Json<ProfilePayload>,
) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;

    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;
    if let Some(profile) = &payload.profile {
        profile
            .validate()
            .map_err(|e| OpError::validation(e.to_string()))?;
    }

    let updated = user::update_profile(
        get_db_pool(),
        user_id,
        ProfileUpdate {
            name: payload.name,
            branch: payload.branch,
            graduation_year: payload.graduation_year,
            current_company: payload.current_company,
            is_alumni: payload.is_alumni,
            details: payload.profile.map(|p| ProfileDetailsUpdate {
                bio: p.bio,
                linkedin: p.linkedin,
                github: p.github,
            }),
        },
    )
    .await?;

    Ok(super::ok(UserView::from(updated)))
}

#[derive(Debug, Serialize)]
struct MemberExperience {
    id: i32,
    company: String,
    role: String,
    branch: String,
    year: i32,
    offer_status: OfferStatus,
    package: Option<String>,
    views: i32,
    created_at: NaiveDateTime,
}

/// GET /api/users/{username} - Public member page with their approved
/// experiences
#[get("/api/users/{username}")]
pub async fn view_member(path: web::Path<String>) -> Result<HttpResponse, OpError> {
    let username = path.into_inner();
    let db = get_db_pool();

    let member = user::find_by_username(db, &username)
        .await?
        .ok_or_else(|| OpError::not_found("User not found"))?;

    let member_experiences: Vec<MemberExperience> = experiences::Entity::find()
        .filter(experiences::Column::AuthorId.eq(member.id))
        .filter(experiences::Column::ModerationStatus.eq(ModerationStatus::Approved))
        .order_by_desc(experiences::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(|e| MemberExperience {
            id: e.id,
            company: e.company,
            role: e.role,
            branch: e.branch,
            year: e.year,
            offer_status: e.offer_status,
            package: e.package,
            views: e.views,
            created_at: e.created_at,
        })
        .collect();

    Ok(super::ok(json!({
        "user": PublicUserView::from(member),
        "experiences": member_experiences,
    })))
}
