//! Staff and admin surface
//!
//! Everything under /api/admin. Moderation, company curation, reports,
//! announcements and the stats card require a staff role; the user directory
//! and the moderation reset are admin only.

use crate::companies;
use crate::db::get_db_pool;
use crate::error::OpError;
use crate::experiences::{attach_rounds, ExperienceData};
use crate::middleware::ClientCtx;
use crate::moderation;
use crate::orm::announcements::{self, AnnouncementPriority, AnnouncementType};
use crate::orm::experiences as experience_orm;
use crate::orm::experiences::ModerationStatus;
use crate::orm::reports::{self, ReportStatus};
use crate::orm::users;
use crate::user::UserView;
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Static segments must register before the {id} catches.
    conf.service(pending_queue)
        .service(reset_moderation)
        .service(list_experiences)
        .service(approve_experience)
        .service(reject_experience)
        .service(edit_experience)
        .service(delete_experience)
        .service(company_usage)
        .service(standardize_company)
        .service(list_company_standards)
        .service(create_company_standard)
        .service(update_company_standard)
        .service(delete_company_standard)
        .service(list_reports)
        .service(review_report)
        .service(delete_report)
        .service(list_announcements)
        .service(create_announcement)
        .service(update_announcement)
        .service(delete_announcement)
        .service(view_stats)
        .service(user_filters)
        .service(list_users);
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorRef {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
}

/// Experience row as the moderation screens see it: rounds plus the linked
/// author and moderator accounts.
#[derive(Debug, Serialize)]
pub struct AdminExperience {
    #[serde(flatten)]
    pub experience: ExperienceData,
    pub author: Option<AuthorRef>,
    pub moderator: Option<UserRef>,
}

async fn admin_views(
    db: &DatabaseConnection,
    models: Vec<experience_orm::Model>,
) -> Result<Vec<AdminExperience>, OpError> {
    let mut user_ids: Vec<i32> = Vec::new();
    for model in &models {
        if let Some(id) = model.author_id {
            user_ids.push(id);
        }
        if let Some(id) = model.moderated_by {
            user_ids.push(id);
        }
    }
    let accounts: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(attach_rounds(db, models)
        .await?
        .into_iter()
        .map(|data| {
            let author = data
                .experience
                .author_id
                .and_then(|id| accounts.get(&id))
                .map(|u| AuthorRef {
                    id: u.id,
                    name: u.name.clone(),
                    username: u.username.clone(),
                    email: u.email.clone(),
                });
            let moderator = data
                .experience
                .moderated_by
                .and_then(|id| accounts.get(&id))
                .map(|u| UserRef {
                    id: u.id,
                    name: u.name.clone(),
                    username: u.username.clone(),
                });
            AdminExperience {
                experience: data,
                author,
                moderator,
            }
        })
        .collect())
}

/// GET /api/admin/experiences/pending - The moderation queue
#[get("/api/admin/experiences/pending")]
pub async fn pending_queue(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let models = moderation::pending(db).await?;
    let results = admin_views(db, models).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// GET /api/admin/experiences - Whole corpus, optionally by moderation status
#[get("/api/admin/experiences")]
pub async fn list_experiences(
    client: ClientCtx,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let models = match query.status.as_deref() {
        None | Some("") | Some("all") => moderation::find_by_status(db, None).await?,
        Some(value) => match ModerationStatus::from_query(value) {
            Some(status) => moderation::find_by_status(db, Some(status)).await?,
            // An unrecognized status matches nothing rather than erroring.
            None => Vec::new(),
        },
    };

    let results = admin_views(db, models).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Default, Deserialize)]
pub struct ModerationPayload {
    pub notes: Option<String>,
}

/// PUT /api/admin/experiences/{id}/approve
#[put("/api/admin/experiences/{id}/approve")]
pub async fn approve_experience(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: Option<web::Json<ModerationPayload>>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let notes = payload.and_then(|p| p.into_inner().notes);
    let updated = moderation::approve(get_db_pool(), path.into_inner(), staff.id, notes).await?;
    Ok(super::ok(updated))
}

/// PUT /api/admin/experiences/{id}/reject
#[put("/api/admin/experiences/{id}/reject")]
pub async fn reject_experience(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: Option<web::Json<ModerationPayload>>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let notes = payload.and_then(|p| p.into_inner().notes);
    let updated = moderation::reject(get_db_pool(), path.into_inner(), staff.id, notes).await?;
    Ok(super::ok(updated))
}

/// PUT /api/admin/experiences/{id} - Staff edit, no ownership requirement
#[put("/api/admin/experiences/{id}")]
pub async fn edit_experience(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<super::experiences::ExperienceUpdatePayload>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;

    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let data = crate::experiences::update(
        get_db_pool(),
        path.into_inner(),
        super::experiences::to_update(payload),
    )
    .await?;
    Ok(super::ok(data))
}

/// DELETE /api/admin/experiences/{id}
#[delete("/api/admin/experiences/{id}")]
pub async fn delete_experience(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    crate::experiences::delete(get_db_pool(), path.into_inner()).await?;
    Ok(super::ok_message("Experience deleted"))
}

/// POST /api/admin/experiences/reset-moderation - Send everything back to
/// the queue. Admin only; there is no undo.
#[post("/api/admin/experiences/reset-moderation")]
pub async fn reset_moderation(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_admin()?;
    let modified = moderation::reset_all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Reset {} experiences to pending status", modified),
        "modified": modified,
    })))
}

/// GET /api/admin/companies/all - Every company name in use with its count
#[get("/api/admin/companies/all")]
pub async fn company_usage(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let results = companies::list_company_counts(get_db_pool()).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize)]
pub struct StandardizePayload {
    pub experience_id: Option<i32>,
    pub standard_name: Option<String>,
}

/// POST /api/admin/companies/standardize - Rewrite one experience's company
/// to a canonical name
#[post("/api/admin/companies/standardize")]
pub async fn standardize_company(
    client: ClientCtx,
    payload: web::Json<StandardizePayload>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let payload = payload.into_inner();

    let (experience_id, standard_name) = match (payload.experience_id, payload.standard_name) {
        (Some(id), Some(name)) if !name.trim().is_empty() => (id, name),
        _ => {
            return Err(OpError::validation(
                "Experience id and standard name are required",
            ))
        }
    };

    let updated =
        companies::standardize_experience(get_db_pool(), experience_id, &standard_name).await?;
    Ok(super::ok(updated))
}

/// GET /api/admin/companies - The standardization catalog
#[get("/api/admin/companies")]
pub async fn list_company_standards(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let results = companies::list_standards(get_db_pool()).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize)]
pub struct StandardPayload {
    pub standard_name: String,
    #[serde(default)]
    pub variations: Vec<String>,
}

/// POST /api/admin/companies - Add a catalog entry
#[post("/api/admin/companies")]
pub async fn create_company_standard(
    client: ClientCtx,
    payload: web::Json<StandardPayload>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let payload = payload.into_inner();

    let standard = companies::create_standard(
        get_db_pool(),
        &payload.standard_name,
        payload.variations,
        staff.id,
    )
    .await?;
    Ok(super::created(standard))
}

#[derive(Debug, Deserialize)]
pub struct StandardUpdatePayload {
    pub standard_name: Option<String>,
    pub variations: Option<Vec<String>>,
}

/// PUT /api/admin/companies/{id}
#[put("/api/admin/companies/{id}")]
pub async fn update_company_standard(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<StandardUpdatePayload>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let payload = payload.into_inner();

    let standard = companies::update_standard(
        get_db_pool(),
        path.into_inner(),
        payload.standard_name,
        payload.variations,
        staff.id,
    )
    .await?;
    Ok(super::ok(standard))
}

/// DELETE /api/admin/companies/{id}
#[delete("/api/admin/companies/{id}")]
pub async fn delete_company_standard(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    companies::delete_standard(get_db_pool(), path.into_inner()).await?;
    Ok(super::ok_message("Company standardization deleted"))
}

/// Experience fields the report screen shows without a second request.
#[derive(Debug, Serialize)]
pub struct ReportedExperience {
    pub id: i32,
    pub company: String,
    pub role: String,
    pub author_name: String,
    pub branch: String,
    pub year: i32,
    pub package: Option<String>,
    pub offer_status: experience_orm::OfferStatus,
    pub views: i32,
    pub created_at: NaiveDateTime,
    pub moderation_status: ModerationStatus,
}

#[derive(Debug, Serialize)]
pub struct AdminReport {
    #[serde(flatten)]
    pub report: reports::Model,
    pub experience: Option<ReportedExperience>,
    pub reporter: Option<AuthorRef>,
    pub reviewer: Option<UserRef>,
}

/// GET /api/admin/reports - Reports with the flagged experience attached
#[get("/api/admin/reports")]
pub async fn list_reports(
    client: ClientCtx,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let mut find = reports::Entity::find();
    match query.status.as_deref() {
        None | Some("") | Some("all") => {}
        Some(value) => match ReportStatus::from_query(value) {
            Some(status) => find = find.filter(reports::Column::Status.eq(status)),
            None => {
                return Ok(super::ok_with_count(Vec::<AdminReport>::new(), 0));
            }
        },
    }
    let rows = find
        .order_by_desc(reports::Column::CreatedAt)
        .all(db)
        .await?;

    let experience_ids: Vec<i32> = rows.iter().map(|r| r.experience_id).collect();
    let experiences: HashMap<i32, experience_orm::Model> = experience_orm::Entity::find()
        .filter(experience_orm::Column::Id.is_in(experience_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let mut user_ids: Vec<i32> = Vec::new();
    for report in &rows {
        if let Some(id) = report.reported_by {
            user_ids.push(id);
        }
        if let Some(id) = report.reviewed_by {
            user_ids.push(id);
        }
    }
    let accounts: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let results: Vec<AdminReport> = rows
        .into_iter()
        .map(|report| {
            let experience = experiences
                .get(&report.experience_id)
                .map(|e| ReportedExperience {
                    id: e.id,
                    company: e.company.clone(),
                    role: e.role.clone(),
                    author_name: e.author_name.clone(),
                    branch: e.branch.clone(),
                    year: e.year,
                    package: e.package.clone(),
                    offer_status: e.offer_status.clone(),
                    views: e.views,
                    created_at: e.created_at,
                    moderation_status: e.moderation_status.clone(),
                });
            let reporter = report
                .reported_by
                .and_then(|id| accounts.get(&id))
                .map(|u| AuthorRef {
                    id: u.id,
                    name: u.name.clone(),
                    username: u.username.clone(),
                    email: u.email.clone(),
                });
            let reviewer = report
                .reviewed_by
                .and_then(|id| accounts.get(&id))
                .map(|u| UserRef {
                    id: u.id,
                    name: u.name.clone(),
                    username: u.username.clone(),
                });
            AdminReport {
                report,
                experience,
                reporter,
                reviewer,
            }
        })
        .collect();

    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub status: Option<ReportStatus>,
    pub admin_notes: Option<String>,
}

/// PUT /api/admin/reports/{id}/review - Record the moderation outcome
#[put("/api/admin/reports/{id}/review")]
pub async fn review_report(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let db = get_db_pool();

    let report = reports::Entity::find_by_id(path.into_inner())
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Report not found"))?;

    let payload = payload.into_inner();
    let now = Utc::now().naive_utc();
    let mut active: reports::ActiveModel = report.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(notes) = payload.admin_notes {
        active.admin_notes = Set(Some(notes));
    }
    active.reviewed_by = Set(Some(staff.id));
    active.reviewed_at = Set(Some(now));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    Ok(super::ok(updated))
}

/// DELETE /api/admin/reports/{id}
#[delete("/api/admin/reports/{id}")]
pub async fn delete_report(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;

    let result = reports::Entity::delete_by_id(path.into_inner())
        .exec(get_db_pool())
        .await?;
    if result.rows_affected == 0 {
        return Err(OpError::not_found("Report not found"));
    }
    Ok(super::ok_message("Report deleted"))
}

/// GET /api/admin/announcements - All announcements, active or not
#[get("/api/admin/announcements")]
pub async fn list_announcements(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let rows = announcements::Entity::find()
        .order_by_desc(announcements::Column::CreatedAt)
        .all(db)
        .await?;

    let publisher_ids: Vec<i32> = rows.iter().map(|a| a.published_by).collect();
    let publishers: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(publisher_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let results: Vec<super::announcements::AnnouncementView> = rows
        .into_iter()
        .map(|announcement| {
            let publisher = publishers.get(&announcement.published_by).map(|u| {
                super::announcements::PublisherRef {
                    id: u.id,
                    name: u.name.clone(),
                    username: u.username.clone(),
                }
            });
            super::announcements::AnnouncementView {
                announcement,
                publisher,
            }
        })
        .collect();

    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementPayload {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Content must be at most 2000 characters"))]
    pub content: String,
    #[serde(default, rename = "type")]
    pub type_: AnnouncementType,
    #[serde(default)]
    pub priority: AnnouncementPriority,
    pub is_active: Option<bool>,
    pub expires_at: Option<NaiveDateTime>,
}

/// POST /api/admin/announcements
#[post("/api/admin/announcements")]
pub async fn create_announcement(
    client: ClientCtx,
    payload: web::Json<AnnouncementPayload>,
) -> Result<HttpResponse, OpError> {
    let staff = client.require_staff()?;
    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let title = payload.title.trim().to_owned();
    if title.is_empty() {
        return Err(OpError::validation("Title is required"));
    }
    let content = payload.content.trim().to_owned();
    if content.is_empty() {
        return Err(OpError::validation("Content is required"));
    }

    let now = Utc::now().naive_utc();
    let announcement = announcements::ActiveModel {
        title: Set(title),
        content: Set(content),
        type_: Set(payload.type_),
        priority: Set(payload.priority),
        is_active: Set(payload.is_active.unwrap_or(true)),
        published_by: Set(staff.id),
        published_at: Set(now),
        expires_at: Set(payload.expires_at),
        views: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    log::info!(
        "Announcement {} published by user {}",
        announcement.id,
        staff.id
    );
    Ok(super::created(announcement))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementUpdatePayload {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Content must be at most 2000 characters"))]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<AnnouncementType>,
    pub priority: Option<AnnouncementPriority>,
    pub is_active: Option<bool>,
    pub expires_at: Option<NaiveDateTime>,
}

/// PUT /api/admin/announcements/{id}
#[put("/api/admin/announcements/{id}")]
pub async fn update_announcement(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<AnnouncementUpdatePayload>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let announcement = announcements::Entity::find_by_id(path.into_inner())
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Announcement not found"))?;

    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let mut active: announcements::ActiveModel = announcement.into();
    if let Some(title) = payload.title {
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(OpError::validation("Title is required"));
        }
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        let content = content.trim().to_owned();
        if content.is_empty() {
            return Err(OpError::validation("Content is required"));
        }
        active.content = Set(content);
    }
    if let Some(type_) = payload.type_ {
        active.type_ = Set(type_);
    }
    if let Some(priority) = payload.priority {
        active.priority = Set(priority);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(Some(expires_at));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(db).await?;
    Ok(super::ok(updated))
}

/// DELETE /api/admin/announcements/{id}
#[delete("/api/admin/announcements/{id}")]
pub async fn delete_announcement(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, OpError> {
    client.require_staff()?;

    let result = announcements::Entity::delete_by_id(path.into_inner())
        .exec(get_db_pool())
        .await?;
    if result.rows_affected == 0 {
        return Err(OpError::not_found("Announcement not found"));
    }
    Ok(super::ok_message("Announcement deleted"))
}

/// GET /api/admin/stats - Counters for the dashboard cards
#[get("/api/admin/stats")]
pub async fn view_stats(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_staff()?;
    let db = get_db_pool();

    let (
        pending_experiences,
        total_experiences,
        pending_reports,
        total_reports,
        active_announcements,
        total_announcements,
    ) = futures::join!(
        moderation::count_by_status(db, ModerationStatus::Pending),
        experience_orm::Entity::find().count(db),
        reports::Entity::find()
            .filter(reports::Column::Status.eq(ReportStatus::Pending))
            .count(db),
        reports::Entity::find().count(db),
        announcements::Entity::find()
            .filter(announcements::Column::IsActive.eq(true))
            .count(db),
        announcements::Entity::find().count(db),
    );

    Ok(super::ok(json!({
        "experiences": { "pending": pending_experiences?, "total": total_experiences? },
        "reports": { "pending": pending_reports?, "total": total_reports? },
        "announcements": { "active": active_announcements?, "total": total_announcements? },
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub role: Option<String>,
    pub search: Option<String>,
}

/// GET /api/admin/users - The user directory. Admin only.
#[get("/api/admin/users")]
pub async fn list_users(
    client: ClientCtx,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, OpError> {
    client.require_admin()?;
    let query = query.into_inner();

    let mut find = users::Entity::find();
    if let Some(branch) = query
        .branch
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        find = find.filter(
            Expr::expr(Func::lower(Expr::col(users::Column::Branch)))
                .like(format!("%{}%", branch.to_lowercase())),
        );
    }
    if let Some(year) = query.graduation_year {
        find = find.filter(users::Column::GraduationYear.eq(year));
    }
    if let Some(role) = query.role.as_deref().filter(|r| !r.is_empty()) {
        match users::Role::from_query(role) {
            Some(role) => find = find.filter(users::Column::Role.eq(role)),
            None => return Ok(super::ok_with_count(Vec::<UserView>::new(), 0)),
        }
    }

    let rows = find
        .order_by_desc(users::Column::CreatedAt)
        .all(get_db_pool())
        .await?;

    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let results: Vec<UserView> = rows
        .into_iter()
        .filter(|u| match &needle {
            Some(needle) => {
                u.name.to_lowercase().contains(needle)
                    || u.email.to_lowercase().contains(needle)
                    || u.username
                        .as_deref()
                        .map(|name| name.to_lowercase().contains(needle))
                        .unwrap_or(false)
            }
            None => true,
        })
        .map(UserView::from)
        .collect();

    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

/// GET /api/admin/users/filters - Distinct values for the directory
/// dropdowns. Admin only.
#[get("/api/admin/users/filters")]
pub async fn user_filters(client: ClientCtx) -> Result<HttpResponse, OpError> {
    client.require_admin()?;
    let db = get_db_pool();

    let branches: Vec<Option<String>> = users::Entity::find()
        .select_only()
        .column(users::Column::Branch)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    let mut branches: Vec<String> = branches
        .into_iter()
        .flatten()
        .filter(|b| !b.is_empty())
        .collect();
    branches.sort();

    let years: Vec<Option<i32>> = users::Entity::find()
        .select_only()
        .column(users::Column::GraduationYear)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    let mut years: Vec<i32> = years.into_iter().flatten().collect();
    years.sort_unstable_by(|a, b| b.cmp(a));

    let mut roles: Vec<String> = users::Entity::find()
        .select_only()
        .column(users::Column::Role)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    roles.sort();

    Ok(super::ok(json!({
        "branches": branches,
        "graduation_years": years,
        "roles": roles,
    })))
}
