//! Public experience routes: listing, detail, submission, feedback, reports
//!
//! Listing shows approved experiences only. Detail does not second-guess a
//! direct link, so a shared URL keeps working while a submission is still in
//! the queue.

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::experiences;
use crate::experiences::{ExperienceFilter, ExperienceUpdate, NewExperience, NewRound};
use crate::ip::extract_client_ip;
use crate::middleware::ClientCtx;
use crate::orm::experiences as experience_orm;
use crate::orm::experiences::OfferStatus;
use crate::orm::reports::ReportReason;
use crate::rate_limit;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::NaiveDateTime;
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_experiences)
        .service(submit_experience)
        .service(view_experience)
        .service(edit_experience)
        .service(delete_experience)
        .service(mark_helpful)
        .service(report_experience)
        .service(list_companies);
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_owned();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub company: Option<String>,
    pub role: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i32>,
}

/// GET /api/experiences - Approved experiences, filtered, newest first
#[get("/api/experiences")]
pub async fn list_experiences(query: web::Query<ListQuery>) -> Result<HttpResponse, OpError> {
    let query = query.into_inner();
    let filter = ExperienceFilter {
        company: non_empty(query.company),
        role: non_empty(query.role),
        branch: non_empty(query.branch),
        year: query.year,
    };

    let results = experiences::search_approved(get_db_pool(), &filter).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

#[derive(Debug, Deserialize)]
pub struct RoundPayload {
    pub round_number: i32,
    pub round_name: String,
    #[serde(default)]
    pub questions: Vec<String>,
    pub feedback: Option<String>,
}

pub(crate) fn payload_rounds(rounds: Vec<RoundPayload>) -> Vec<NewRound> {
    rounds
        .into_iter()
        .map(|r| NewRound {
            round_number: r.round_number,
            round_name: r.round_name,
            questions: r.questions,
            feedback: r.feedback,
        })
        .collect()
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExperiencePayload {
    #[validate(length(min = 1, max = 120))]
    pub company: String,
    #[validate(length(min = 1, max = 120))]
    pub role: String,
    #[validate(length(min = 1, max = 120))]
    pub branch: String,
    pub year: i32,
    pub rounds: Vec<RoundPayload>,
    pub package: Option<String>,
    pub tips: Option<String>,
    pub interview_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub offer_status: OfferStatus,
    /// Submit without linking the account even when logged in.
    #[serde(default)]
    pub anonymous: bool,
    pub author_name: Option<String>,
}

fn resolve_author(
    client: &ClientCtx,
    anonymous: bool,
    requested_name: Option<String>,
) -> (Option<i32>, String) {
    if anonymous {
        return (None, requested_name.unwrap_or_else(|| "Anonymous".to_owned()));
    }
    match client.get_user() {
        Some(profile) => (
            Some(profile.id),
            requested_name.unwrap_or_else(|| profile.name.clone()),
        ),
        None => (None, requested_name.unwrap_or_else(|| "Anonymous".to_owned())),
    }
}

/// POST /api/experiences - Submit into the moderation queue. Login is not
/// required; unauthenticated submissions are anonymous.
#[post("/api/experiences")]
pub async fn submit_experience(
    client: ClientCtx,
    payload: web::Json<ExperiencePayload>,
) -> Result<HttpResponse, OpError> {
    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let (author_id, author_name) =
        resolve_author(&client, payload.anonymous, payload.author_name.clone());

    let data = experiences::create(
        get_db_pool(),
        NewExperience {
            company: payload.company,
            role: payload.role,
            branch: payload.branch,
            year: payload.year,
            rounds: payload_rounds(payload.rounds),
            package: payload.package,
            tips: payload.tips,
            interview_date: payload.interview_date,
            offer_status: payload.offer_status,
            author_id,
            author_name,
        },
    )
    .await?;

    Ok(super::created(data))
}

/// GET /api/experiences/{id} - Full detail; every hit counts one view
#[get("/api/experiences/{id}")]
pub async fn view_experience(path: web::Path<i32>) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let db = get_db_pool();

    experiences::increment_views(db, experience_id).await?;
    let data = experiences::load_one(db, experience_id)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    Ok(super::ok(data))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExperienceUpdatePayload {
    #[validate(length(min = 1, max = 120))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub package: Option<String>,
    pub tips: Option<String>,
    pub interview_date: Option<NaiveDateTime>,
    pub offer_status: Option<OfferStatus>,
    pub rounds: Option<Vec<RoundPayload>>,
}

pub(crate) fn to_update(payload: ExperienceUpdatePayload) -> ExperienceUpdate {
    ExperienceUpdate {
        company: payload.company,
        role: payload.role,
        branch: payload.branch,
        year: payload.year,
        package: payload.package,
        tips: payload.tips,
        interview_date: payload.interview_date,
        offer_status: payload.offer_status,
        rounds: payload.rounds.map(payload_rounds),
    }
}

/// PUT /api/experiences/{id} - Author-only edit; staff edits go through the
/// admin surface
#[put("/api/experiences/{id}")]
pub async fn edit_experience(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<ExperienceUpdatePayload>,
) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let db = get_db_pool();

    let current = experience_orm::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;
    client.require_ownership(current.author_id)?;

    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let data = experiences::update(db, experience_id, to_update(payload)).await?;
    Ok(super::ok(data))
}

/// DELETE /api/experiences/{id} - Author or staff
#[delete("/api/experiences/{id}")]
pub async fn delete_experience(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    client.require_login()?;
    let db = get_db_pool();

    let current = experience_orm::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;
    if !client.can_modify(current.author_id) {
        return Err(OpError::forbidden(
            "Not authorized to delete this experience",
        ));
    }

    experiences::delete(db, experience_id).await?;
    Ok(super::ok_message("Experience deleted"))
}

/// POST /api/experiences/{id}/helpful - Anyone can say thanks
#[post("/api/experiences/{id}/helpful")]
pub async fn mark_helpful(path: web::Path<i32>) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let helpful = experiences::increment_helpful(get_db_pool(), experience_id).await?;
    Ok(super::ok(json!({ "helpful": helpful })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportPayload {
    pub reason: ReportReason,
    #[validate(length(max = 500, message = "Description must be less than 500 characters"))]
    pub description: Option<String>,
}

/// POST /api/experiences/{id}/report - Flag for moderator attention.
/// Anonymous reports are allowed and rate-limit on the client IP.
#[post("/api/experiences/{id}/report")]
pub async fn report_experience(
    client: ClientCtx,
    req: HttpRequest,
    path: web::Path<i32>,
    payload: web::Json<ReportPayload>,
) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let identifier = match client.get_id() {
        Some(user_id) => format!("user:{}", user_id),
        None => format!(
            "ip:{}",
            extract_client_ip(&req).unwrap_or_else(|| "unknown".to_owned())
        ),
    };
    rate_limit::check_report_rate_limit(&identifier)?;

    let report = experiences::file_report(
        get_db_pool(),
        experience_id,
        client.get_id(),
        payload.reason,
        payload.description,
    )
    .await?;

    Ok(super::created(report))
}

/// GET /api/companies - Distinct company names for the filter dropdown
#[get("/api/companies")]
pub async fn list_companies() -> Result<HttpResponse, OpError> {
    let companies = experiences::company_options(get_db_pool()).await?;
    let count = companies.len();
    Ok(super::ok_with_count(companies, count))
}
