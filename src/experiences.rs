//! Experience submission and assembly
//!
//! An experience row holds the scalar fields; interview rounds and their
//! questions live in child tables and get reassembled into [`ExperienceData`]
//! on every read path (listings, detail, insights).

use crate::error::OpError;
use crate::orm::experiences::{ModerationStatus, OfferStatus};
use crate::orm::reports::{ReportReason, ReportStatus};
use crate::orm::{experience_rounds, experiences, reports, round_questions};
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::Serialize;
use std::collections::HashMap;

/// One interview round with its questions in submission order.
#[derive(Clone, Debug, Serialize)]
pub struct RoundData {
    pub round_number: i32,
    pub round_name: String,
    pub questions: Vec<String>,
    pub feedback: Option<String>,
}

/// An experience with its rounds reassembled.
#[derive(Clone, Debug, Serialize)]
pub struct ExperienceData {
    #[serde(flatten)]
    pub experience: experiences::Model,
    pub rounds: Vec<RoundData>,
}

#[derive(Debug, Default)]
pub struct NewRound {
    pub round_number: i32,
    pub round_name: String,
    pub questions: Vec<String>,
    pub feedback: Option<String>,
}

/// Fields accepted for a new submission. `author_id` is None for anonymous
/// submissions; `author_name` is always displayed as given.
#[derive(Debug, Default)]
pub struct NewExperience {
    pub company: String,
    pub role: String,
    pub branch: String,
    pub year: i32,
    pub rounds: Vec<NewRound>,
    pub package: Option<String>,
    pub tips: Option<String>,
    pub interview_date: Option<NaiveDateTime>,
    pub offer_status: OfferStatus,
    pub author_id: Option<i32>,
    pub author_name: String,
}

/// Partial update; absent fields are left unchanged. `rounds` replaces the
/// whole round list when present.
#[derive(Debug, Default)]
pub struct ExperienceUpdate {
    pub company: Option<String>,
    pub role: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub package: Option<String>,
    pub tips: Option<String>,
    pub interview_date: Option<NaiveDateTime>,
    pub offer_status: Option<OfferStatus>,
    pub rounds: Option<Vec<NewRound>>,
}

/// Listing filters. Text filters match case-insensitive substrings.
#[derive(Debug, Default)]
pub struct ExperienceFilter {
    pub company: Option<String>,
    pub role: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i32>,
}

fn validate_rounds(rounds: &[NewRound]) -> Result<(), OpError> {
    if rounds.is_empty() {
        return Err(OpError::validation(
            "At least one interview round is required",
        ));
    }
    for round in rounds {
        if round.round_name.trim().is_empty() {
            return Err(OpError::validation("Round name is required"));
        }
    }
    Ok(())
}

/// Insert a submission with its rounds. New experiences always enter the
/// moderation queue as pending.
pub async fn create(
    db: &DatabaseConnection,
    input: NewExperience,
) -> Result<ExperienceData, OpError> {
    validate_rounds(&input.rounds)?;

    let now = Utc::now().naive_utc();
    let experience = experiences::ActiveModel {
        company: Set(input.company.trim().to_owned()),
        role: Set(input.role.trim().to_owned()),
        branch: Set(input.branch.trim().to_owned()),
        year: Set(input.year),
        package: Set(input.package),
        tips: Set(input.tips),
        interview_date: Set(input.interview_date),
        offer_status: Set(input.offer_status),
        author_id: Set(input.author_id),
        author_name: Set(input.author_name),
        views: Set(0),
        helpful: Set(0),
        moderation_status: Set(ModerationStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let rounds = insert_rounds(db, experience.id, input.rounds).await?;
    log::info!(
        "Experience {} submitted for {} ({})",
        experience.id,
        experience.company,
        experience.role
    );

    Ok(ExperienceData { experience, rounds })
}

async fn insert_rounds(
    db: &DatabaseConnection,
    experience_id: i32,
    rounds: Vec<NewRound>,
) -> Result<Vec<RoundData>, OpError> {
    let mut out = Vec::with_capacity(rounds.len());
    for round in rounds {
        let row = experience_rounds::ActiveModel {
            experience_id: Set(experience_id),
            round_number: Set(round.round_number),
            round_name: Set(round.round_name.trim().to_owned()),
            feedback: Set(round.feedback),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let mut questions = Vec::with_capacity(round.questions.len());
        for (position, question) in round.questions.into_iter().enumerate() {
            let content = question.trim().to_owned();
            if content.is_empty() {
                continue;
            }
            round_questions::ActiveModel {
                round_id: Set(row.id),
                position: Set(position as i32),
                content: Set(content.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            questions.push(content);
        }

        out.push(RoundData {
            round_number: row.round_number,
            round_name: row.round_name,
            questions,
            feedback: row.feedback,
        });
    }
    Ok(out)
}

/// Apply a partial update. The moderation decision is untouched; re-review
/// after an edit is a staff call, not an automatic one.
pub async fn update(
    db: &DatabaseConnection,
    experience_id: i32,
    changes: ExperienceUpdate,
) -> Result<ExperienceData, OpError> {
    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    if let Some(rounds) = &changes.rounds {
        validate_rounds(rounds)?;
    }

    let mut active: experiences::ActiveModel = experience.into();
    if let Some(company) = changes.company {
        active.company = Set(company.trim().to_owned());
    }
    if let Some(role) = changes.role {
        active.role = Set(role.trim().to_owned());
    }
    if let Some(branch) = changes.branch {
        active.branch = Set(branch.trim().to_owned());
    }
    if let Some(year) = changes.year {
        active.year = Set(year);
    }
    if let Some(package) = changes.package {
        active.package = Set(Some(package));
    }
    if let Some(tips) = changes.tips {
        active.tips = Set(Some(tips));
    }
    if let Some(date) = changes.interview_date {
        active.interview_date = Set(Some(date));
    }
    if let Some(status) = changes.offer_status {
        active.offer_status = Set(status);
    }
    active.updated_at = Set(Utc::now().naive_utc());
    let experience = active.update(db).await?;

    let rounds = match changes.rounds {
        Some(rounds) => {
            // Wholesale replacement; questions go with their rounds.
            experience_rounds::Entity::delete_many()
                .filter(experience_rounds::Column::ExperienceId.eq(experience_id))
                .exec(db)
                .await?;
            insert_rounds(db, experience_id, rounds).await?
        }
        None => load_rounds_for(db, &[experience_id])
            .await?
            .remove(&experience_id)
            .unwrap_or_default(),
    };

    Ok(ExperienceData { experience, rounds })
}

/// Remove an experience. Rounds, questions, comments and reports go with it
/// via FK cascade; notifications keep their row with a nulled reference.
pub async fn delete(db: &DatabaseConnection, experience_id: i32) -> Result<(), OpError> {
    let result = experiences::Entity::delete_by_id(experience_id)
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(OpError::not_found("Experience not found"));
    }
    log::info!("Experience {} deleted", experience_id);
    Ok(())
}

async fn load_rounds_for(
    db: &DatabaseConnection,
    ids: &[i32],
) -> Result<HashMap<i32, Vec<RoundData>>, OpError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rounds = experience_rounds::Entity::find()
        .filter(experience_rounds::Column::ExperienceId.is_in(ids.iter().copied()))
        .order_by_asc(experience_rounds::Column::RoundNumber)
        .all(db)
        .await?;

    let round_ids: Vec<i32> = rounds.iter().map(|r| r.id).collect();
    let questions = if round_ids.is_empty() {
        Vec::new()
    } else {
        round_questions::Entity::find()
            .filter(round_questions::Column::RoundId.is_in(round_ids))
            .order_by_asc(round_questions::Column::Position)
            .all(db)
            .await?
    };

    let mut questions_by_round: HashMap<i32, Vec<String>> = HashMap::new();
    for question in questions {
        questions_by_round
            .entry(question.round_id)
            .or_default()
            .push(question.content);
    }

    let mut by_experience: HashMap<i32, Vec<RoundData>> = HashMap::new();
    for round in rounds {
        by_experience
            .entry(round.experience_id)
            .or_default()
            .push(RoundData {
                round_number: round.round_number,
                round_name: round.round_name,
                questions: questions_by_round.remove(&round.id).unwrap_or_default(),
                feedback: round.feedback,
            });
    }

    Ok(by_experience)
}

/// Attach rounds to already-fetched experience rows, preserving their order.
pub async fn attach_rounds(
    db: &DatabaseConnection,
    models: Vec<experiences::Model>,
) -> Result<Vec<ExperienceData>, OpError> {
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut rounds = load_rounds_for(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|experience| {
            let rounds = rounds.remove(&experience.id).unwrap_or_default();
            ExperienceData { experience, rounds }
        })
        .collect())
}

pub async fn load_one(
    db: &DatabaseConnection,
    experience_id: i32,
) -> Result<Option<ExperienceData>, OpError> {
    let experience = match experiences::Entity::find_by_id(experience_id).one(db).await? {
        Some(experience) => experience,
        None => return Ok(None),
    };
    let rounds = load_rounds_for(db, &[experience_id])
        .await?
        .remove(&experience_id)
        .unwrap_or_default();
    Ok(Some(ExperienceData { experience, rounds }))
}

/// The full corpus regardless of moderation status, newest first. Insights
/// scans this.
pub async fn load_all(db: &DatabaseConnection) -> Result<Vec<ExperienceData>, OpError> {
    let models = experiences::Entity::find()
        .order_by_desc(experiences::Column::CreatedAt)
        .all(db)
        .await?;
    attach_rounds(db, models).await
}

/// Case-insensitive substring match compiled as lower(col) LIKE %term%.
fn contains_ci(column: experiences::Column, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", term.to_lowercase()))
}

/// Public listing: approved experiences only, newest first.
pub async fn search_approved(
    db: &DatabaseConnection,
    filter: &ExperienceFilter,
) -> Result<Vec<ExperienceData>, OpError> {
    let mut query = experiences::Entity::find()
        .filter(experiences::Column::ModerationStatus.eq(ModerationStatus::Approved));

    if let Some(company) = filter.company.as_deref() {
        query = query.filter(contains_ci(experiences::Column::Company, company));
    }
    if let Some(role) = filter.role.as_deref() {
        query = query.filter(contains_ci(experiences::Column::Role, role));
    }
    if let Some(branch) = filter.branch.as_deref() {
        query = query.filter(contains_ci(experiences::Column::Branch, branch));
    }
    if let Some(year) = filter.year {
        query = query.filter(experiences::Column::Year.eq(year));
    }

    let models = query
        .order_by_desc(experiences::Column::CreatedAt)
        .all(db)
        .await?;
    attach_rounds(db, models).await
}

/// Distinct company names across approved experiences, for the filter
/// dropdown.
pub async fn company_options(db: &DatabaseConnection) -> Result<Vec<String>, OpError> {
    let mut companies: Vec<String> = experiences::Entity::find()
        .select_only()
        .column(experiences::Column::Company)
        .filter(experiences::Column::ModerationStatus.eq(ModerationStatus::Approved))
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    companies.sort();
    Ok(companies)
}

/// Bump the view counter in one statement so concurrent reads never lose an
/// increment.
pub async fn increment_views(db: &DatabaseConnection, experience_id: i32) -> Result<(), OpError> {
    experiences::Entity::update_many()
        .col_expr(
            experiences::Column::Views,
            Expr::col(experiences::Column::Views).add(1),
        )
        .filter(experiences::Column::Id.eq(experience_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Bump the helpful counter and return the new value.
pub async fn increment_helpful(
    db: &DatabaseConnection,
    experience_id: i32,
) -> Result<i32, OpError> {
    let result = experiences::Entity::update_many()
        .col_expr(
            experiences::Column::Helpful,
            Expr::col(experiences::Column::Helpful).add(1),
        )
        .filter(experiences::Column::Id.eq(experience_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(OpError::not_found("Experience not found"));
    }

    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;
    Ok(experience.helpful)
}

/// File a report against an experience. Reporter is optional; anonymous
/// reports are allowed.
pub async fn file_report(
    db: &DatabaseConnection,
    experience_id: i32,
    reported_by: Option<i32>,
    reason: ReportReason,
    description: Option<String>,
) -> Result<reports::Model, OpError> {
    experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    let now = Utc::now().naive_utc();
    let report = reports::ActiveModel {
        experience_id: Set(experience_id),
        reported_by: Set(reported_by),
        reason: Set(reason),
        description: Set(description),
        status: Set(ReportStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!(
        "Report {} filed against experience {}",
        report.id,
        experience_id
    );
    Ok(report)
}
