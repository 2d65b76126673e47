//! Experience moderation lifecycle
//!
//! Submissions start pending and are approved or rejected by staff. Terminal
//! states stay re-enterable: re-approving overwrites the moderator fields,
//! and reset_all() returns every non-pending record to the queue.

use crate::error::OpError;
use crate::orm::experiences;
use crate::orm::experiences::ModerationStatus;
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection};

/// Approve an experience, overwriting any previous decision.
pub async fn approve(
    db: &DatabaseConnection,
    experience_id: i32,
    moderator_id: i32,
    notes: Option<String>,
) -> Result<experiences::Model, OpError> {
    transition(db, experience_id, ModerationStatus::Approved, moderator_id, notes).await
}

/// Reject an experience, overwriting any previous decision.
pub async fn reject(
    db: &DatabaseConnection,
    experience_id: i32,
    moderator_id: i32,
    notes: Option<String>,
) -> Result<experiences::Model, OpError> {
    transition(db, experience_id, ModerationStatus::Rejected, moderator_id, notes).await
}

async fn transition(
    db: &DatabaseConnection,
    experience_id: i32,
    status: ModerationStatus,
    moderator_id: i32,
    notes: Option<String>,
) -> Result<experiences::Model, OpError> {
    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    let now = Utc::now().naive_utc();
    let mut active: experiences::ActiveModel = experience.into();
    active.moderation_status = Set(status.clone());
    active.moderated_by = Set(Some(moderator_id));
    active.moderated_at = Set(Some(now));
    // Absent notes leave any earlier notes in place.
    if let Some(notes) = notes {
        active.moderation_notes = Set(Some(notes));
    }
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    log::info!(
        "Experience {} set to {} by user {}",
        updated.id,
        status.as_str(),
        moderator_id
    );

    Ok(updated)
}

/// Experiences filtered by moderation status, newest submission first.
/// `None` lists the whole corpus.
pub async fn find_by_status(
    db: &DatabaseConnection,
    status: Option<ModerationStatus>,
) -> Result<Vec<experiences::Model>, OpError> {
    let mut query = experiences::Entity::find();
    if let Some(status) = status {
        query = query.filter(experiences::Column::ModerationStatus.eq(status));
    }

    Ok(query
        .order_by_desc(experiences::Column::CreatedAt)
        .all(db)
        .await?)
}

/// The moderation queue.
pub async fn pending(db: &DatabaseConnection) -> Result<Vec<experiences::Model>, OpError> {
    find_by_status(db, Some(ModerationStatus::Pending)).await
}

pub async fn count_by_status(
    db: &DatabaseConnection,
    status: ModerationStatus,
) -> Result<u64, OpError> {
    Ok(experiences::Entity::find()
        .filter(experiences::Column::ModerationStatus.eq(status))
        .count(db)
        .await?)
}

/// Return every non-pending experience to the queue and clear the moderator
/// fields. One bulk update, no undo. Returns the number of rows changed.
pub async fn reset_all(db: &DatabaseConnection) -> Result<u64, OpError> {
    let result = experiences::Entity::update_many()
        .col_expr(
            experiences::Column::ModerationStatus,
            Expr::value(ModerationStatus::Pending),
        )
        .col_expr(
            experiences::Column::ModeratedBy,
            Expr::value(Option::<i32>::None),
        )
        .col_expr(
            experiences::Column::ModeratedAt,
            Expr::value(Option::<NaiveDateTime>::None),
        )
        .col_expr(
            experiences::Column::ModerationNotes,
            Expr::value(Option::<String>::None),
        )
        .filter(experiences::Column::ModerationStatus.ne(ModerationStatus::Pending))
        .exec(db)
        .await?;

    log::warn!(
        "Moderation reset: {} experiences returned to pending",
        result.rows_affected
    );

    Ok(result.rows_affected)
}
