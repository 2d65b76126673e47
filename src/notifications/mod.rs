//! In-app notification inbox
//!
//! A notification is a pointer into the corpus (experience + comment), not a
//! copy of it. Reads denormalize on the fly and tolerate pointers nulled by
//! deletion cascades.

pub mod dispatcher;
pub mod types;

use crate::error::OpError;
use crate::orm::{comments, experiences, notifications, users};
use chrono::NaiveDateTime;
use sea_orm::{entity::*, query::*, sea_query::Expr, DatabaseConnection};
use serde::Serialize;
use std::collections::HashMap;

pub use types::NotificationType;

/// How many notifications the inbox endpoint returns.
const RECENT_LIMIT: u64 = 50;

#[derive(Clone, Debug, Serialize)]
pub struct ExperienceRef {
    pub id: i32,
    pub company: String,
    pub role: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommentRef {
    pub id: i32,
    pub content: String,
    pub author_name: Option<String>,
}

/// A notification as the inbox shows it. `experience` and `comment` are None
/// when the referenced row has been deleted since the fan-out.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationView {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
    pub experience: Option<ExperienceRef>,
    pub comment: Option<CommentRef>,
}

/// Count unread notifications for a user.
pub async fn count_unread(db: &DatabaseConnection, user_id: i32) -> Result<u64, OpError> {
    Ok(notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(db)
        .await?)
}

/// Mark one notification as read. The user filter keeps one user from
/// touching another's inbox; a miss on either filter is a NotFound.
pub async fn mark_read(
    db: &DatabaseConnection,
    notification_id: i32,
    user_id: i32,
) -> Result<notifications::Model, OpError> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(OpError::not_found("Notification not found"));
    }

    notifications::Entity::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Notification not found"))
}

/// Mark every unread notification as read. Idempotent; returns how many rows
/// changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: i32) -> Result<u64, OpError> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// The user's inbox, newest first, capped at [`RECENT_LIMIT`].
pub async fn recent(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<NotificationView>, OpError> {
    let rows = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(db)
        .await?;

    let experience_ids: Vec<i32> = rows.iter().filter_map(|n| n.experience_id).collect();
    let comment_ids: Vec<i32> = rows.iter().filter_map(|n| n.comment_id).collect();

    let experience_refs: HashMap<i32, ExperienceRef> = if experience_ids.is_empty() {
        HashMap::new()
    } else {
        experiences::Entity::find()
            .filter(experiences::Column::Id.is_in(experience_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|e| {
                (
                    e.id,
                    ExperienceRef {
                        id: e.id,
                        company: e.company,
                        role: e.role,
                    },
                )
            })
            .collect()
    };

    let comment_rows = if comment_ids.is_empty() {
        Vec::new()
    } else {
        comments::Entity::find()
            .filter(comments::Column::Id.is_in(comment_ids))
            .all(db)
            .await?
    };
    let author_ids: Vec<i32> = comment_rows.iter().map(|c| c.author_id).collect();
    let author_names: HashMap<i32, String> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };
    let comment_refs: HashMap<i32, CommentRef> = comment_rows
        .into_iter()
        .map(|c| {
            let author_name = author_names.get(&c.author_id).cloned();
            (
                c.id,
                CommentRef {
                    id: c.id,
                    content: c.content,
                    author_name,
                },
            )
        })
        .collect();

    Ok(rows
        .into_iter()
        .map(|n| NotificationView {
            id: n.id,
            kind: n.type_,
            is_read: n.is_read,
            created_at: n.created_at,
            experience: n.experience_id.and_then(|id| experience_refs.get(&id).cloned()),
            comment: n.comment_id.and_then(|id| comment_refs.get(&id).cloned()),
        })
        .collect())
}
