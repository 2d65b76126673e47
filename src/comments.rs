//! Comments and one-level replies on experiences
//!
//! Top-level comments are open to any logged-in user. Replies are the
//! experience author answering their commenters, one level deep. The comment
//! insert and the notification fan-out are independent writes; losing the
//! notification is acceptable, losing the comment is not.

use crate::error::OpError;
use crate::notifications::dispatcher;
use crate::orm::users::Role;
use crate::orm::{comments, experiences, users};
use crate::permission;
use crate::user::Profile;
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::Serialize;
use std::collections::HashMap;

pub const MAX_CONTENT_LENGTH: usize = 1000;

#[derive(Clone, Debug, Serialize)]
pub struct CommentAuthor {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<users::Model> for CommentAuthor {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// A comment with its author attached. `author` is None only if the account
/// vanished between fetches.
#[derive(Clone, Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: comments::Model,
    pub author: Option<CommentAuthor>,
}

fn validate_content(content: &str) -> Result<String, OpError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(OpError::validation("Comment content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(OpError::validation(
            "Comment must be less than 1000 characters",
        ));
    }
    Ok(content.to_owned())
}

/// Comments on an experience, newest first, with author info attached.
pub async fn list_comments(
    db: &DatabaseConnection,
    experience_id: i32,
) -> Result<Vec<CommentView>, OpError> {
    experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    let rows = comments::Entity::find()
        .filter(comments::Column::ExperienceId.eq(experience_id))
        .order_by_desc(comments::Column::CreatedAt)
        .all(db)
        .await?;

    attach_authors(db, rows).await
}

/// Post a top-level comment and fan out the author notification.
pub async fn create_comment(
    db: &DatabaseConnection,
    experience_id: i32,
    author_id: i32,
    content: &str,
) -> Result<CommentView, OpError> {
    let content = validate_content(content)?;
    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    let now = Utc::now().naive_utc();
    let comment = comments::ActiveModel {
        experience_id: Set(experience_id),
        author_id: Set(author_id),
        content: Set(content),
        parent_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Err(e) = dispatcher::notify_comment_created(db, &experience, &comment).await {
        log::warn!(
            "Notification fan-out failed for comment {}: {}",
            comment.id,
            e
        );
    }

    with_author(db, comment).await
}

/// Reply to a comment. Only the experience author can reply, and only to
/// top-level comments on their own experience.
pub async fn create_reply(
    db: &DatabaseConnection,
    experience_id: i32,
    parent_comment_id: i32,
    author_id: i32,
    content: &str,
) -> Result<CommentView, OpError> {
    let content = validate_content(content)?;
    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    match experience.author_id {
        None => {
            return Err(OpError::forbidden(
                "Anonymous experiences cannot receive replies",
            ))
        }
        Some(experience_author) if experience_author != author_id => {
            return Err(OpError::forbidden(
                "Only the experience author can reply to comments",
            ))
        }
        Some(_) => {}
    }

    let parent = comments::Entity::find_by_id(parent_comment_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Comment not found"))?;
    if parent.experience_id != experience_id {
        return Err(OpError::validation(
            "Comment does not belong to this experience",
        ));
    }
    if parent.parent_id.is_some() {
        return Err(OpError::validation("Cannot reply to a reply"));
    }

    let now = Utc::now().naive_utc();
    let reply = comments::ActiveModel {
        experience_id: Set(experience_id),
        author_id: Set(author_id),
        content: Set(content),
        parent_id: Set(Some(parent_comment_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    with_author(db, reply).await
}

/// Delete a comment and its replies. Allowed for the comment author and
/// staff.
pub async fn delete_comment(
    db: &DatabaseConnection,
    comment_id: i32,
    caller: &Profile,
) -> Result<(), OpError> {
    let comment = comments::Entity::find_by_id(comment_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Comment not found"))?;

    if comment.author_id != caller.id && !permission::is_staff(&caller.role) {
        return Err(OpError::forbidden("Not authorized to delete this comment"));
    }

    // Replies first, then the comment itself.
    comments::Entity::delete_many()
        .filter(comments::Column::ParentId.eq(comment_id))
        .exec(db)
        .await?;
    comments::Entity::delete_by_id(comment_id).exec(db).await?;

    log::info!("Comment {} deleted by user {}", comment_id, caller.id);
    Ok(())
}

async fn attach_authors(
    db: &DatabaseConnection,
    rows: Vec<comments::Model>,
) -> Result<Vec<CommentView>, OpError> {
    let author_ids: Vec<i32> = rows.iter().map(|c| c.author_id).collect();
    let authors: HashMap<i32, CommentAuthor> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, CommentAuthor::from(u)))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|comment| {
            let author = authors.get(&comment.author_id).cloned();
            CommentView { comment, author }
        })
        .collect())
}

async fn with_author(
    db: &DatabaseConnection,
    comment: comments::Model,
) -> Result<CommentView, OpError> {
    let author = users::Entity::find_by_id(comment.author_id)
        .one(db)
        .await?
        .map(CommentAuthor::from);
    Ok(CommentView { comment, author })
}
