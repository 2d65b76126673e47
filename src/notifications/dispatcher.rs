//! Notification fan-out rules

use crate::notifications::NotificationType;
use crate::orm::{comments, experiences, notifications};
use chrono::Utc;
use sea_orm::{entity::*, DatabaseConnection, DbErr};

/// Notify the experience author about a new top-level comment.
///
/// Nothing is written when the experience is anonymous, when the commenter
/// is the author themselves, or for replies (the author already chose to
/// engage with that thread). Returns the created notification, if any.
pub async fn notify_comment_created(
    db: &DatabaseConnection,
    experience: &experiences::Model,
    comment: &comments::Model,
) -> Result<Option<notifications::Model>, DbErr> {
    if comment.parent_id.is_some() {
        return Ok(None);
    }
    let recipient = match experience.author_id {
        Some(author_id) if author_id != comment.author_id => author_id,
        _ => return Ok(None),
    };

    let notification = notifications::ActiveModel {
        user_id: Set(recipient),
        type_: Set(NotificationType::Comment.as_str().to_owned()),
        experience_id: Set(Some(experience.id)),
        comment_id: Set(Some(comment.id)),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!(
        "Notification {} for user {}: comment {} on experience {}",
        notification.id,
        recipient,
        comment.id,
        experience.id
    );
    Ok(Some(notification))
}
