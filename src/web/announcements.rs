//! Public announcement feed
//!
//! Only active, unexpired announcements are served here. Authoring and
//! lifecycle management live on the admin surface.

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::orm::{announcements, users};
use actix_web::{get, HttpResponse};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_announcements);
}

#[derive(Debug, Serialize)]
pub struct PublisherRef {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: announcements::Model,
    pub publisher: Option<PublisherRef>,
}

/// GET /api/announcements - Active announcements, newest first
#[get("/api/announcements")]
pub async fn list_announcements() -> Result<HttpResponse, OpError> {
    let db = get_db_pool();
    let now = Utc::now().naive_utc();

    let rows = announcements::Entity::find()
        .filter(announcements::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(announcements::Column::ExpiresAt.is_null())
                .add(announcements::Column::ExpiresAt.gt(now)),
        )
        .order_by_desc(announcements::Column::PublishedAt)
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

    let results: Vec<AnnouncementView> = rows
        .into_iter()
        .map(|announcement| {
            let publisher = publishers.get(&announcement.published_by).map(|u| PublisherRef {
                id: u.id,
                name: u.name.clone(),
                username: u.username.clone(),
            });
            AnnouncementView {
                announcement,
                publisher,
            }
        })
        .collect();

    let count = results.len();
    Ok(super::ok_with_count(results, count))
}
