//! Notification routes for the logged-in user

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::middleware::ClientCtx;
use crate::notifications;
use actix_web::{get, patch, post, web, HttpResponse};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // The static segments must register before the {id} catch.
    conf.service(unread_count)
        .service(read_all)
        .service(list_notifications)
        .service(read_one);
}

/// GET /api/notifications - Most recent notifications, unread or not
#[get("/api/notifications")]
pub async fn list_notifications(client: ClientCtx) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;
    let results = notifications::recent(get_db_pool(), user_id).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

/// GET /api/notifications/unread-count - Badge number for the nav bar
#[get("/api/notifications/unread-count")]
pub async fn unread_count(client: ClientCtx) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;
    let count = notifications::count_unread(get_db_pool(), user_id).await?;
    Ok(super::ok(json!({ "count": count })))
}

/// PATCH /api/notifications/{id}/read - Mark one as read
#[patch("/api/notifications/{id}/read")]
pub async fn read_one(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, OpError> {
    let notification_id = path.into_inner();
    let user_id = client.require_login()?;
    let updated = notifications::mark_read(get_db_pool(), notification_id, user_id).await?;
    Ok(super::ok(updated))
}

/// POST /api/notifications/read-all - Clear the badge in one shot
#[post("/api/notifications/read-all")]
pub async fn read_all(client: ClientCtx) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;
    let modified = notifications::mark_all_read(get_db_pool(), user_id).await?;
    Ok(super::ok(json!({ "modified": modified })))
}
