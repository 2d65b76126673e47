//! Comment and reply routes
//!
//! Reading is public. Writing requires a login so every comment has an
//! accountable author.

use crate::comments;
use crate::db::get_db_pool;
use crate::error::OpError;
use crate::middleware::ClientCtx;
use crate::rate_limit;
use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_comments)
        .service(post_comment)
        .service(post_reply)
        .service(delete_comment);
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub content: String,
}

/// GET /api/experiences/{id}/comments - All comments, newest first
#[get("/api/experiences/{id}/comments")]
pub async fn list_comments(path: web::Path<i32>) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let results = comments::list_comments(get_db_pool(), experience_id).await?;
    let count = results.len();
    Ok(super::ok_with_count(results, count))
}

/// POST /api/experiences/{id}/comments - Top-level comment
#[post("/api/experiences/{id}/comments")]
pub async fn post_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, OpError> {
    let experience_id = path.into_inner();
    let user_id = client.require_login()?;
    rate_limit::check_comment_rate_limit(user_id)?;

    let comment =
        comments::create_comment(get_db_pool(), experience_id, user_id, &payload.content).await?;
    Ok(super::created(comment))
}

/// POST /api/experiences/{id}/comments/{comment_id}/replies - Experience
/// author answering a question
#[post("/api/experiences/{id}/comments/{comment_id}/replies")]
pub async fn post_reply(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, OpError> {
    let (experience_id, parent_comment_id) = path.into_inner();
    let user_id = client.require_login()?;
    rate_limit::check_comment_rate_limit(user_id)?;

    let reply = comments::create_reply(
        get_db_pool(),
        experience_id,
        parent_comment_id,
        user_id,
        &payload.content,
    )
    .await?;
    Ok(super::created(reply))
}

/// DELETE /api/comments/{id} - Author or staff
#[delete("/api/comments/{id}")]
pub async fn delete_comment(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, OpError> {
    let comment_id = path.into_inner();
    let caller = client
        .get_user()
        .ok_or_else(|| OpError::unauthorized("Login required"))?;

    comments::delete_comment(get_db_pool(), comment_id, caller).await?;
    Ok(super::ok_message("Comment deleted"))
}
