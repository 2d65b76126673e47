//! Aggregated placement insights and the question bank

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::insights;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_insights).service(search_questions);
}

/// GET /api/insights - Corpus-wide aggregates for the dashboard
#[get("/api/insights")]
pub async fn view_insights() -> Result<HttpResponse, OpError> {
    let snapshot = insights::build(get_db_pool()).await?;
    Ok(super::ok(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub company: Option<String>,
    pub role: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/insights/questions - Question bank filtered by company and role
#[get("/api/insights/questions")]
pub async fn search_questions(query: web::Query<QuestionQuery>) -> Result<HttpResponse, OpError> {
    let results = insights::questions(
        get_db_pool(),
        non_empty(&query.company),
        non_empty(&query.role),
    )
    .await?;
    Ok(super::ok(results))
}
