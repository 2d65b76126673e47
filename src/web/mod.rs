pub mod admin;
pub mod announcements;
pub mod auth;
pub mod comments;
pub mod experiences;
pub mod insights;
pub mod notifications;
pub mod users;

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    admin::configure(conf);
    announcements::configure(conf);
    auth::configure(conf);
    comments::configure(conf);
    experiences::configure(conf);
    insights::configure(conf);
    notifications::configure(conf);
    users::configure(conf);
}

/// 200 with the standard `{success, data}` envelope.
pub(crate) fn ok(data: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

/// 200 for list payloads; `count` carries the number of items.
pub(crate) fn ok_with_count(data: impl Serialize, count: usize) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "count": count, "data": data }))
}

/// 201 for newly created resources.
pub(crate) fn created(data: impl Serialize) -> HttpResponse {
    HttpResponse::Created().json(json!({ "success": true, "data": data }))
}

/// 200 for operations whose outcome is a sentence, not a resource.
pub(crate) fn ok_message(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": message.into() }))
}
