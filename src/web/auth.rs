//! Registration, login and current-user routes
//!
//! Login failures are deliberately uniform: unknown email and wrong password
//! both come back as 401 "Invalid credentials" so the endpoint cannot be
//! used to probe for accounts.

use crate::db::get_db_pool;
use crate::error::OpError;
use crate::ip::extract_client_ip;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::orm::users::Role;
use crate::rate_limit;
use crate::session;
use crate::user::{self, NewUser, UserView};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use argon2::password_hash::PasswordHash;
use argon2::PasswordVerifier;
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(register).service(login).service(me);
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 100, message = "Please provide a name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub is_alumni: bool,
}

/// POST /api/auth/register - Open an account and start a session
#[post("/api/auth/register")]
pub async fn register(
    req: HttpRequest,
    payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, OpError> {
    let ip = extract_client_ip(&req).unwrap_or_else(|| "unknown".to_owned());
    rate_limit::check_registration_rate_limit(&ip)?;

    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| OpError::validation(e.to_string()))?;

    let min_len = crate::app_config::security().min_password_length as usize;
    if payload.password.len() < min_len {
        return Err(OpError::validation(format!(
            "Password must be at least {} characters",
            min_len
        )));
    }

    let db = get_db_pool();
    if user::find_by_email(db, &payload.email).await?.is_some() {
        return Err(OpError::conflict("User already exists with this email"));
    }
    if let Some(username) = payload.username.as_deref() {
        if user::find_by_username(db, username).await?.is_some() {
            return Err(OpError::conflict("Username is already taken"));
        }
    }

    // Self-service accounts are student or alumni; staff roles are assigned
    // by an admin, never at registration.
    let role = if payload.is_alumni {
        Role::Alumni
    } else {
        Role::Student
    };
    let new_user = user::insert_new_user(
        db,
        NewUser {
            name: payload.name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role,
            branch: payload.branch,
            graduation_year: payload.graduation_year,
            is_alumni: payload.is_alumni,
        },
    )
    .await?;

    let token = session::create_session(db, new_user.id).await?.id;
    log::info!("User {} registered from {}", new_user.id, ip);

    Ok(super::created(json!({
        "token": token,
        "user": UserView::from(new_user),
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - Exchange credentials for a bearer token
#[post("/api/auth/login")]
pub async fn login(
    req: HttpRequest,
    payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, OpError> {
    let ip = extract_client_ip(&req).unwrap_or_else(|| "unknown".to_owned());
    rate_limit::check_login_rate_limit(&ip, &payload.email)?;

    let db = get_db_pool();
    let user = user::find_by_email(db, &payload.email)
        .await?
        .ok_or_else(|| OpError::unauthorized("Invalid credentials"))?;

    let parsed = PasswordHash::new(&user.password).map_err(|e| {
        log::error!(
            "Stored password hash for user {} is unreadable: {}",
            user.id,
            e
        );
        OpError::unauthorized("Invalid credentials")
    })?;
    if session::get_argon2()
        .verify_password(payload.password.as_bytes(), &parsed)
        .is_err()
    {
        return Err(OpError::unauthorized("Invalid credentials"));
    }

    let token = session::create_session(db, user.id).await?.id;
    log::info!("User {} logged in from {}", user.id, ip);

    Ok(super::ok(json!({
        "token": token,
        "user": UserView::from(user),
    })))
}

/// GET /api/auth/me - The account behind the presented token
#[get("/api/auth/me")]
pub async fn me(client: ClientCtx) -> Result<HttpResponse, OpError> {
    let user_id = client.require_login()?;

    let user = users::Entity::find_by_id(user_id)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| OpError::unauthorized("Session user no longer exists"))?;

    Ok(super::ok(UserView::from(user)))
}
