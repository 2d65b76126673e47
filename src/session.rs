//! Password hashing and bearer-token sessions
//!
//! Tokens are UUIDv4 strings persisted in the sessions table and presented as
//! `Authorization: Bearer <token>`. Expired rows are reaped lazily on lookup.

use crate::orm::{sessions, users};
use argon2::Argon2;
use chrono::{Duration, Utc};
use once_cell::sync::OnceCell;
use sea_orm::{entity::*, DatabaseConnection, DbErr};
use uuid::Uuid;

static ARGON2: OnceCell<Argon2<'static>> = OnceCell::new();

/// Initialize the module. Safe to call more than once.
pub fn init() {
    ARGON2.get_or_init(Argon2::default);
}

/// Shared hasher instance. Fixtures and login must use the same parameters.
pub fn get_argon2() -> &'static Argon2<'static> {
    ARGON2.get_or_init(Argon2::default)
}

/// Issue a new session for a user.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<sessions::Model, DbErr> {
    let now = Utc::now().naive_utc();
    let timeout = crate::app_config::security().session_timeout_minutes;

    let session = sessions::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::minutes(timeout as i64)),
    };

    session.insert(db).await
}

/// Resolve a bearer token to its user. Returns None for unknown or expired
/// tokens; expired rows are deleted on the way out.
pub async fn authenticate_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<users::Model>, DbErr> {
    let session = match sessions::Entity::find_by_id(token.to_owned()).one(db).await? {
        Some(session) => session,
        None => return Ok(None),
    };

    if session.expires_at <= Utc::now().naive_utc() {
        sessions::Entity::delete_by_id(session.id).exec(db).await?;
        return Ok(None);
    }

    users::Entity::find_by_id(session.user_id).one(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
    use argon2::{PasswordHasher, PasswordVerifier};

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = get_argon2()
            .hash_password(b"hunter22", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(get_argon2().verify_password(b"hunter22", &parsed).is_ok());
        assert!(get_argon2().verify_password(b"hunter23", &parsed).is_err());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
