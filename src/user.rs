//! Account creation and lookup helpers
//!
//! Shared by the auth handlers, the startup admin bootstrap and the test
//! fixtures so every path hashes passwords the same way.

use crate::error::OpError;
use crate::orm::users;
use crate::orm::users::Role;
use crate::session::get_argon2;
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    PasswordHasher,
};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use serde::Serialize;

/// Resolved request identity, carried by the client middleware.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<users::Model> for Profile {
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

/// Full account view for the owner (and staff). The password hash never
/// leaves the model.
#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_company: Option<String>,
    pub is_alumni: bool,
    pub profile: ProfileDetails,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfileDetails {
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl From<users::Model> for UserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            branch: user.branch,
            graduation_year: user.graduation_year,
            current_company: user.current_company,
            is_alumni: user.is_alumni,
            profile: ProfileDetails {
                bio: user.bio,
                linkedin: user.linkedin,
                github: user.github,
            },
            created_at: user.created_at,
        }
    }
}

/// What anyone can see on a member page. No email.
#[derive(Clone, Debug, Serialize)]
pub struct PublicUserView {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub role: Role,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_company: Option<String>,
    pub is_alumni: bool,
    pub profile: ProfileDetails,
}

impl From<users::Model> for PublicUserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            branch: user.branch,
            graduation_year: user.graduation_year,
            current_company: user.current_company,
            is_alumni: user.is_alumni,
            profile: ProfileDetails {
                bio: user.bio,
                linkedin: user.linkedin,
                github: user.github,
            },
        }
    }
}

/// Fields accepted when opening an account. The password arrives in
/// plaintext and is hashed on insert.
#[derive(Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub is_alumni: bool,
}

/// Hash the password and insert the account row.
pub async fn insert_new_user(
    db: &DatabaseConnection,
    new_user: NewUser,
) -> Result<users::Model, DbErr> {
    let password_hash = get_argon2()
        .hash_password(
            new_user.password.as_bytes(),
            &SaltString::generate(&mut OsRng),
        )
        .map_err(|e| DbErr::Custom(format!("Failed to hash password: {}", e)))?
        .to_string();

    let now = Utc::now().naive_utc();
    let user = users::ActiveModel {
        name: Set(new_user.name),
        username: Set(new_user.username.map(|u| u.to_lowercase())),
        email: Set(new_user.email.to_lowercase()),
        password: Set(password_hash),
        role: Set(new_user.role),
        branch: Set(new_user.branch),
        graduation_year: Set(new_user.graduation_year),
        is_alumni: Set(new_user.is_alumni),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    user.insert(db).await
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email.to_lowercase()))
        .one(db)
        .await
}

/// Partial profile update. A provided `details` block replaces bio, linkedin
/// and github wholesale.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_company: Option<String>,
    pub is_alumni: Option<bool>,
    pub details: Option<ProfileDetailsUpdate>,
}

#[derive(Debug, Default)]
pub struct ProfileDetailsUpdate {
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    changes: ProfileUpdate,
) -> Result<users::Model, OpError> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("User not found"))?;

    let mut active: users::ActiveModel = user.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(branch) = changes.branch {
        active.branch = Set(Some(branch));
    }
    if let Some(year) = changes.graduation_year {
        active.graduation_year = Set(Some(year));
    }
    if let Some(company) = changes.current_company {
        active.current_company = Set(Some(company));
    }
    if let Some(is_alumni) = changes.is_alumni {
        active.is_alumni = Set(is_alumni);
    }
    if let Some(details) = changes.details {
        active.bio = Set(details.bio);
        active.linkedin = Set(details.linkedin);
        active.github = Set(details.github);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    Ok(active.update(db).await?)
}

/// Usernames are stored lowercased, so lookups lowercase too.
pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username.to_lowercase()))
        .one(db)
        .await
}

/// Provision the first admin account from `[bootstrap_admin]` configuration.
///
/// Does nothing unless both email and password are configured and no admin
/// account exists yet. Never overwrites an existing account.
pub async fn bootstrap_admin(db: &DatabaseConnection) -> Result<(), DbErr> {
    let bootstrap = crate::app_config::bootstrap_admin();
    if !bootstrap.is_configured() {
        return Ok(());
    }

    let admin_count = users::Entity::find()
        .filter(users::Column::Role.eq(Role::Admin))
        .count(db)
        .await?;
    if admin_count > 0 {
        log::debug!("Bootstrap admin configured but an admin already exists, skipping");
        return Ok(());
    }

    if find_by_email(db, &bootstrap.email).await?.is_some() {
        log::warn!(
            "Bootstrap admin email {} already belongs to a non-admin account, skipping",
            bootstrap.email
        );
        return Ok(());
    }

    let admin = insert_new_user(
        db,
        NewUser {
            name: bootstrap.name.clone(),
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
            role: Role::Admin,
            ..Default::default()
        },
    )
    .await?;

    log::warn!(
        "Bootstrap admin account created: {} (user_id: {})",
        admin.email,
        admin.id
    );
    Ok(())
}
