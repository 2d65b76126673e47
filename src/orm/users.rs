//! SeaORM Entity for users table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role. Staff capability (moderation surface) is derived from this
/// in crate::permission, not stored separately.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "student")]
    #[default]
    Student,
    #[sea_orm(string_value = "alumni")]
    Alumni,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "coordinator")]
    Coordinator,
    #[sea_orm(string_value = "teacher")]
    Teacher,
}

impl Role {
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "alumni" => Some(Role::Alumni),
            "admin" => Some(Role::Admin),
            "coordinator" => Some(Role::Coordinator),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Late schema addition; older accounts have no username.
    #[sea_orm(unique)]
    pub username: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 hash, never serialized out.
    pub password: String,
    pub role: Role,
    pub branch: Option<String>,
    pub graduation_year: Option<i32>,
    pub current_company: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub is_alumni: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
