//! SeaORM Entity for experiences table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Placement outcome reported by the submitter.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[derive(Default)]
pub enum OfferStatus {
    #[sea_orm(string_value = "Selected")]
    #[serde(rename = "Selected")]
    Selected,
    #[sea_orm(string_value = "Not Selected")]
    #[serde(rename = "Not Selected")]
    NotSelected,
    #[sea_orm(string_value = "Pending")]
    #[serde(rename = "Pending")]
    #[default]
    Pending,
}

/// Approval lifecycle. New submissions start pending and only staff moves
/// them; re-review of a terminal state is allowed.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    /// Parses a query-string value. Unknown strings return None so listing
    /// endpoints can fall back to an empty result rather than erroring.
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ModerationStatus::Pending),
            "approved" => Some(ModerationStatus::Approved),
            "rejected" => Some(ModerationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "experiences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company: String,
    pub role: String,
    pub branch: String,
    pub year: i32,
    /// Free text ("12 LPA", "$120k"). Parsed best-effort by insights only.
    pub package: Option<String>,
    pub tips: Option<String>,
    pub interview_date: Option<DateTime>,
    pub offer_status: OfferStatus,
    /// None for anonymous submissions.
    pub author_id: Option<i32>,
    pub author_name: String,
    pub views: i32,
    pub helpful: i32,
    pub moderation_status: ModerationStatus,
    pub moderated_by: Option<i32>,
    pub moderated_at: Option<DateTime>,
    pub moderation_notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ModeratedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Moderator,
    #[sea_orm(has_many = "super::experience_rounds::Entity")]
    Rounds,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::experience_rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rounds.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
