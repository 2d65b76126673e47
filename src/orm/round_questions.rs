//! SeaORM Entity for round_questions table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "round_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub round_id: i32,
    /// Preserves submission order within the round.
    pub position: i32,
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::experience_rounds::Entity",
        from = "Column::RoundId",
        to = "super::experience_rounds::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Round,
}

impl Related<super::experience_rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
