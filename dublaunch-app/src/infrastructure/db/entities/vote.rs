use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The composite primary key is what keeps a voter to one vote per launch.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub launch_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub voter_id: Uuid,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::VoterId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Voter,
    #[sea_orm(
        belongs_to = "super::launch::Entity",
        from = "Column::LaunchId",
        to = "super::launch::Column::Id",
        on_delete = "Cascade"
    )]
    Launch,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl Related<super::launch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Launch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
