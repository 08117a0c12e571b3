use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub pokedex_entry_id: Uuid,
    /// 1-based slot in the team (1..=6)
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::pokedex_entry::Entity",
        from = "Column::PokedexEntryId",
        to = "super::pokedex_entry::Column::Id",
        on_delete = "Cascade"
    )]
    PokedexEntry,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::pokedex_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PokedexEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
