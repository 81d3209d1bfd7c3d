use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub identifier: String,
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::episode_library::Entity")]
    EpisodeLibrary,
}

impl Related<super::episode_library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EpisodeLibrary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
