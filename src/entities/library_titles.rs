use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "library_titles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub episode_id: i32,
    pub title: String,
    pub simple_title: String,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::episode_library::Entity",
        from = "Column::EpisodeId",
        to = "super::episode_library::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    EpisodeLibrary,
}

impl Related<super::episode_library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EpisodeLibrary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
