use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episode_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub episode_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: i32,
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
    #[sea_orm(
        belongs_to = "super::files::Entity",
        from = "Column::FileId",
        to = "super::files::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Files,
}

impl Related<super::episode_library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EpisodeLibrary.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
