use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub path: String,
    /// Coarse file category, e.g. "image".
    pub kind_primary: String,
    /// Subtype within the category, e.g. "poster".
    pub kind_sub: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::episode_library::Entity> for Entity {
    fn to() -> RelationDef {
        super::episode_files::Relation::EpisodeLibrary.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::episode_files::Relation::Files.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
