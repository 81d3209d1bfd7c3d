use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episode_library")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Media type tag. Always "episode" for rows created by this crate.
    pub kind: String,
    pub primary_provider: String,
    pub identifier: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub tagline: Option<String>,
    pub status_id: i32,
    /// Provider info blob, JSON serialized.
    pub info: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub absolute_number: Option<i32>,
    /// Epoch seconds of the last successful metadata refresh.
    pub last_updated: Option<i64>,
    pub parent_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::season_library::Entity",
        from = "Column::ParentId",
        to = "super::season_library::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SeasonLibrary,
    #[sea_orm(
        belongs_to = "super::statuses::Entity",
        from = "Column::StatusId",
        to = "super::statuses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Statuses,
    #[sea_orm(has_many = "super::library_titles::Entity")]
    LibraryTitles,
}

impl Related<super::season_library::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeasonLibrary.def()
    }
}

impl Related<super::statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl Related<super::library_titles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryTitles.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        super::episode_files::Relation::Files.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::episode_files::Relation::EpisodeLibrary.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
