use crate::entities::{
    episode_files, episode_library, library_titles, prelude::*, season_library, statuses,
};
use crate::models::episode::{EpisodeRecord, FileRecord, TitleRecord};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::{Map, Value};

use super::season::SeasonRepository;

/// Fields for a new episode row. The initial title travels separately.
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub kind: String,
    pub primary_provider: String,
    pub identifier: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub tagline: Option<String>,
    pub status_id: i32,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub absolute_number: Option<i32>,
    pub parent_id: Option<i32>,
}

/// One replacement title for an episode.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub title: String,
    pub simple_title: String,
    pub is_default: bool,
}

/// Field overwrite applied by a successful metadata refresh.
#[derive(Debug, Clone)]
pub struct RefreshFields {
    pub plot: Option<String>,
    pub tagline: Option<String>,
    pub year: Option<i32>,
    pub status_id: i32,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub absolute_number: Option<i32>,
    pub last_updated: i64,
    /// Merged info blob, JSON serialized.
    pub info: String,
}

/// Repository for episode library rows and their owned titles.
pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// `(kind, identifier)` selects at most one row; first match wins.
    pub async fn find_by_kind_identifier(
        &self,
        kind: &str,
        identifier: &str,
    ) -> Result<Option<episode_library::Model>> {
        let row = EpisodeLibrary::find()
            .filter(episode_library::Column::Kind.eq(kind))
            .filter(episode_library::Column::Identifier.eq(identifier))
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    pub async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<episode_library::Model>> {
        let row = EpisodeLibrary::find()
            .filter(episode_library::Column::Identifier.eq(identifier))
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    /// Inserts a new row together with its initial title. The row is
    /// committed immediately so other components can observe it before any
    /// metadata refresh completes.
    pub async fn insert(
        &self,
        episode: NewEpisode,
        initial_title: Option<NewTitle>,
    ) -> Result<episode_library::Model> {
        let model = episode_library::ActiveModel {
            kind: Set(episode.kind),
            primary_provider: Set(episode.primary_provider),
            identifier: Set(episode.identifier),
            year: Set(episode.year),
            plot: Set(episode.plot),
            tagline: Set(episode.tagline),
            status_id: Set(episode.status_id),
            info: Set("{}".to_string()),
            season_number: Set(episode.season_number),
            episode_number: Set(episode.episode_number),
            absolute_number: Set(episode.absolute_number),
            last_updated: Set(None),
            parent_id: Set(episode.parent_id),
            ..Default::default()
        };

        let inserted = model.insert(&self.conn).await?;

        if let Some(title) = initial_title {
            let title_model = library_titles::ActiveModel {
                episode_id: Set(inserted.id),
                title: Set(title.title),
                simple_title: Set(title.simple_title),
                is_default: Set(title.is_default),
                ..Default::default()
            };
            title_model.insert(&self.conn).await?;
        }

        Ok(inserted)
    }

    /// Overwrites the refreshable fields of a row.
    pub async fn apply_refresh(&self, id: i32, fields: RefreshFields) -> Result<()> {
        let model = episode_library::ActiveModel {
            id: Set(id),
            plot: Set(fields.plot),
            tagline: Set(fields.tagline),
            year: Set(fields.year),
            status_id: Set(fields.status_id),
            season_number: Set(fields.season_number),
            episode_number: Set(fields.episode_number),
            absolute_number: Set(fields.absolute_number),
            last_updated: Set(Some(fields.last_updated)),
            info: Set(fields.info),
            ..Default::default()
        };

        model.update(&self.conn).await?;
        Ok(())
    }

    /// Full replacement: old titles are deleted before the new set is
    /// inserted, never merged.
    pub async fn replace_titles(&self, episode_id: i32, titles: &[NewTitle]) -> Result<()> {
        LibraryTitles::delete_many()
            .filter(library_titles::Column::EpisodeId.eq(episode_id))
            .exec(&self.conn)
            .await?;

        if titles.is_empty() {
            return Ok(());
        }

        let models: Vec<library_titles::ActiveModel> = titles
            .iter()
            .map(|t| library_titles::ActiveModel {
                episode_id: Set(episode_id),
                title: Set(t.title.clone()),
                simple_title: Set(t.simple_title.clone()),
                is_default: Set(t.is_default),
                ..Default::default()
            })
            .collect();

        LibraryTitles::insert_many(models).exec(&self.conn).await?;
        Ok(())
    }

    /// Links a registered file to an episode. Files are shared, so the link
    /// is by reference and repeat attachments are no-ops.
    pub async fn attach_file(&self, episode_id: i32, file_id: i32) -> Result<()> {
        let model = episode_files::ActiveModel {
            episode_id: Set(episode_id),
            file_id: Set(file_id),
        };

        EpisodeFiles::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    episode_files::Column::EpisodeId,
                    episode_files::Column::FileId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn parent(
        &self,
        episode: &episode_library::Model,
    ) -> Result<Option<season_library::Model>> {
        let parent = episode
            .find_related(SeasonLibrary)
            .one(&self.conn)
            .await?;

        Ok(parent)
    }

    pub async fn titles(&self, episode_id: i32) -> Result<Vec<library_titles::Model>> {
        let rows = LibraryTitles::find()
            .filter(library_titles::Column::EpisodeId.eq(episode_id))
            .order_by_asc(library_titles::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Assembles the serialized view of a row: nested titles, files, parent
    /// season summary and the status identifier.
    pub async fn load_record(&self, episode: &episode_library::Model) -> Result<EpisodeRecord> {
        let titles = self
            .titles(episode.id)
            .await?
            .into_iter()
            .map(|t| TitleRecord {
                id: t.id,
                title: t.title,
                simple_title: t.simple_title,
                is_default: t.is_default,
            })
            .collect();

        let files = episode
            .find_related(Files)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|f| FileRecord {
                id: f.id,
                path: f.path,
                kind_primary: f.kind_primary,
                kind_sub: f.kind_sub,
            })
            .collect();

        let season = self
            .parent(episode)
            .await?
            .as_ref()
            .map(SeasonRepository::summary);

        let status = episode
            .find_related(Statuses)
            .one(&self.conn)
            .await?
            .map(|s: statuses::Model| s.identifier)
            .unwrap_or_default();

        let info: Map<String, Value> = serde_json::from_str(&episode.info).unwrap_or_default();

        Ok(EpisodeRecord {
            id: episode.id,
            kind: episode.kind.clone(),
            primary_provider: episode.primary_provider.clone(),
            identifier: episode.identifier.clone(),
            year: episode.year,
            plot: episode.plot.clone(),
            tagline: episode.tagline.clone(),
            status,
            info,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            absolute_number: episode.absolute_number,
            last_updated: episode.last_updated,
            titles,
            files,
            season,
        })
    }
}
