use crate::entities::{prelude::*, season_library};
use crate::models::episode::SeasonSummary;
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::Value;

/// Read-only access to season library rows. Seasons are owned by the season
/// component of the host; episodes only link to them and read their titles.
pub struct SeasonRepository {
    conn: DatabaseConnection,
}

impl SeasonRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_provider_identifier(
        &self,
        primary_provider: &str,
        identifier: &str,
    ) -> Result<Option<season_library::Model>> {
        let row = SeasonLibrary::find()
            .filter(season_library::Column::PrimaryProvider.eq(primary_provider))
            .filter(season_library::Column::Identifier.eq(identifier))
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    pub async fn find(&self, id: i32) -> Result<Option<season_library::Model>> {
        Ok(SeasonLibrary::find_by_id(id).one(&self.conn).await?)
    }

    /// Resolves the season's display titles: the `titles` array of its info
    /// blob, falling back to the bare title column.
    pub fn summary(season: &season_library::Model) -> SeasonSummary {
        let info: Value = serde_json::from_str(&season.info).unwrap_or(Value::Null);

        let mut titles: Vec<String> = info
            .get("titles")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if titles.is_empty()
            && let Some(title) = &season.title
        {
            titles.push(title.clone());
        }

        SeasonSummary {
            id: season.id,
            identifier: season.identifier.clone(),
            season_number: season.season_number,
            titles,
        }
    }
}
