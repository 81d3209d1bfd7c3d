use crate::entities::{files, prelude::*};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Repository for the shared file registry. Files are registered once by
/// path and referenced by any number of episodes.
pub struct FileRepository {
    conn: DatabaseConnection,
}

impl FileRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Registers a downloaded artifact, reusing the existing row when the
    /// path is already known.
    pub async fn get_or_add(
        &self,
        path: &str,
        kind_primary: &str,
        kind_sub: &str,
    ) -> Result<files::Model> {
        if let Some(existing) = Files::find()
            .filter(files::Column::Path.eq(path))
            .one(&self.conn)
            .await?
        {
            return Ok(existing);
        }

        let model = files::ActiveModel {
            path: Set(path.to_string()),
            kind_primary: Set(kind_primary.to_string()),
            kind_sub: Set(kind_sub.to_string()),
            ..Default::default()
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<files::Model>> {
        Ok(Files::find_by_id(id).one(&self.conn).await?)
    }
}
