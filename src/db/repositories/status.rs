use crate::entities::{prelude::*, statuses};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Repository for named status rows (`needs_update`, `done`).
pub struct StatusRepository {
    conn: DatabaseConnection,
}

impl StatusRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Looks up a status by identifier, creating the row on first use.
    pub async fn get_or_add(&self, identifier: &str) -> Result<statuses::Model> {
        if let Some(existing) = Statuses::find()
            .filter(statuses::Column::Identifier.eq(identifier))
            .one(&self.conn)
            .await?
        {
            return Ok(existing);
        }

        let model = statuses::ActiveModel {
            identifier: Set(identifier.to_string()),
            label: Set(Self::label_for(identifier)),
            ..Default::default()
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<statuses::Model>> {
        Ok(Statuses::find_by_id(id).one(&self.conn).await?)
    }

    fn label_for(identifier: &str) -> String {
        let spaced = identifier.replace('_', " ");
        let mut chars = spaced.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().collect::<String>() + chars.as_str()
        })
    }
}
