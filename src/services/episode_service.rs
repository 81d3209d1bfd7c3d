//! Domain service for episode library operations.
//!
//! This module provides the [`EpisodeLibraryService`] trait: episode
//! creation, identification, titling and metadata refresh.

use crate::domain::{EpisodeIdentifier, RefreshMode, TitleOptions};
use crate::models::episode::{EpisodeAttrs, EpisodeRecord};
use thiserror::Error;

/// Domain errors for episode library operations.
///
/// Misuse (missing seasons, unknown identifiers, empty provider answers) is
/// reported through `Option` returns and logs, not through this enum; only
/// persistence-layer failures surface as errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Episode lifecycle operations. Every operation tolerates partial or
/// missing optional fields.
#[async_trait::async_trait]
pub trait EpisodeLibraryService: Send + Sync {
    /// Resolves all display titles for an episode record: the parent
    /// season's titles, each suffixed with a zero-padded `E<NN>` when
    /// requested and a non-zero episode number is resolvable.
    ///
    /// Returns `None` (with a warning log) when the record is not an episode
    /// or carries no related season. Read-only.
    fn titles(&self, record: &EpisodeRecord, opts: TitleOptions) -> Option<Vec<String>>;

    /// First candidate from [`Self::titles`].
    fn title(&self, record: &EpisodeRecord, opts: TitleOptions) -> Option<String>;

    /// Season/episode pair for a record. Scene-mapping overrides in the info
    /// blob win over the record's native numbers; non-numeric values degrade
    /// to unset. `None` for non-episode records.
    fn identifier(&self, record: &EpisodeRecord) -> Option<EpisodeIdentifier>;

    /// Idempotent creation keyed on `(kind, identifier)`: at most one row per
    /// distinct identifier, though repeated calls may still trigger a
    /// refresh. The new row is committed before the refresh so it is
    /// observable early; the returned record may be metadata-incomplete.
    async fn add(
        &self,
        attrs: EpisodeAttrs,
        refresh: RefreshMode,
    ) -> Result<EpisodeRecord, LibraryError>;

    /// Refreshes a row from the metadata provider.
    ///
    /// Returns `Ok(None)` when the host is shutting down, the identifier is
    /// unknown, or the provider has no usable info (logged, row untouched).
    /// A row already in `done` status skips the provider fetch unless
    /// `force` is set, but still returns its recomputed record.
    async fn update(
        &self,
        identifier: &str,
        default_title: &str,
        force: bool,
    ) -> Result<Option<EpisodeRecord>, LibraryError>;

    /// Deliberate no-op, kept so callers depending on it stay inert.
    async fn update_release_date(&self, identifier: &str);
}
