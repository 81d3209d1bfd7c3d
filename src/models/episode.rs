//! Plain-data views of library rows.
//!
//! Repositories assemble these from entity models; nothing outside `db`
//! touches `sea-orm` rows directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input attributes for `add`. Everything except `identifier` is optional;
/// numeric fields arrive as raw strings from scraped sources and are coerced
/// best-effort (invalid input becomes unset, never an error).
#[derive(Debug, Clone, Default)]
pub struct EpisodeAttrs {
    /// Media type tag, defaults to `episode`.
    pub kind: Option<String>,
    /// Metadata provider, defaults to the configured primary provider.
    pub primary_provider: Option<String>,
    /// Identifier of the parent season library, if known.
    pub parent_identifier: Option<String>,
    pub identifier: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub tagline: Option<String>,
    pub season_number: Option<String>,
    pub episode_number: Option<String>,
    pub absolute_number: Option<String>,
    pub title: Option<String>,
}

/// One display title attached to an episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRecord {
    pub id: i32,
    pub title: String,
    pub simple_title: String,
    pub is_default: bool,
}

/// A registered artifact (poster image) referenced by an episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i32,
    pub path: String,
    pub kind_primary: String,
    pub kind_sub: String,
}

/// Summary view of the parent season, with its resolved titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: i32,
    pub identifier: String,
    pub season_number: Option<i32>,
    pub titles: Vec<String>,
}

/// Serialized view of one episode row, with nested titles, files and the
/// parent season. This is what every service operation returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: i32,
    pub kind: String,
    pub primary_provider: String,
    pub identifier: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub tagline: Option<String>,
    /// Status identifier: `needs_update` or `done`.
    pub status: String,
    /// Merged provider info blob.
    pub info: Map<String, Value>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub absolute_number: Option<i32>,
    /// Epoch seconds of the last successful refresh.
    pub last_updated: Option<i64>,
    pub titles: Vec<TitleRecord>,
    pub files: Vec<FileRecord>,
    pub season: Option<SeasonSummary>,
}
