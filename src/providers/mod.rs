//! Metadata provider contract.
//!
//! The host application wires a concrete provider (thetvdb, tmdb, ...) in at
//! service construction. Implementations are expected to apply their own
//! merge policy (provider results layered over defaults) before returning;
//! this crate only consumes the merged result.

use crate::parser::parse_json_int;
use serde_json::{Map, Value};

/// Lookup key for one episode's metadata.
#[derive(Debug, Clone, Default)]
pub struct EpisodeInfoParams {
    /// Identifier of the parent season library, if linked.
    pub season_identifier: Option<String>,
    pub episode_identifier: String,
    pub episode: Option<i32>,
    pub absolute: Option<i32>,
}

/// Image URLs grouped by type. Entries are raw JSON values because providers
/// occasionally return structured objects where URLs are expected; only
/// string entries are usable.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    pub posters: Vec<Value>,
}

/// Merged metadata for one episode, as returned by a provider.
#[derive(Debug, Clone, Default)]
pub struct EpisodeInfo {
    pub plot: Option<String>,
    pub tagline: Option<String>,
    pub year: Option<i32>,
    /// Best-effort numerics: number or numeric string, anything else is
    /// treated as unset.
    pub season_number: Option<Value>,
    pub episode_number: Option<Value>,
    pub absolute_number: Option<Value>,
    /// Provider refresh timestamp, epoch seconds.
    pub last_updated: Option<Value>,
    pub titles: Vec<String>,
    pub images: ImageSet,
    /// Full provider blob, merged verbatim into the row's info blob.
    pub raw: Map<String, Value>,
}

impl EpisodeInfo {
    /// Builds an info struct from a raw provider blob, pulling the typed
    /// fields out while keeping the blob itself for merging.
    #[must_use]
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let string_of = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };

        let titles = raw
            .get("titles")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let posters = raw
            .get("images")
            .and_then(|i| i.get("poster"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            plot: string_of("plot"),
            tagline: string_of("tagline"),
            year: raw.get("year").and_then(parse_json_int),
            season_number: raw.get("seasonnumber").cloned(),
            episode_number: raw.get("episodenumber").cloned(),
            absolute_number: raw.get("absolute_number").cloned(),
            last_updated: raw.get("lastupdated").cloned(),
            titles,
            images: ImageSet { posters },
            raw,
        }
    }

    /// No usable info at all. Treated as a failed lookup by `update`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Episode metadata lookup, implemented by the host's provider integration.
#[async_trait::async_trait]
pub trait EpisodeInfoProvider: Send + Sync {
    /// Fetches merged metadata for one episode. `Ok(None)` means the provider
    /// has nothing for this episode; transport failures are errors.
    async fn episode_info(&self, params: &EpisodeInfoParams)
    -> anyhow::Result<Option<EpisodeInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_raw_extracts_typed_fields() {
        let raw = json!({
            "plot": "An episode.",
            "year": 2008,
            "seasonnumber": "1",
            "episodenumber": 4,
            "titles": ["Foo", "Bar"],
            "images": {"poster": ["http://x/p.jpg", {"bad": true}]},
        });
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let info = EpisodeInfo::from_raw(map);

        assert_eq!(info.plot.as_deref(), Some("An episode."));
        assert_eq!(info.year, Some(2008));
        assert_eq!(info.titles, vec!["Foo", "Bar"]);
        assert_eq!(info.images.posters.len(), 2);
        assert!(!info.is_empty());
    }

    #[test]
    fn empty_blob_is_empty() {
        assert!(EpisodeInfo::from_raw(Map::new()).is_empty());
    }
}
