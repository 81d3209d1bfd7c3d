//! Domain types for the episode library.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Season/episode pair resolved for an episode record.
///
/// Scene mappings from the provider take precedence over the record's native
/// numbers; either side may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeIdentifier {
    pub season: Option<i32>,
    pub episode: Option<i32>,
}

impl fmt::Display for EpisodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => write!(f, "S{s:02}E{e:02}"),
            (Some(s), None) => write!(f, "S{s:02}"),
            (None, Some(e)) => write!(f, "E{e:02}"),
            (None, None) => write!(f, "S??E??"),
        }
    }
}

/// When (and how) `add` triggers a metadata refresh for the new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// No refresh; the row keeps its `needs_update` status.
    None,
    /// Refresh inline before `add` returns.
    #[default]
    Inline,
    /// Refresh on a spawned task; `add` returns immediately.
    Background,
}

/// Options for title resolution.
#[derive(Debug, Clone, Copy)]
pub struct TitleOptions {
    /// Append a zero-padded `E<NN>` suffix when the episode number resolves.
    pub include_identifier: bool,
    /// Simplify season titles (lowercase, punctuation stripped) first.
    pub condense: bool,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            include_identifier: true,
            condense: false,
        }
    }
}
