//! `SeaORM` implementation of the [`EpisodeLibraryService`] trait.

use crate::config::Config;
use crate::constants::{BOOKKEEPING_KEYS, EPISODE_KIND, file_kind, status};
use crate::db::{NewEpisode, NewTitle, RefreshFields, Store};
use crate::domain::{EpisodeIdentifier, RefreshMode, TitleOptions};
use crate::models::episode::{EpisodeAttrs, EpisodeRecord};
use crate::parser::{parse_int, parse_json_int, simplify_string, simplify_title};
use crate::providers::{EpisodeInfoParams, EpisodeInfoProvider};
use crate::services::download::FileDownloader;
use crate::services::episode_service::{EpisodeLibraryService, LibraryError};

use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};

/// Epoch-seconds coercion for provider timestamps; numbers or numeric
/// strings, anything else is unset.
fn parse_json_epoch(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// SeaORM-backed episode library service.
///
/// Collaborators (provider, downloader) are injected at construction; the
/// shutdown flag is owned by the host and checked at the top of `update`
/// only, so a refresh already in flight is not preempted.
#[derive(Clone)]
pub struct SeaOrmEpisodeLibraryService {
    store: Store,
    provider: Arc<dyn EpisodeInfoProvider>,
    downloader: Arc<dyn FileDownloader>,
    config: Config,
    shutdown: Arc<AtomicBool>,
}

impl SeaOrmEpisodeLibraryService {
    #[must_use]
    pub fn new(
        store: Store,
        provider: Arc<dyn EpisodeInfoProvider>,
        downloader: Arc<dyn FileDownloader>,
        config: Config,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            provider,
            downloader,
            config,
            shutdown,
        }
    }

    fn shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Builds the replacement title set from provider titles, skipping empty
    /// entries. The default flag lands on the first title when no explicit
    /// default was requested, when there is exactly one title, when a title
    /// matches the requested default case-insensitively, or when the
    /// requested default was empty and the title equals the provider's first.
    fn build_titles(provider_titles: &[String], default_title: &str) -> Vec<NewTitle> {
        let requested = default_title.to_lowercase();
        let first = provider_titles.first();

        let mut titles = Vec::new();
        let mut counter = 0;
        for title in provider_titles {
            if title.is_empty() {
                continue;
            }

            let is_default = (default_title.is_empty() && counter == 0)
                || provider_titles.len() == 1
                || title.to_lowercase() == requested
                || (default_title.is_empty() && first == Some(title));

            titles.push(NewTitle {
                title: title.clone(),
                simple_title: simplify_title(title),
                is_default,
            });
            counter += 1;
        }

        titles
    }

    /// Registers a downloaded poster, reloads it by id and links it to the
    /// episode. The file registry is shared; the episode only references it.
    async fn attach_poster(&self, episode_id: i32, path: &Path) -> anyhow::Result<()> {
        let files = self.store.files();

        let file = files
            .get_or_add(
                &path.to_string_lossy(),
                file_kind::IMAGE,
                file_kind::POSTER,
            )
            .await?;

        let file = files
            .get(file.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("File {} vanished after registration", file.id))?;

        self.store.episodes().attach_file(episode_id, file.id).await
    }

    /// Downloads and attaches the first usable poster. Per-image failures
    /// are logged at debug level and the next candidate is tried.
    async fn fetch_posters(&self, episode_id: i32, posters: &[Value]) {
        for image in posters {
            let Some(url) = image.as_str() else {
                continue;
            };

            let path = match self.downloader.download(url).await {
                Ok(path) => path,
                Err(e) => {
                    debug!(url = %url, error = %e, "Poster download failed");
                    continue;
                }
            };

            match self.attach_poster(episode_id, &path).await {
                Ok(()) => break,
                Err(e) => {
                    debug!(url = %url, error = %e, "Failed to attach poster to library");
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl EpisodeLibraryService for SeaOrmEpisodeLibraryService {
    fn titles(&self, record: &EpisodeRecord, opts: TitleOptions) -> Option<Vec<String>> {
        if record.kind != EPISODE_KIND {
            return None;
        }

        let season = match &record.season {
            Some(season) if !season.titles.is_empty() => season,
            _ => {
                warn!(
                    identifier = %record.identifier,
                    "Invalid library, unable to determine title"
                );
                return None;
            }
        };

        let mut titles: Vec<String> = season
            .titles
            .iter()
            .map(|t| {
                if opts.condense {
                    simplify_string(t)
                } else {
                    t.clone()
                }
            })
            .collect();

        // Episode 0 is specials-style numbering and gets no suffix.
        if opts.include_identifier
            && let Some(episode) = self.identifier(record).and_then(|id| id.episode)
            && episode != 0
        {
            titles = titles
                .into_iter()
                .map(|t| format!("{t}E{episode:02}"))
                .collect();
        }

        Some(titles)
    }

    fn title(&self, record: &EpisodeRecord, opts: TitleOptions) -> Option<String> {
        self.titles(record, opts)
            .and_then(|titles| titles.into_iter().next())
    }

    fn identifier(&self, record: &EpisodeRecord) -> Option<EpisodeIdentifier> {
        if record.kind != EPISODE_KIND {
            return None;
        }

        // An empty scene object means no override at all.
        let scene = record
            .info
            .get("map_episode")
            .and_then(|m| m.get("scene"))
            .and_then(Value::as_object)
            .filter(|scene| !scene.is_empty());

        // TODO: support trailing 'a'/'b' suffixes on episode numbers
        let identifier = scene.map_or(
            EpisodeIdentifier {
                season: record.season_number,
                episode: record.episode_number,
            },
            |scene| EpisodeIdentifier {
                season: scene.get("season").and_then(parse_json_int),
                episode: scene.get("episode").and_then(parse_json_int),
            },
        );

        Some(identifier)
    }

    async fn add(
        &self,
        attrs: EpisodeAttrs,
        refresh: RefreshMode,
    ) -> Result<EpisodeRecord, LibraryError> {
        let kind = attrs
            .kind
            .clone()
            .unwrap_or_else(|| EPISODE_KIND.to_string());
        let primary_provider = attrs
            .primary_provider
            .clone()
            .unwrap_or_else(|| self.config.provider.primary_provider.clone());

        let episodes = self.store.episodes();

        let existing = episodes
            .find_by_kind_identifier(&kind, &attrs.identifier)
            .await?;

        let row = if let Some(row) = existing {
            row
        } else {
            let status = self
                .store
                .statuses()
                .get_or_add(status::NEEDS_UPDATE)
                .await?;

            let parent_id = match &attrs.parent_identifier {
                Some(parent_identifier) => self
                    .store
                    .seasons()
                    .find_by_provider_identifier(&primary_provider, parent_identifier)
                    .await?
                    .map(|season| season.id),
                None => None,
            };

            let initial_title = attrs.title.as_ref().map(|title| NewTitle {
                title: title.clone(),
                simple_title: simplify_title(title),
                is_default: false,
            });

            episodes
                .insert(
                    NewEpisode {
                        kind: kind.clone(),
                        primary_provider,
                        identifier: attrs.identifier.clone(),
                        year: attrs.year,
                        plot: attrs.plot.clone(),
                        tagline: attrs.tagline.clone(),
                        status_id: status.id,
                        season_number: parse_int(attrs.season_number.as_deref()),
                        episode_number: parse_int(attrs.episode_number.as_deref()),
                        absolute_number: parse_int(attrs.absolute_number.as_deref()),
                        parent_id,
                    },
                    initial_title,
                )
                .await?
        };

        let default_title = attrs.title.unwrap_or_default();
        match refresh {
            RefreshMode::None => {}
            RefreshMode::Inline => {
                if let Err(e) = self.update(&row.identifier, &default_title, false).await {
                    warn!(identifier = %row.identifier, error = %e, "Refresh after add failed");
                }
            }
            RefreshMode::Background => {
                let service = self.clone();
                let identifier = row.identifier.clone();
                tokio::spawn(async move {
                    if let Err(e) = service.update(&identifier, &default_title, false).await {
                        warn!(identifier = %identifier, error = %e, "Background refresh failed");
                    }
                });
            }
        }

        // Reload so an inline refresh shows up in the returned record.
        let row = episodes
            .find_by_kind_identifier(&kind, &row.identifier)
            .await?
            .unwrap_or(row);

        Ok(episodes.load_record(&row).await?)
    }

    async fn update(
        &self,
        identifier: &str,
        default_title: &str,
        force: bool,
    ) -> Result<Option<EpisodeRecord>, LibraryError> {
        if self.shutting_down() {
            return Ok(None);
        }

        let episodes = self.store.episodes();

        let Some(row) = episodes.find_by_identifier(identifier).await? else {
            warn!(identifier = %identifier, "Unknown library identifier, nothing to update");
            return Ok(None);
        };

        let done = self.store.statuses().get_or_add(status::DONE).await?;
        let do_update = force || row.status_id != done.id;

        if do_update {
            let parent_identifier = episodes.parent(&row).await?.map(|season| season.identifier);

            let params = EpisodeInfoParams {
                season_identifier: parent_identifier,
                episode_identifier: identifier.to_string(),
                episode: row.episode_number,
                absolute: row.absolute_number,
            };

            let info = match self.provider.episode_info(&params).await {
                Ok(Some(info)) => info,
                Ok(None) => {
                    error!(identifier = %identifier, "Could not update, no episode info to work with");
                    return Ok(None);
                }
                Err(e) => {
                    error!(identifier = %identifier, error = %e, "Episode info lookup failed");
                    return Ok(None);
                }
            };

            // Host bookkeeping keys have no place in the info blob.
            let mut raw = info.raw.clone();
            for key in BOOKKEEPING_KEYS {
                raw.remove(*key);
            }

            if raw.is_empty() {
                error!(identifier = %identifier, "Could not update, no episode info to work with");
                return Ok(None);
            }

            let mut merged: Map<String, Value> =
                serde_json::from_str(&row.info).unwrap_or_default();
            merged.extend(raw);

            let last_updated = info
                .last_updated
                .as_ref()
                .and_then(parse_json_epoch)
                .unwrap_or_else(|| chrono::Utc::now().timestamp());

            episodes
                .apply_refresh(
                    row.id,
                    RefreshFields {
                        plot: info.plot.clone(),
                        tagline: info.tagline.clone(),
                        year: info.year,
                        status_id: done.id,
                        season_number: info.season_number.as_ref().and_then(parse_json_int),
                        episode_number: info.episode_number.as_ref().and_then(parse_json_int),
                        absolute_number: info.absolute_number.as_ref().and_then(parse_json_int),
                        last_updated,
                        info: serde_json::to_string(&merged)
                            .unwrap_or_else(|_| "{}".to_string()),
                    },
                )
                .await?;

            debug!(identifier = %identifier, titles = ?info.titles, "Replacing titles");
            let titles = Self::build_titles(&info.titles, default_title);
            episodes.replace_titles(row.id, &titles).await?;

            if self.config.downloads.fetch_posters {
                self.fetch_posters(row.id, &info.images.posters).await;
            }
        }

        let Some(row) = episodes.find_by_identifier(identifier).await? else {
            return Ok(None);
        };

        Ok(Some(episodes.load_record(&row).await?))
    }

    async fn update_release_date(&self, _identifier: &str) {
        // Deliberate stub: release-date refresh never shipped for episodes
        // and callers rely on it staying inert.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(provider_titles: &[&str], default_title: &str) -> Vec<NewTitle> {
        let owned: Vec<String> = provider_titles.iter().map(ToString::to_string).collect();
        SeaOrmEpisodeLibraryService::build_titles(&owned, default_title)
    }

    #[test]
    fn default_flag_lands_on_first_title() {
        let titles = build(&["Foo", "Bar"], "");
        assert_eq!(titles.len(), 2);
        assert!(titles[0].is_default);
        assert!(!titles[1].is_default);
    }

    #[test]
    fn default_flag_matches_requested_case_insensitively() {
        let titles = build(&["Foo", "Bar"], "bAr");
        assert!(!titles[0].is_default);
        assert!(titles[1].is_default);
    }

    #[test]
    fn single_title_is_always_default() {
        let titles = build(&["Foo"], "something else");
        assert!(titles[0].is_default);
    }

    #[test]
    fn empty_titles_are_skipped() {
        let titles = build(&["", "Foo"], "");
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].title, "Foo");
        assert!(titles[0].is_default);
    }

    #[test]
    fn epoch_coercion_degrades_to_unset() {
        use serde_json::json;
        assert_eq!(parse_json_epoch(&json!(1_700_000_000)), Some(1_700_000_000));
        assert_eq!(parse_json_epoch(&json!("1700000000")), Some(1_700_000_000));
        assert_eq!(parse_json_epoch(&json!("soon")), None);
        assert_eq!(parse_json_epoch(&json!({})), None);
    }
}
