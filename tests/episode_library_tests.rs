//! Integration tests for the episode library service, run against an
//! in-memory sqlite store with mock provider and downloader collaborators.

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{Map, Value, json};
use showlib::entities::{prelude::*, season_library};
use showlib::models::episode::SeasonSummary;
use showlib::{
    Config, EpisodeAttrs, EpisodeInfo, EpisodeInfoParams, EpisodeInfoProvider,
    EpisodeLibraryService, EpisodeRecord, FileDownloader, RefreshMode,
    SeaOrmEpisodeLibraryService, Store, TitleOptions,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct MockProvider {
    blob: Mutex<Option<Map<String, Value>>>,
    calls: AtomicUsize,
    last_params: Mutex<Option<EpisodeInfoParams>>,
}

impl MockProvider {
    fn new(blob: Option<Value>) -> Arc<Self> {
        Arc::new(Self {
            blob: Mutex::new(blob.map(as_map)),
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        })
    }

    fn set_blob(&self, blob: Value) {
        *self.blob.lock().unwrap() = Some(as_map(blob));
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EpisodeInfoProvider for MockProvider {
    async fn episode_info(
        &self,
        params: &EpisodeInfoParams,
    ) -> anyhow::Result<Option<EpisodeInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        Ok(self
            .blob
            .lock()
            .unwrap()
            .clone()
            .map(EpisodeInfo::from_raw))
    }
}

struct MockDownloader {
    // None means every download fails.
    dir: Option<tempfile::TempDir>,
    counter: AtomicUsize,
}

impl MockDownloader {
    fn working() -> Arc<Self> {
        Arc::new(Self {
            dir: Some(tempfile::tempdir().expect("tempdir")),
            counter: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            dir: None,
            counter: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl FileDownloader for MockDownloader {
    async fn download(&self, _url: &str) -> anyhow::Result<PathBuf> {
        let Some(dir) = &self.dir else {
            anyhow::bail!("download disabled");
        };

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = dir.path().join(format!("poster-{n}.jpg"));
        tokio::fs::write(&path, b"image bytes").await?;
        Ok(path)
    }
}

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("blob must be a JSON object"),
    }
}

async fn setup(
    provider: Arc<MockProvider>,
    downloader: Arc<MockDownloader>,
) -> (Store, SeaOrmEpisodeLibraryService, Arc<AtomicBool>) {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("store");
    let shutdown = Arc::new(AtomicBool::new(false));
    let service = SeaOrmEpisodeLibraryService::new(
        store.clone(),
        provider,
        downloader,
        Config::default(),
        shutdown.clone(),
    );
    (store, service, shutdown)
}

async fn seed_season(store: &Store, identifier: &str) {
    let season = season_library::ActiveModel {
        primary_provider: Set("thetvdb".to_string()),
        identifier: Set(identifier.to_string()),
        season_number: Set(Some(1)),
        title: Set(Some("Show Season 1".to_string())),
        info: Set(json!({"titles": ["Show S01"]}).to_string()),
        ..Default::default()
    };
    season.insert(&store.conn).await.expect("seed season");
}

fn episode_attrs(identifier: &str) -> EpisodeAttrs {
    EpisodeAttrs {
        identifier: identifier.to_string(),
        title: Some("Pilot".to_string()),
        season_number: Some("1".to_string()),
        episode_number: Some("4".to_string()),
        ..Default::default()
    }
}

fn provider_blob() -> Value {
    json!({
        "plot": "An episode plot.",
        "tagline": "A tagline.",
        "year": 2008,
        "seasonnumber": "1",
        "episodenumber": 4,
        "absolute_number": 4,
        "lastupdated": "1700000000",
        "titles": ["Foo", "Bar"],
        "in_wanted": {"status": "active"},
        "in_library": false,
    })
}

fn bare_record(kind: &str, info: Value, season: Option<SeasonSummary>) -> EpisodeRecord {
    EpisodeRecord {
        id: 1,
        kind: kind.to_string(),
        primary_provider: "thetvdb".to_string(),
        identifier: "ep-1".to_string(),
        year: None,
        plot: None,
        tagline: None,
        status: "needs_update".to_string(),
        info: as_map(info),
        season_number: Some(1),
        episode_number: Some(4),
        absolute_number: None,
        last_updated: None,
        titles: vec![],
        files: vec![],
        season,
    }
}

fn show_season() -> SeasonSummary {
    SeasonSummary {
        id: 1,
        identifier: "tvdb-show1-s1".to_string(),
        season_number: Some(1),
        titles: vec!["Show S01".to_string()],
    }
}

// ---------------------------------------------------------------------------
// identifier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identifier_returns_none_for_non_episode() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("season", json!({}), None);
    assert!(service.identifier(&record).is_none());
}

#[tokio::test]
async fn identifier_prefers_scene_mapping_over_native_numbers() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record(
        "episode",
        json!({"map_episode": {"scene": {"season": "2", "episode": 5}}}),
        None,
    );

    let id = service.identifier(&record).expect("identifier");
    assert_eq!(id.season, Some(2));
    assert_eq!(id.episode, Some(5));
}

#[tokio::test]
async fn identifier_falls_back_to_native_numbers() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("episode", json!({}), None);

    let id = service.identifier(&record).expect("identifier");
    assert_eq!(id.season, Some(1));
    assert_eq!(id.episode, Some(4));
}

#[tokio::test]
async fn identifier_ignores_empty_scene_mapping() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("episode", json!({"map_episode": {"scene": {}}}), None);

    let id = service.identifier(&record).expect("identifier");
    assert_eq!(id.season, Some(1));
    assert_eq!(id.episode, Some(4));
}

#[tokio::test]
async fn identifier_degrades_non_numeric_scene_values_to_unset() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record(
        "episode",
        json!({"map_episode": {"scene": {"season": "two", "episode": "3a"}}}),
        None,
    );

    let id = service.identifier(&record).expect("identifier");
    assert_eq!(id.season, None);
    assert_eq!(id.episode, None);
}

// ---------------------------------------------------------------------------
// titles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn titles_append_zero_padded_episode_suffix() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("episode", json!({}), Some(show_season()));

    let titles = service.titles(&record, TitleOptions::default()).expect("titles");
    assert_eq!(titles, vec!["Show S01E04".to_string()]);

    let first = service.title(&record, TitleOptions::default()).expect("title");
    assert_eq!(first, "Show S01E04");
}

#[tokio::test]
async fn titles_without_identifier_suffix() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("episode", json!({}), Some(show_season()));
    let opts = TitleOptions {
        include_identifier: false,
        condense: false,
    };

    let titles = service.titles(&record, opts).expect("titles");
    assert_eq!(titles, vec!["Show S01".to_string()]);
}

#[tokio::test]
async fn titles_skip_suffix_for_episode_zero() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let mut record = bare_record("episode", json!({}), Some(show_season()));
    record.episode_number = Some(0);

    let titles = service.titles(&record, TitleOptions::default()).expect("titles");
    assert_eq!(titles, vec!["Show S01".to_string()]);
}

#[tokio::test]
async fn titles_condense_season_titles_before_suffix() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let mut season = show_season();
    season.titles = vec!["Re:Zero Season 1!".to_string()];
    let record = bare_record("episode", json!({}), Some(season));
    let opts = TitleOptions {
        include_identifier: true,
        condense: true,
    };

    let titles = service.titles(&record, opts).expect("titles");
    assert_eq!(titles, vec!["re zero season 1E04".to_string()]);
}

#[tokio::test]
async fn titles_return_none_without_related_season() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let record = bare_record("episode", json!({}), None);
    assert!(service.titles(&record, TitleOptions::default()).is_none());
    assert!(service.title(&record, TitleOptions::default()).is_none());
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_twice_creates_exactly_one_row() {
    let (store, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("first add");
    service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("second add");

    let count = EpisodeLibrary::find().count(&store.conn).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn add_without_refresh_keeps_defaults() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider.clone(), MockDownloader::failing()).await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("add");

    assert_eq!(record.status, "needs_update");
    assert_eq!(record.plot, None);
    assert_eq!(record.tagline, None);
    assert_eq!(record.season_number, Some(1));
    assert_eq!(record.episode_number, Some(4));
    assert_eq!(record.titles.len(), 1);
    assert_eq!(record.titles[0].title, "Pilot");
    assert_eq!(record.titles[0].simple_title, "pilot");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn add_with_inline_refresh_returns_completed_record() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider.clone(), MockDownloader::failing()).await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");

    assert_eq!(record.status, "done");
    assert_eq!(record.plot.as_deref(), Some("An episode plot."));
    assert_eq!(record.year, Some(2008));
    assert_eq!(record.last_updated, Some(1_700_000_000));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn add_with_background_refresh_completes_eventually() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider.clone(), MockDownloader::failing()).await;

    // The returned status may be either value depending on how far the
    // spawned refresh got, so only the eventual state is asserted.
    service
        .add(episode_attrs("ep-1"), RefreshMode::Background)
        .await
        .expect("add");

    // Re-reading through a no-refresh add never triggers the provider, so a
    // `done` status can only come from the spawned task.
    let mut refreshed = None;
    for _ in 0..200 {
        let current = service
            .add(episode_attrs("ep-1"), RefreshMode::None)
            .await
            .expect("re-read");
        if current.status == "done" {
            refreshed = Some(current);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let refreshed = refreshed.expect("background refresh never completed");
    assert_eq!(refreshed.plot.as_deref(), Some("An episode plot."));
}

#[tokio::test]
async fn add_links_parent_season_by_provider_and_identifier() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (store, service, _) = setup(provider.clone(), MockDownloader::failing()).await;
    seed_season(&store, "tvdb-show1-s1").await;

    let mut attrs = episode_attrs("ep-1");
    attrs.parent_identifier = Some("tvdb-show1-s1".to_string());

    let record = service.add(attrs, RefreshMode::Inline).await.expect("add");

    let season = record.season.expect("season link");
    assert_eq!(season.identifier, "tvdb-show1-s1");
    assert_eq!(season.titles, vec!["Show S01".to_string()]);

    // The provider lookup was keyed on the parent season identifier.
    let params = provider.last_params.lock().unwrap().clone().expect("params");
    assert_eq!(params.season_identifier.as_deref(), Some("tvdb-show1-s1"));
    assert_eq!(params.episode_identifier, "ep-1");
    assert_eq!(params.episode, Some(4));
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_done_row_skips_provider_unless_forced() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider.clone(), MockDownloader::failing()).await;

    service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");
    assert_eq!(provider.calls(), 1);

    provider.set_blob(json!({"plot": "A different plot.", "titles": ["Foo"]}));

    let record = service
        .update("ep-1", "", false)
        .await
        .expect("update")
        .expect("record");
    assert_eq!(provider.calls(), 1);
    assert_eq!(record.plot.as_deref(), Some("An episode plot."));

    let record = service
        .update("ep-1", "", true)
        .await
        .expect("forced update")
        .expect("record");
    assert_eq!(provider.calls(), 2);
    assert_eq!(record.plot.as_deref(), Some("A different plot."));
}

#[tokio::test]
async fn update_with_empty_provider_info_leaves_row_unchanged() {
    let provider = MockProvider::new(Some(json!({})));
    let (_, service, _) = setup(provider, MockDownloader::failing()).await;

    service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("add");

    let result = service.update("ep-1", "", false).await.expect("update");
    assert!(result.is_none());

    // Row untouched: still waiting for a usable refresh.
    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("re-read");
    assert_eq!(record.status, "needs_update");
    assert_eq!(record.plot, None);
    assert_eq!(record.titles.len(), 1);
}

#[tokio::test]
async fn update_unknown_identifier_returns_none() {
    let (_, service, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let result = service.update("nope", "", false).await.expect("update");
    assert!(result.is_none());
}

#[tokio::test]
async fn update_strips_bookkeeping_keys_from_info() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider, MockDownloader::failing()).await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");

    assert!(!record.info.contains_key("in_wanted"));
    assert!(!record.info.contains_key("in_library"));
    assert_eq!(
        record.info.get("plot").and_then(Value::as_str),
        Some("An episode plot.")
    );
}

#[tokio::test]
async fn update_replaces_titles_and_flags_first_as_default() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider, MockDownloader::failing()).await;

    let mut attrs = episode_attrs("ep-1");
    attrs.title = None;
    service.add(attrs, RefreshMode::None).await.expect("add");

    let record = service
        .update("ep-1", "", false)
        .await
        .expect("update")
        .expect("record");

    assert_eq!(record.titles.len(), 2);
    let defaults: Vec<_> = record.titles.iter().filter(|t| t.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].title, "Foo");
}

#[tokio::test]
async fn update_falls_back_to_now_for_unparsable_timestamp() {
    let mut blob = provider_blob();
    blob["lastupdated"] = json!("not a timestamp");
    let provider = MockProvider::new(Some(blob));
    let (_, service, _) = setup(provider, MockDownloader::failing()).await;

    let before = chrono::Utc::now().timestamp();
    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");

    let last_updated = record.last_updated.expect("last_updated");
    assert!(last_updated >= before);
}

#[tokio::test]
async fn update_blocked_during_shutdown() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, shutdown) = setup(provider.clone(), MockDownloader::failing()).await;

    service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("add");

    shutdown.store(true, Ordering::SeqCst);

    let result = service.update("ep-1", "", true).await.expect("update");
    assert!(result.is_none());
    assert_eq!(provider.calls(), 0);
}

// ---------------------------------------------------------------------------
// posters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_attaches_first_string_poster() {
    let mut blob = provider_blob();
    blob["images"] = json!({
        "poster": [{"not": "a url"}, "http://example.test/p1.jpg", "http://example.test/p2.jpg"]
    });
    let provider = MockProvider::new(Some(blob));
    let downloader = MockDownloader::working();
    let (_, service, _) = setup(provider, downloader.clone()).await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");

    // First usable URL wins; the second is never tried.
    assert_eq!(record.files.len(), 1);
    assert_eq!(record.files[0].kind_primary, "image");
    assert_eq!(record.files[0].kind_sub, "poster");
    assert_eq!(downloader.counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn poster_download_failures_do_not_fail_update() {
    let mut blob = provider_blob();
    blob["images"] = json!({"poster": ["http://example.test/p1.jpg"]});
    let provider = MockProvider::new(Some(blob));
    let (_, service, _) = setup(provider, MockDownloader::failing()).await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::Inline)
        .await
        .expect("add");

    assert_eq!(record.status, "done");
    assert!(record.files.is_empty());
}

// ---------------------------------------------------------------------------
// release date stub, statuses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_release_date_is_inert() {
    let provider = MockProvider::new(Some(provider_blob()));
    let (_, service, _) = setup(provider.clone(), MockDownloader::failing()).await;

    service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("add");

    service.update_release_date("ep-1").await;

    let record = service
        .add(episode_attrs("ep-1"), RefreshMode::None)
        .await
        .expect("re-read");
    assert_eq!(record.status, "needs_update");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn store_from_config_creates_configured_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_file = dir.path().join("showlib.db");

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_file.display());
    config.general.max_db_connections = 2;
    config.general.min_db_connections = 1;

    let store = Store::from_config(&config).await.expect("store");
    store.ping().await.expect("ping");
    assert!(db_file.exists());
}

#[tokio::test]
async fn status_lookup_is_get_or_create() {
    let (store, _, _) = setup(MockProvider::new(None), MockDownloader::failing()).await;

    let first = store.statuses().get_or_add("needs_update").await.unwrap();
    let second = store.statuses().get_or_add("needs_update").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.label, "Needs update");
}
