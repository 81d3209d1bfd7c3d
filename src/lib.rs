//! Episode library service for a personal media-library application.
//!
//! Episodes are created, identified, titled and refreshed from an external
//! metadata provider, and persisted through `SeaORM`. Provider lookups and
//! artifact downloads stay behind traits the host wires in at construction.

pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod parser;
pub mod providers;
pub mod services;

pub use config::Config;
pub use db::Store;
pub use domain::{EpisodeIdentifier, RefreshMode, TitleOptions};
pub use models::episode::{EpisodeAttrs, EpisodeRecord};
pub use parser::simplify_title;
pub use providers::{EpisodeInfo, EpisodeInfoParams, EpisodeInfoProvider};
pub use services::{
    EpisodeLibraryService, FileDownloader, HttpFileDownloader, LibraryError,
    SeaOrmEpisodeLibraryService,
};

use tracing_subscriber::EnvFilter;

/// Initializes tracing from the configured log level, honoring `RUST_LOG`
/// when set. Call once at host startup.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
