//! Artifact download collaborator.
//!
//! Poster fetching is the only place this crate touches the network, and the
//! host may replace it entirely. The default implementation writes into the
//! configured images directory.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

/// Downloads a remote artifact and returns the local path it was saved to.
#[async_trait::async_trait]
pub trait FileDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<PathBuf>;
}

/// Reqwest-backed downloader storing artifacts under the images directory.
pub struct HttpFileDownloader {
    client: reqwest::Client,
    images_dir: PathBuf,
}

impl HttpFileDownloader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.downloads.timeout_seconds))
            .build()
            .context("Failed to build download client")?;

        Ok(Self {
            client,
            images_dir: PathBuf::from(&config.general.images_path),
        })
    }
}

#[async_trait::async_trait]
impl FileDownloader for HttpFileDownloader {
    async fn download(&self, url: &str) -> Result<PathBuf> {
        let extension = Path::new(url)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);

        if !self.images_dir.exists() {
            fs::create_dir_all(&self.images_dir).await?;
        }

        let file_path = self.images_dir.join(filename);

        info!(url = %url, path = %file_path.display(), "Downloading artifact");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write artifact to {}", file_path.display()))?;

        Ok(file_path)
    }
}
