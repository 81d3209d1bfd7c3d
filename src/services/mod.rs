pub mod download;
pub use download::{FileDownloader, HttpFileDownloader};

pub mod episode_service;
pub use episode_service::{EpisodeLibraryService, LibraryError};

pub mod episode_service_impl;
pub use episode_service_impl::SeaOrmEpisodeLibraryService;
