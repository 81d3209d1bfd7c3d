pub use super::episode_files::Entity as EpisodeFiles;
pub use super::episode_library::Entity as EpisodeLibrary;
pub use super::files::Entity as Files;
pub use super::library_titles::Entity as LibraryTitles;
pub use super::season_library::Entity as SeasonLibrary;
pub use super::statuses::Entity as Statuses;
