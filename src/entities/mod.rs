pub mod prelude;

pub mod episode_files;
pub mod episode_library;
pub mod files;
pub mod library_titles;
pub mod season_library;
pub mod statuses;
