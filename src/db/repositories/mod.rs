pub mod episode;
pub mod file;
pub mod season;
pub mod status;
