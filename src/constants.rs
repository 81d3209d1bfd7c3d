/// Provider assumed when `add` attrs carry none.
pub const DEFAULT_PROVIDER: &str = "thetvdb";

/// Media type tag for rows owned by this crate.
pub const EPISODE_KIND: &str = "episode";

pub mod status {
    pub const NEEDS_UPDATE: &str = "needs_update";
    pub const DONE: &str = "done";
}

pub mod file_kind {
    pub const IMAGE: &str = "image";
    pub const POSTER: &str = "poster";
}

/// Provider info keys that are host bookkeeping, not metadata. Stripped
/// before the blob is merged into a row.
pub const BOOKKEEPING_KEYS: &[&str] = &["in_wanted", "in_library"];
