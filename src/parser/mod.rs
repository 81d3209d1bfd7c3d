pub mod title;

pub use title::{parse_int, parse_json_int, simplify_string, simplify_title};
