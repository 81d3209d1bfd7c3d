use regex::Regex;
use std::sync::OnceLock;

/// Best-effort integer coercion. Non-numeric or missing input degrades to
/// `None`, it never errors.
#[must_use]
pub fn parse_int(value: Option<&str>) -> Option<i32> {
    value.and_then(|v| v.trim().parse::<i32>().ok())
}

/// Integer coercion for JSON values that may be numbers or numeric strings.
/// Anything else is unset.
#[must_use]
pub fn parse_json_int(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        serde_json::Value::String(s) => parse_int(Some(s)),
        _ => None,
    }
}

/// Lowercases, strips punctuation and collapses whitespace for fuzzy
/// title matching.
#[must_use]
pub fn simplify_string(input: &str) -> String {
    static RE_STRIP: OnceLock<Regex> = OnceLock::new();
    static RE_SPACES: OnceLock<Regex> = OnceLock::new();

    let strip = RE_STRIP.get_or_init(|| Regex::new(r"[^a-z0-9 ]").expect("Invalid regex"));
    let spaces = RE_SPACES.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"));

    let lowered = input.to_lowercase();
    let stripped = strip.replace_all(&lowered, " ");
    spaces.replace_all(stripped.trim(), " ").into_owned()
}

/// Normalizes a title for matching and sorting.
///
/// Titles that do not start with an ASCII letter get a `#` marker prefix,
/// then the string is simplified and a single leading `the ` is dropped.
/// Pure function of its input; an empty title stays empty.
#[must_use]
pub fn simplify_title(title: &str) -> String {
    let marker = match title.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => "",
        Some(_) => "#",
        None => return String::new(),
    };

    let mut simple = simplify_string(title);

    for prefix in ["the "] {
        if let Some(rest) = simple.strip_prefix(prefix) {
            simple = rest.to_string();
            break;
        }
    }

    format!("{marker}{simple}")
}
