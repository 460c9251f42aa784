use once_cell::sync::Lazy;
use regex::Regex;

static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?:)?//").expect("static regex"));
static TRAILING_API: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/api/?$").expect("static regex"));

/// Origin that serves uploaded assets: the API base without a trailing `/api`
/// and without trailing slashes. An empty base yields an empty origin.
pub fn media_origin(api_base_url: &str) -> String {
    let raw = api_base_url.trim();
    if raw.is_empty() {
        return String::new();
    }
    TRAILING_API.replace(raw, "").trim_end_matches('/').to_string()
}

/// Turns a stored media url into one that can be fetched.
pub fn resolve_media_url(raw: Option<&str>, origin: &str) -> String {
    let url = raw.unwrap_or_default().trim();
    if url.is_empty() {
        return String::new();
    }
    if ABSOLUTE_URL.is_match(url) {
        return url.to_string();
    }
    let path = if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{url}")
    };
    format!("{origin}{path}")
}
