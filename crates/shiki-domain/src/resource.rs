//! Resource metadata returned by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Outcome of a lookup that reached the backend.
///
/// `Some` holds the resource; `None` is the missing marker, meaning the
/// backend confirmed that the resource does not exist.
pub type Lookup = Option<Resource>;

/// Metadata dictionary describing one resource (video, image, link preview).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// The `url` field, when present and a string.
    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(Value::as_str)
    }

    /// Rewrites a relative `url` field into an absolute one against `base`.
    pub fn absolutize_url(&mut self, base: &Url) {
        let Some(url) = self.url() else {
            return;
        };
        if url.is_empty() {
            return;
        }
        let fixed = fix_url(url, base);
        self.0.insert("url".to_string(), Value::String(fixed));
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Makes `url` absolute relative to `base`.
///
/// Absolute URLs are returned unchanged, protocol-relative ones take the
/// scheme of `base`, and paths are appended to `base` as written (the base
/// path is kept, unlike RFC 3986 reference resolution).
pub fn fix_url(url: &str, base: &Url) -> String {
    if Url::parse(url).is_ok() {
        return url.to_string();
    }
    if url.starts_with("//") {
        return format!("{}:{}", base.scheme(), url);
    }

    let prefix = base.as_str().trim_end_matches('/');
    if url.starts_with('/') {
        format!("{prefix}{url}")
    } else {
        format!("{prefix}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://shikimori.one").unwrap()
    }

    #[test]
    fn test_fix_url_prefixes_paths() {
        assert_eq!(fix_url("/x", &base()), "https://shikimori.one/x");
        assert_eq!(fix_url("x/y.png", &base()), "https://shikimori.one/x/y.png");
    }

    #[test]
    fn test_fix_url_keeps_absolute_urls() {
        assert_eq!(
            fix_url("http://youtube.com/watch?v=1", &base()),
            "http://youtube.com/watch?v=1"
        );
    }

    #[test]
    fn test_fix_url_takes_scheme_for_protocol_relative() {
        assert_eq!(fix_url("//cdn.host/a.jpg", &base()), "https://cdn.host/a.jpg");
    }

    #[test]
    fn test_fix_url_keeps_base_path() {
        let base = Url::parse("http://localhost:3000/app/").unwrap();
        assert_eq!(fix_url("/x", &base), "http://localhost:3000/app/x");
    }

    #[test]
    fn test_absolutize_url_only_touches_string_urls() {
        let mut resource: Resource =
            serde_json::from_value(json!({"id": 42, "url": "/x"})).unwrap();
        resource.absolutize_url(&base());
        assert_eq!(resource.url(), Some("https://shikimori.one/x"));
        assert_eq!(resource.get("id"), Some(&json!(42)));

        let mut without_url: Resource = serde_json::from_value(json!({"id": 1})).unwrap();
        without_url.absolutize_url(&base());
        assert_eq!(without_url.get("url"), None);

        let mut numeric_url: Resource = serde_json::from_value(json!({"url": 5})).unwrap();
        numeric_url.absolutize_url(&base());
        assert_eq!(numeric_url.get("url"), Some(&json!(5)));
    }

    #[test]
    fn test_missing_marker_deserializes_from_null() {
        let lookup: Lookup = serde_json::from_value(json!(null)).unwrap();
        assert!(lookup.is_none());
    }
}
