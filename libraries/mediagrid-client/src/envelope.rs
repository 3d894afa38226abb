//! Typed envelopes for MediaGrid responses.
//!
//! Every successful non-DELETE call returns either a single resource
//! (`EntryDoc`) or a collection with pagination links (`FeedDoc`). The
//! resource-specific payload under `content` stays untyped
//! (`serde_json::Value`); accessor helpers cover the common
//! `content.params.*` shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Link relation that marks the continuation of a paginated feed.
pub const REL_NEXT: &str = "next";

/// Top-level wrapper for a single-resource response: `{"entry": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDoc {
    pub entry: Entry,
}

/// Top-level wrapper for a collection response: `{"feed": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDoc {
    pub feed: Feed,
}

impl FeedDoc {
    /// URL of the next page, if any.
    pub fn next_link(&self) -> Option<&str> {
        self.feed.next_link()
    }
}

/// One remote resource instance.
///
/// `id` is the canonical URL of the instance (services accept it verbatim
/// as a request path). Everything else lives under `content`, whose exact
/// shape is resource-specific.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    /// Sections outside `content` (e.g. a job's cdn_report)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Look up `content.params.<name>`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.content.get("params")?.get(name)
    }

    /// Look up `content.params.<name>` as a string.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.param(name)?.as_str()
    }

    /// Look up `content.params.<name>` as an integer.
    ///
    /// Services are inconsistent about numeric params and sometimes send
    /// them as JSON strings; both forms are accepted.
    pub fn param_i64(&self, name: &str) -> Option<i64> {
        match self.param(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Set `content.params.<name>`, creating the intermediate objects if
    /// the entry did not have them yet.
    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) {
        if !self.content.is_object() {
            self.content = Value::Object(Map::new());
        }
        let content = self.content.as_object_mut().expect("content is an object");
        let params = content
            .entry("params")
            .or_insert_with(|| Value::Object(Map::new()));
        if !params.is_object() {
            *params = Value::Object(Map::new());
        }
        params
            .as_object_mut()
            .expect("params is an object")
            .insert(name.to_string(), value.into());
    }
}

/// An ordered collection of entries plus pagination links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub entry: Vec<Entry>,
    #[serde(default)]
    pub link: Vec<Link>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feed {
    /// URL of the `rel="next"` link, or None at the end of results.
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.rel == REL_NEXT)
            .map(|l| l.href.as_str())
    }
}

/// A `{relation, href, media-type}` triple pointing at a related resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Builder for request bodies shaped as `{"entry": {"content": {...}}}`.
///
/// Services expect resource creation/update payloads in the same envelope
/// they answer with: a `params` object plus optional sibling sections
/// (`file`, `action`, `wchannel`, ...).
#[derive(Debug, Clone, Default)]
pub struct EntryBody {
    params: Map<String, Value>,
    sections: Map<String, Value>,
}

impl EntryBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `entry.content.params.<name>`.
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Set a content section next to `params` (e.g. `file`, `action`).
    pub fn section(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.sections.insert(name.to_string(), value.into());
        self
    }

    /// Finish into the JSON value to send.
    pub fn into_value(self) -> Value {
        let mut content = Map::new();
        content.insert("params".to_string(), Value::Object(self.params));
        for (name, value) in self.sections {
            content.insert(name, value);
        }
        let mut entry = Map::new();
        entry.insert("content".to_string(), Value::Object(content));
        let mut doc = Map::new();
        doc.insert("entry".to_string(), Value::Object(entry));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_param_accessors() {
        let doc: EntryDoc = serde_json::from_value(json!({
            "entry": {
                "id": "/job/123",
                "content": {
                    "params": {
                        "status": "7",
                        "batch_status": -1,
                        "filename": "movie.mp4"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(doc.entry.id.as_deref(), Some("/job/123"));
        assert_eq!(doc.entry.param_str("filename"), Some("movie.mp4"));
        // numeric param sent as a string
        assert_eq!(doc.entry.param_i64("status"), Some(7));
        // numeric param sent as a number
        assert_eq!(doc.entry.param_i64("batch_status"), Some(-1));
        assert_eq!(doc.entry.param("missing"), None);
    }

    #[test]
    fn test_entry_set_param() {
        let mut entry = Entry::default();
        entry.set_param("record_start", "1700000000");
        assert_eq!(entry.param_str("record_start"), Some("1700000000"));

        entry.set_param("record_start", "1700000500");
        assert_eq!(entry.param_str("record_start"), Some("1700000500"));
    }

    #[test]
    fn test_feed_next_link() {
        let doc: FeedDoc = serde_json::from_value(json!({
            "feed": {
                "entry": [],
                "link": [
                    {"rel": "self", "href": "http://x/page1", "type": "application/json"},
                    {"rel": "next", "href": "http://x/page2", "type": "application/json"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(doc.next_link(), Some("http://x/page2"));
    }

    #[test]
    fn test_feed_without_next_link() {
        let doc: FeedDoc = serde_json::from_value(json!({
            "feed": {
                "entry": [{"id": "/dir/a/", "content": {}}],
                "link": [{"rel": "self", "href": "http://x/page1"}]
            }
        }))
        .unwrap();
        assert_eq!(doc.next_link(), None);
        assert_eq!(doc.feed.entry.len(), 1);
    }

    #[test]
    fn test_feed_tolerates_missing_collections() {
        // some services omit `entry` and `link` entirely on empty feeds
        let doc: FeedDoc = serde_json::from_value(json!({"feed": {}})).unwrap();
        assert!(doc.feed.entry.is_empty());
        assert_eq!(doc.next_link(), None);
    }

    #[test]
    fn test_entry_body_shape() {
        let value = EntryBody::new()
            .param("format", "1")
            .param("src_location", "movie.mp4")
            .section("action", json!({"post_response": 1}))
            .into_value();

        assert_eq!(value["entry"]["content"]["params"]["format"], "1");
        assert_eq!(value["entry"]["content"]["params"]["src_location"], "movie.mp4");
        assert_eq!(value["entry"]["content"]["action"]["post_response"], 1);
    }
}
