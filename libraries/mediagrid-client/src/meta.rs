//! Metadata service operations: content instances, vocabularies and
//! export feeds.
//!
//! Content payloads are deeply nested; [`ContentSpec`], [`MediaFile`] and
//! [`MetaField`] compose and pick apart the `entry.content` shape without
//! the caller having to hand-build JSON.

use crate::config::{Credentials, Endpoint};
use crate::envelope::{EntryDoc, FeedDoc};
use crate::error::{MediaGridError, Result};
use crate::rest::RestClient;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Default host of the metadata service.
pub const DEFAULT_HOST: &str = "meta.meta01.mediagrid.io";

/// Read a JSON value leniently as a string (services are inconsistent
/// about numbers vs numeric strings in file attributes).
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One metadata field on a content instance, scoped to a vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaField {
    /// Field name inside the vocabulary
    pub name: String,
    pub vocab: Option<String>,
    pub text: Option<String>,
    pub lang: Option<String>,
}

impl MetaField {
    pub fn new(name: impl Into<String>, vocab: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vocab: Some(vocab.into()),
            text: Some(text.into()),
            lang: None,
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("meta_name".to_string(), json!(self.name));
        if let Some(vocab) = &self.vocab {
            map.insert("vocab".to_string(), json!(vocab));
        }
        if let Some(text) = &self.text {
            map.insert("text".to_string(), json!(text));
        }
        if let Some(lang) = &self.lang {
            map.insert("lang".to_string(), json!(lang));
        }
        Value::Object(map)
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            name: value.get("meta_name").and_then(value_as_string)?,
            vocab: value.get("vocab").and_then(value_as_string),
            text: value.get("text").and_then(value_as_string),
            lang: value.get("lang").and_then(value_as_string),
        })
    }
}

/// One file attached to a content instance.
///
/// All attributes besides the path are optional and travel as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFile {
    /// Path on the CDN, normalized to a single leading slash
    pub path: String,
    pub media_type: Option<String>,
    pub size: Option<String>,
    pub duration: Option<String>,
    pub container: Option<String>,
    pub bitrate: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub frames: Option<String>,
    pub framerate: Option<String>,
    pub samplerate: Option<String>,
}

impl MediaFile {
    pub fn new(path: &str) -> Self {
        Self {
            path: format!("/{}", path.trim_matches('/')),
            ..Self::default()
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("path".to_string(), json!(self.path));
        let optional = [
            ("media_type", &self.media_type),
            ("size", &self.size),
            ("duration", &self.duration),
            ("container", &self.container),
            ("bitrate", &self.bitrate),
            ("width", &self.width),
            ("height", &self.height),
            ("frames", &self.frames),
            ("framerate", &self.framerate),
            ("samplerate", &self.samplerate),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                map.insert(name.to_string(), json!(value));
            }
        }
        Value::Object(map)
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            path: value.get("path").and_then(value_as_string)?,
            media_type: value.get("media_type").and_then(value_as_string),
            size: value.get("size").and_then(value_as_string),
            duration: value.get("duration").and_then(value_as_string),
            container: value.get("container").and_then(value_as_string),
            bitrate: value.get("bitrate").and_then(value_as_string),
            width: value.get("width").and_then(value_as_string),
            height: value.get("height").and_then(value_as_string),
            frames: value.get("frames").and_then(value_as_string),
            framerate: value.get("framerate").and_then(value_as_string),
            samplerate: value.get("samplerate").and_then(value_as_string),
        })
    }
}

/// Composition helper for content instances.
#[derive(Debug, Clone, Default)]
pub struct ContentSpec {
    /// Instance id, set when parsed from a service response
    pub id: Option<String>,
    pub name: Option<String>,
    /// External video-platform id the content is synced to, if any
    pub yt_id: Option<String>,
    pub files: Vec<MediaFile>,
    pub tags: Vec<String>,
    pub meta: Vec<MetaField>,
    /// Path of the file used as thumbnail
    pub thumb_used: Option<String>,
    /// Ask the service to refresh file attributes from the CDN
    pub update_files: bool,
}

impl ContentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Render the `{"entry": {"content": {...}}}` request body.
    pub fn to_entry(&self) -> Value {
        let files: Vec<Value> = self.files.iter().map(MediaFile::to_value).collect();

        let mut params = Map::new();
        if let Some(name) = &self.name {
            params.insert("name".to_string(), json!(name));
        }
        if let Some(yt_id) = &self.yt_id {
            params.insert("yt_id".to_string(), json!(yt_id));
        }
        params.insert("tag".to_string(), json!(self.tags));
        if !self.meta.is_empty() {
            let meta: Vec<Value> = self.meta.iter().map(MetaField::to_value).collect();
            params.insert("meta".to_string(), json!(meta));
        }

        let mut file_params = Map::new();
        file_params.insert(
            "thumb_used".to_string(),
            json!(self.thumb_used.clone().unwrap_or_default()),
        );
        file_params.insert("update_files".to_string(), json!(i32::from(self.update_files)));

        json!({
            "entry": {
                "content": {
                    "file": files,
                    "params": params,
                    "file_params": file_params,
                }
            }
        })
    }

    /// Pick a content instance apart from a service response.
    pub fn from_entry(doc: &EntryDoc) -> Self {
        let content = &doc.entry.content;
        let params = content.get("params");
        let file_params = content.get("file_params");

        let files = content
            .get("file")
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(MediaFile::from_value).collect())
            .unwrap_or_default();
        let tags = params
            .and_then(|p| p.get("tag"))
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(value_as_string).collect())
            .unwrap_or_default();
        let meta = params
            .and_then(|p| p.get("meta"))
            .and_then(Value::as_array)
            .map(|meta| meta.iter().filter_map(MetaField::from_value).collect())
            .unwrap_or_default();

        Self {
            id: doc.entry.id.clone(),
            name: params.and_then(|p| p.get("name")).and_then(value_as_string),
            yt_id: params.and_then(|p| p.get("yt_id")).and_then(value_as_string),
            files,
            tags,
            meta,
            thumb_used: file_params
                .and_then(|p| p.get("thumb_used"))
                .and_then(value_as_string)
                .filter(|t| !t.is_empty()),
            update_files: file_params
                .and_then(|p| p.get("update_files"))
                .and_then(Value::as_i64)
                .unwrap_or(0)
                != 0,
        }
    }
}

/// Client for the metadata service.
pub struct MetaClient {
    rest: RestClient,
}

impl MetaClient {
    /// Create a client against the default metadata host.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_endpoint(credentials, Endpoint::new(DEFAULT_HOST))
    }

    /// Create a client against a specific endpoint.
    pub fn with_endpoint(credentials: Credentials, endpoint: Endpoint) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(credentials, endpoint)?,
        })
    }

    /// The underlying transport, for raw requests and pagination.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    // Content methods
    // ---------------

    /// List content instances.
    pub async fn content_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("/content/{}", self.rest.username());
        self.rest.get(&uri, query).await
    }

    /// Get a single content instance.
    pub async fn get_content(&self, name: &str, query: Option<&str>) -> Result<EntryDoc> {
        let uri = format!("/content/{}/{}/", self.rest.username(), name);
        self.rest.get(&uri, query).await
    }

    /// Create a content instance.
    pub async fn create_content(&self, content: &ContentSpec) -> Result<EntryDoc> {
        self.create_content_entry(&content.to_entry()).await
    }

    /// Create a content instance from a raw entry body.
    pub async fn create_content_entry(&self, entry: &Value) -> Result<EntryDoc> {
        let uri = format!("/content/{}/", self.rest.username());
        self.rest.post(&uri, None, entry).await
    }

    /// Update an existing content instance.
    pub async fn update_content(&self, name: &str, content: &ContentSpec) -> Result<EntryDoc> {
        self.update_content_entry(name, &content.to_entry()).await
    }

    /// Update an existing content instance from a raw entry body.
    pub async fn update_content_entry(&self, name: &str, entry: &Value) -> Result<EntryDoc> {
        let uri = format!("/content/{}/{}/", self.rest.username(), name);
        self.rest.post(&uri, None, entry).await
    }

    /// Delete a content instance. With `sync_cdn` the files it references
    /// are deleted from the CDN as well.
    pub async fn delete_content(&self, name: &str, sync_cdn: bool) -> Result<()> {
        let uri = format!("/content/{}/{}/", self.rest.username(), name);
        let query = if sync_cdn { Some("sync_cdn=1") } else { None };
        self.rest.delete(&uri, query).await
    }

    /// Check whether a content instance exists.
    pub async fn content_exists(&self, name: &str) -> Result<bool> {
        let uri = format!("/content/{}/{}/", self.rest.username(), name);
        match self.rest.get::<EntryDoc>(&uri, None).await {
            Ok(_) => Ok(true),
            Err(MediaGridError::Server { status, .. }) => {
                debug!(name = %name, status, "Content does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// List content instances by the CDN directory their files live in.
    pub async fn content_dir_feed(
        &self,
        dir_path: Option<&str>,
        query: Option<&str>,
    ) -> Result<FeedDoc> {
        let path = match dir_path {
            Some(dir_path) => format!("/{}", dir_path.trim_start_matches('/')),
            None => "/".to_string(),
        };
        let uri = format!("/contentdir/{}{}", self.rest.username(), path);
        self.rest.get(&uri, query).await
    }

    // Vocab methods
    // -------------

    /// Create a vocabulary.
    pub async fn create_vocab(&self, name: &str, xml_namespace: &str) -> Result<EntryDoc> {
        let uri = format!("/vocab/{}/", self.rest.username());
        let body = json!({
            "entry": {
                "content": {
                    "params": {
                        "name": name,
                        "xml_namespace": xml_namespace,
                    }
                }
            }
        });
        self.rest.post(&uri, None, &body).await
    }

    /// List vocabularies.
    pub async fn vocab_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("/vocab/{}", self.rest.username());
        self.rest.get(&uri, query).await
    }

    /// Get a single vocabulary.
    pub async fn get_vocab(&self, name: &str) -> Result<EntryDoc> {
        let uri = format!("/vocab/{}/{}/", self.rest.username(), name);
        self.rest.get(&uri, None).await
    }

    /// Update an existing vocabulary.
    pub async fn update_vocab(&self, vocab: &EntryDoc, name: Option<&str>) -> Result<EntryDoc> {
        let uri = match name {
            Some(name) => format!("/vocab/{}/{}/", self.rest.username(), name),
            None => vocab.entry.id.clone().ok_or_else(|| {
                MediaGridError::InvalidArgument("vocab entry has no id to update".into())
            })?,
        };
        self.rest.post(&uri, None, vocab).await
    }

    /// Delete a vocabulary.
    pub async fn delete_vocab(&self, name: &str) -> Result<()> {
        let uri = format!("/vocab/{}/{}/", self.rest.username(), name);
        self.rest.delete(&uri, None).await
    }

    // Export feeds
    // ------------

    /// Content catalogue as decoded JSON.
    pub async fn export_json(&self, query: Option<&str>) -> Result<Value> {
        let uri = format!("/ext/json/{}/", self.rest.username());
        self.rest.get(&uri, query).await
    }

    /// Content catalogue as an Atom document (raw).
    pub async fn export_atom(&self, query: Option<&str>) -> Result<String> {
        let uri = format!("/ext/atom/{}/", self.rest.username());
        self.rest.get_raw(&uri, query).await
    }

    /// Content catalogue as an MRSS document (raw).
    pub async fn export_mrss(&self, query: Option<&str>) -> Result<String> {
        let uri = format!("/ext/mrss/{}/", self.rest.username());
        self.rest.get_raw(&uri, query).await
    }

    /// Next page of any feed from this service.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }
}
