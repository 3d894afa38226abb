//! Webcast service operations: webcasts, channels and slides.

use crate::config::{Credentials, Endpoint};
use crate::envelope::{Entry, EntryBody, EntryDoc, FeedDoc};
use crate::error::{MediaGridError, Result};
use crate::rest::RestClient;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Default host of the webcast service (webcasts live in the metadata
/// store).
pub const DEFAULT_HOST: &str = "meta.meta01.mediagrid.io";

/// Lifecycle states a webcast can be created in.
pub mod webcast_status {
    pub const PRE_LIVE: &str = "pre-live";
    pub const EMPTY: &str = "empty";
    pub const LIVE: &str = "live";
    pub const VOD: &str = "vod";
    pub const VOD_LOCAL: &str = "vod-local";
}

/// Parameters for creating a webcast.
#[derive(Debug, Clone, Default)]
pub struct WebcastSpec {
    /// Lifecycle state, one of [`webcast_status`]
    pub status: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub speaker: Option<String>,
    pub agenda: Option<String>,
    /// Scheduled date as a unix timestamp
    pub date: Option<i64>,
    /// Allowed values: "240p", "360p", "480p", "720p"
    pub resolutions: Vec<String>,
    /// Channels the webcast belongs to
    pub channel_ids: Vec<String>,
}

impl WebcastSpec {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    fn into_body(self, post_response: bool) -> Value {
        let mut body = EntryBody::new().param("status", self.status);
        if let Some(title) = self.title {
            body = body.param("title", title);
        }
        if let Some(description) = self.description {
            body = body.param("description", description);
        }
        if let Some(owner) = self.owner {
            body = body.param("owner", owner);
        }
        if let Some(speaker) = self.speaker {
            body = body.param("speaker", speaker);
        }
        if let Some(agenda) = self.agenda {
            body = body.param("agenda", agenda);
        }
        if let Some(date) = self.date {
            body = body.param("date", date);
        }
        if !self.resolutions.is_empty() {
            body = body.param("resolutions", json!(self.resolutions));
        }
        if !self.channel_ids.is_empty() {
            let channels: Vec<Value> = self
                .channel_ids
                .iter()
                .map(|id| json!({"id": id}))
                .collect();
            body = body
                .section("action", json!({"update_wchannel": "1"}))
                .section("wchannel", json!(channels));
        }
        body = body.section("actions", json!({"post_response": i32::from(post_response)}));
        body.into_value()
    }
}

/// Set `content.<section>.<name>` on an entry, creating objects as needed.
fn set_content_field(entry: &mut Entry, section: &str, name: &str, value: Value) {
    if !entry.content.is_object() {
        entry.content = Value::Object(Map::new());
    }
    let content = entry.content.as_object_mut().expect("content is an object");
    let section = content
        .entry(section)
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    section
        .as_object_mut()
        .expect("section is an object")
        .insert(name.to_string(), value);
}

/// Client for the webcast service.
pub struct WebcastClient {
    rest: RestClient,
}

impl WebcastClient {
    /// Create a client against the default webcast host.
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

    // Webcast methods
    // ---------------

    /// Create a webcast.
    ///
    /// `post_response` asks the service to echo the created instance back
    /// in the response body.
    pub async fn create_webcast(&self, spec: WebcastSpec, post_response: bool) -> Result<EntryDoc> {
        let uri = format!("/webcast/{}/", self.rest.username());
        self.rest
            .post(&uri, None, &spec.into_body(post_response))
            .await
    }

    /// List webcasts.
    pub async fn webcast_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("/webcast/{}/", self.rest.username());
        self.rest.get(&uri, query).await
    }

    /// Get a single webcast.
    pub async fn get_webcast(&self, id: &str) -> Result<EntryDoc> {
        let uri = format!("/webcast/{}/{}/", self.rest.username(), id);
        self.rest.get(&uri, None).await
    }

    /// Update an existing webcast.
    ///
    /// The target is `id` when given, otherwise the entry's own id URL.
    pub async fn update_webcast(
        &self,
        webcast: &EntryDoc,
        id: Option<&str>,
        post_response: bool,
    ) -> Result<EntryDoc> {
        let mut webcast = webcast.clone();
        set_content_field(
            &mut webcast.entry,
            "action",
            "post_response",
            json!(i32::from(post_response)),
        );

        let uri = match id {
            Some(id) => format!("/webcast/{}/{}/", self.rest.username(), id),
            None => webcast.entry.id.clone().ok_or_else(|| {
                MediaGridError::InvalidArgument("webcast entry has no id to update".into())
            })?,
        };
        self.rest.post(&uri, None, &webcast).await
    }

    /// Delete a webcast, optionally deleting its attached content too.
    pub async fn delete_webcast(&self, id: &str, delete_content: bool) -> Result<()> {
        let uri = format!("/webcast/{}/{}/", self.rest.username(), id);
        let query = if delete_content {
            "delete_content=1"
        } else {
            "delete_content=0"
        };
        self.rest.delete(&uri, Some(query)).await
    }

    /// Check whether a webcast exists.
    pub async fn webcast_exists(&self, id: &str) -> Result<bool> {
        let uri = format!("/webcast/{}/{}/", self.rest.username(), id);
        match self.rest.get::<EntryDoc>(&uri, None).await {
            Ok(_) => Ok(true),
            Err(MediaGridError::Server { status, .. }) => {
                debug!(id = %id, status, "Webcast does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Mark the start of the webcast recording at the given unix
    /// timestamp, returning the updated instance.
    pub async fn set_record_start(&self, webcast: &EntryDoc, timestamp: i64) -> Result<EntryDoc> {
        let mut webcast = webcast.clone();
        webcast
            .entry
            .set_param("record_start", timestamp.to_string());
        self.update_webcast(&webcast, None, true).await
    }

    /// Mark the end of the webcast recording at the given unix timestamp,
    /// returning the updated instance.
    pub async fn set_record_end(&self, webcast: &EntryDoc, timestamp: i64) -> Result<EntryDoc> {
        let mut webcast = webcast.clone();
        webcast.entry.set_param("record_end", timestamp.to_string());
        self.update_webcast(&webcast, None, true).await
    }

    /// Trim a recorded webcast to a time window.
    pub async fn trim_webcast(
        &self,
        id: &str,
        trim_timestamp: i64,
        trim_start_secs: i64,
        trim_end_secs: i64,
        path: &str,
        resolution: &str,
    ) -> Result<EntryDoc> {
        let uri = format!("/webcast/trim/{}/{}/", self.rest.username(), id);
        let body = json!({
            "webcast_id": id,
            "trim_timestamp": trim_timestamp,
            "trim_start_secs": trim_start_secs,
            "trim_end_secs": trim_end_secs,
            "path": path,
            "resolution": resolution,
        });
        self.rest.post(&uri, None, &body).await
    }

    /// Undo a previous trim.
    pub async fn revert_webcast(&self, id: &str) -> Result<EntryDoc> {
        let uri = format!("/webcast/revert/{}/{}/", self.rest.username(), id);
        self.rest.post(&uri, None, &json!({"webcast_id": id})).await
    }

    /// Attach a content instance to the webcast as an asset.
    pub async fn add_asset(
        &self,
        webcast_id: &str,
        content_name: &str,
        kind: &str,
    ) -> Result<EntryDoc> {
        let uri = format!("/webcast/add_asset/{}/{}/", self.rest.username(), webcast_id);
        let body = EntryBody::new()
            .param("asset", content_name)
            .param("type", kind)
            .into_value();
        self.rest.post(&uri, None, &body).await
    }

    // Channel methods
    // ---------------

    /// Create a channel, optionally linking webcasts into it.
    pub async fn create_channel(
        &self,
        title: &str,
        description: &str,
        webcast_ids: &[&str],
    ) -> Result<EntryDoc> {
        let mut body = EntryBody::new()
            .param("title", title)
            .param("description", description);
        if !webcast_ids.is_empty() {
            let webcasts: Vec<Value> = webcast_ids.iter().map(|id| json!({"id": id})).collect();
            body = body.section("webcast", json!(webcasts));
        }

        let uri = format!("/wchannel/{}/", self.rest.username());
        self.rest.post(&uri, None, &body.into_value()).await
    }

    /// List channels.
    pub async fn channel_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("/wchannel/{}/", self.rest.username());
        self.rest.get(&uri, query).await
    }

    /// Get a single channel.
    pub async fn get_channel(&self, id: &str) -> Result<EntryDoc> {
        let uri = format!("/wchannel/instance/{id}/");
        self.rest.get(&uri, None).await
    }

    /// Update an existing channel.
    pub async fn update_channel(&self, channel: &EntryDoc, id: Option<&str>) -> Result<EntryDoc> {
        let uri = match id {
            Some(id) => format!("/wchannel/instance/{id}/"),
            None => channel.entry.id.clone().ok_or_else(|| {
                MediaGridError::InvalidArgument("channel entry has no id to update".into())
            })?,
        };
        self.rest.post(&uri, None, channel).await
    }

    /// Delete a channel.
    pub async fn delete_channel(&self, id: &str) -> Result<()> {
        let uri = format!("/wchannel/instance/{id}/");
        self.rest.delete(&uri, None).await
    }

    /// Check whether a channel exists.
    pub async fn channel_exists(&self, id: &str) -> Result<bool> {
        let uri = format!("/wchannel/instance/{id}/");
        match self.rest.get::<EntryDoc>(&uri, None).await {
            Ok(_) => Ok(true),
            Err(MediaGridError::Server { status, .. }) => {
                debug!(id = %id, status, "Channel does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // Slide methods
    // -------------

    /// Register a slide image shown during the webcast.
    ///
    /// `timestamp` is when the slide was taken, `offset` its position from
    /// the beginning of the webcast.
    pub async fn create_slide(
        &self,
        webcast_id: &str,
        path: &str,
        timestamp: i64,
        offset: i64,
    ) -> Result<EntryDoc> {
        let uri = format!("/wslide/{}/{}/", self.rest.username(), webcast_id);
        let body = EntryBody::new()
            .param("webcast_id", webcast_id)
            .param("path", path)
            .param("timestamp", timestamp)
            .param("offset", offset)
            .into_value();
        self.rest.post(&uri, None, &body).await
    }

    /// List the slides of a webcast.
    pub async fn slide_feed(&self, webcast_id: &str, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("/wslide/{}/{}/", self.rest.username(), webcast_id);
        self.rest.get(&uri, query).await
    }

    /// Delete all slides of a webcast.
    pub async fn delete_slides(&self, webcast_id: &str, delete_from_cdn: bool) -> Result<()> {
        let uri = format!("/wslide/{}/{}/", self.rest.username(), webcast_id);
        let query = if delete_from_cdn {
            "delete_from_cdn=1"
        } else {
            "delete_from_cdn=0"
        };
        self.rest.delete(&uri, Some(query)).await
    }

    /// Delete a single slide.
    pub async fn delete_slide(&self, id: &str) -> Result<()> {
        let uri = format!("/wslide/{id}/");
        self.rest.delete(&uri, None).await
    }

    /// Next page of any feed from this service.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }
}
