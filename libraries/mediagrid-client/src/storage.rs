//! File storage / CDN operations (items and directories).

use crate::config::{Credentials, Endpoint};
use crate::envelope::{EntryDoc, FeedDoc};
use crate::error::{MediaGridError, Result};
use crate::presign::{UploadGrant, HMAC_HEADER, INFO_HEADER};
use crate::rest::RestClient;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default host of the storage service.
pub const DEFAULT_HOST: &str = "storage.cdn01.mediagrid.io";

/// Client for the storage service: upload, download and delete files on
/// the CDN, and manage the directory tree they live in.
pub struct StorageClient {
    rest: RestClient,
}

impl StorageClient {
    /// Create a client against the default storage host.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_endpoint(credentials, Endpoint::new(DEFAULT_HOST))
    }

    /// Create a client against a specific endpoint (accounts are pinned to
    /// a sub-CDN, so the host varies per account).
    pub fn with_endpoint(credentials: Credentials, endpoint: Endpoint) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(credentials, endpoint)?,
        })
    }

    /// The underlying transport, for raw requests and pagination.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    // Item methods
    // ------------

    /// Upload a file to the CDN, creating an item resource.
    ///
    /// The file is streamed, not loaded into memory. If an item with the
    /// same name already exists a suffix is appended on the service side,
    /// so check the filename in the response entry.
    ///
    /// `create_dirs` makes the service create missing (sub)directories
    /// instead of failing.
    pub async fn create_item(
        &self,
        dir_path: &str,
        filename: &str,
        local_path: &Path,
        create_dirs: bool,
    ) -> Result<EntryDoc> {
        let mut uri = String::from("/item/");
        let dir_path = dir_path.trim_start_matches('/');
        if !dir_path.is_empty() {
            uri.push_str(dir_path.trim_end_matches('/'));
            uri.push('/');
        }
        uri.push_str(filename);
        uri.push('/');

        let query = if create_dirs { Some("post=1") } else { None };

        self.rest
            .put_file(&uri, query, local_path, &[("Slug", filename)])
            .await
    }

    /// Download a file from the CDN, streaming it to `local_path`.
    pub async fn get_item(&self, path: &str, local_path: &Path) -> Result<PathBuf> {
        let uri = format!("item/{}", path.trim_start_matches('/'));
        self.rest.download_to(&uri, local_path).await
    }

    /// Delete a file from the CDN.
    pub async fn delete_item(&self, path: &str) -> Result<()> {
        let uri = format!("/item/{}", path.trim_start_matches('/'));
        self.rest.delete(&uri, None).await
    }

    /// Check whether a file exists on the CDN.
    ///
    /// Service errors are the negative answer here, not failures.
    pub async fn item_exists(&self, path: &str) -> Result<bool> {
        let uri = format!("/item/{}", path.trim_start_matches('/'));
        match self.rest.head(&uri, None).await {
            Ok(()) => Ok(true),
            Err(MediaGridError::Server { status, .. }) => {
                debug!(path = %path, status, "Item does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // Dir methods
    // -----------

    /// Create a directory on the CDN.
    ///
    /// With `force_create` the service picks a fresh name if the directory
    /// already exists; check the response entry for the actual name.
    pub async fn create_dir(&self, path: &str, force_create: bool) -> Result<EntryDoc> {
        let uri = format!("dir/{}", path.trim_start_matches('/'));
        if force_create {
            self.rest.post(&uri, None, &Value::Null).await
        } else {
            self.rest.put(&uri, None, &Value::Null).await
        }
    }

    /// List a directory.
    pub async fn dir_feed(&self, path: &str, query: Option<&str>) -> Result<FeedDoc> {
        let uri = format!("dir/{}", path.trim_start_matches('/'));
        self.rest.get(&uri, query).await
    }

    /// Delete a directory.
    ///
    /// Without `recursive` the request fails if the directory still holds
    /// files or sub-directories.
    pub async fn delete_dir(&self, path: &str, recursive: bool) -> Result<()> {
        let uri = format!("dir/{}", path.trim_start_matches('/'));
        let query = if recursive { Some("recursive=1") } else { None };
        self.rest.delete(&uri, query).await
    }

    /// Check whether a directory exists on the CDN.
    pub async fn dir_exists(&self, path: &str) -> Result<bool> {
        let uri = format!("dir/{}", path.trim_start_matches('/'));
        match self.rest.get::<FeedDoc>(&uri, None).await {
            Ok(_) => Ok(true),
            Err(MediaGridError::Server { status, .. }) => {
                debug!(path = %path, status, "Directory does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Next page of a directory feed, or None at the end of results.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }

    // Pre-signed upload
    // -----------------

    /// Upload a file authorized by a time-limited shared-secret grant
    /// instead of the account password.
    ///
    /// `valid_for_secs` is the window during which the service will accept
    /// the request; it is enforced on the service side.
    pub async fn upload_presigned(
        &self,
        filename: &str,
        local_path: &Path,
        secret: &str,
        valid_for_secs: i64,
        publish_dir: &str,
    ) -> Result<EntryDoc> {
        let grant = UploadGrant::new(secret, valid_for_secs);
        self.upload_with_grant(filename, local_path, &grant, publish_dir)
            .await
    }

    /// Like [`upload_presigned`](Self::upload_presigned), but with a
    /// caller-built grant (explicit expiry and nonce).
    pub async fn upload_with_grant(
        &self,
        filename: &str,
        local_path: &Path,
        grant: &UploadGrant,
        publish_dir: &str,
    ) -> Result<EntryDoc> {
        let uri = format!("/file_upload/{}/", self.rest.username());
        let info = grant.info(&[
            ("publish_filename", json!(filename)),
            ("publish_dir", json!(publish_dir)),
        ]);

        self.rest
            .put_file(
                &uri,
                None,
                local_path,
                &[(INFO_HEADER, info.as_str()), (HMAC_HEADER, grant.signature())],
            )
            .await
    }
}
