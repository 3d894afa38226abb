//! MediaGrid Client
//!
//! HTTP client library for the MediaGrid web services: file storage/CDN,
//! transcoding, usage statistics, webcasting and metadata tagging.
//!
//! Each service family has its own facade client over a shared REST/JSON
//! transport. Responses come back as typed [`EntryDoc`]/[`FeedDoc`]
//! envelopes whose resource-specific innards stay untyped JSON; errors
//! carry the remote status code and raw body. One request per call, no
//! retries: retry loops (like polling a transcoding job) belong to the
//! caller.
//!
//! # Example
//!
//! ```ignore
//! use mediagrid_client::{Credentials, StorageClient, TranscodeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("myaccount", "secret");
//!
//!     // Publish a file on the CDN
//!     let storage = StorageClient::new(credentials.clone())?;
//!     let item = storage
//!         .create_item("videos", "launch.mp4", "/tmp/launch.mp4".as_ref(), true)
//!         .await?;
//!     println!("Published at {:?}", item.entry.param_str("path"));
//!
//!     // Transcode it in the background
//!     let transcode = TranscodeClient::new(credentials)?;
//!     let src = transcode.create_src("launch.mp4", "/tmp/launch.mp4".as_ref()).await?;
//!     let mut job = transcode
//!         .create_single_job(
//!             mediagrid_client::transcode::formats::MP4_480P,
//!             src.entry.param_str("filename").unwrap_or("launch.mp4"),
//!             "videos/launch_480p",
//!         )
//!         .await?;
//!     while !transcode.is_job_complete(&mut job).await? {
//!         tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod envelope;
mod error;
mod presign;
mod rest;

// Service modules stay public for their constants (default hosts, job
// status codes, profile ids, ...)
pub mod edge;
pub mod meta;
pub mod stats;
pub mod storage;
pub mod transcode;
pub mod webcast;

// Re-export main types
pub use config::{Credentials, Endpoint, DEFAULT_USER_AGENT};
pub use envelope::{Entry, EntryBody, EntryDoc, Feed, FeedDoc, Link, REL_NEXT};
pub use error::{MediaGridError, Result};
pub use presign::{UploadGrant, HMAC_HEADER, INFO_HEADER};
pub use rest::{query_string, RestClient};

// Re-export service facades
pub use edge::EdgeClient;
pub use meta::{ContentSpec, MediaFile, MetaClient, MetaField};
pub use stats::StatsClient;
pub use storage::StorageClient;
pub use transcode::{JobSpec, TranscodeClient};
pub use webcast::{WebcastClient, WebcastSpec};

pub mod prelude {
    //! Convenience re-exports for callers that want everything in scope.
    pub use crate::{
        Credentials, Endpoint, Entry, EntryDoc, Feed, FeedDoc, JobSpec, Link, MediaGridError,
        Result, UploadGrant,
    };
    pub use crate::{
        EdgeClient, MetaClient, StatsClient, StorageClient, TranscodeClient, WebcastClient,
    };
}
