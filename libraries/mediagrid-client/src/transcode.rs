//! Transcoding service operations: sources, jobs, transcoded results and
//! the format catalogue.

use crate::config::{Credentials, Endpoint};
use crate::envelope::{EntryBody, EntryDoc, FeedDoc};
use crate::error::{MediaGridError, Result};
use crate::presign::{UploadGrant, HMAC_HEADER, INFO_HEADER};
use crate::rest::RestClient;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Default host of the transcoding service.
pub const DEFAULT_HOST: &str = "transcode.enc01.mediagrid.io";

/// Job status codes reported in a job entry's `status` param.
///
/// `FINISHED` and above are terminal (the failure codes sort after it, so
/// `status >= FINISHED` means "the job is done", successfully or not).
pub mod status {
    pub const REQUEST_RECEIVED: i64 = 1;
    pub const IMPORT_IN_PROGRESS: i64 = 2;
    pub const IMPORT_SUCCEEDED: i64 = 3;
    pub const TRANS_IN_PROGRESS: i64 = 4;
    pub const TRANS_SUCCEEDED: i64 = 5;
    pub const EXPORT_IN_PROGRESS: i64 = 6;
    pub const FINISHED: i64 = 7;
    pub const IMPORT_FAILED: i64 = 8;
    pub const TRANS_FAILED: i64 = 9;
    pub const EXPORT_FAILED: i64 = 10;
}

/// Stock format profile ids.
pub mod formats {
    pub const MP4_KEEP_SIZE: &str = "1";
    pub const MP4_240P: &str = "2";
    pub const MP4_480P: &str = "3";
    pub const MP4_720P_WIDE: &str = "4";
    pub const MP4_1080P_WIDE: &str = "5";
    pub const WEBM_KEEP_SIZE: &str = "11";
    pub const WEBM_240P: &str = "12";
    pub const WEBM_480P: &str = "13";
    pub const WEBM_720P_WIDE: &str = "14";
    pub const WEBM_1080P_WIDE: &str = "15";
    pub const OGG_KEEP_SIZE: &str = "21";
    pub const JPG_480P: &str = "33";
    pub const JPG_KEEP_SIZE: &str = "252";
    pub const PNG_KEEP_SIZE: &str = "253";
}

/// Stock formatgroup ids (bundles of format profiles).
pub mod formatgroups {
    pub const MP4_JPG_480P: &str = "1";
    pub const ADAPTIVE_480P: &str = "27";
    pub const ADAPTIVE_KEEP_SIZE: &str = "28";
    pub const HTML5_KEEP_SIZE: &str = "40";
    pub const HTML5_480P: &str = "42";
}

/// Stock proc ids (post-processing hooks run while a job executes).
pub mod procs {
    pub const EMAIL_JSON: &str = "13";
    pub const POST_JSON: &str = "14";
    pub const EMAIL_TXT: &str = "24";
}

/// Default output profile: export the transcoded file to the CDN.
pub const OUTPUT_EXPORT_TO_CDN: &str = "1";

/// Parameters for launching a transcoding job.
///
/// Exactly one of `format` (single job) or `formatgroup` (batch job) must
/// be set, and `source` must name either an uploaded src file or, when
/// `input` is set, an import location for that input profile. Use
/// [`JobSpec::single`] / [`JobSpec::batch`] for the common cases.
#[derive(Debug, Clone, Default)]
pub struct JobSpec {
    /// Format profile id (one transcoded file)
    pub format: Option<String>,
    /// Formatgroup id (batch: one file per profile in the group)
    pub formatgroup: Option<String>,
    /// Input profile id; when set, `source` is an import location
    pub input: Option<String>,
    /// Src filename, or import location when `input` is set
    pub source: String,
    /// Output profile id, or None if the result should not be exported
    pub output: Option<String>,
    /// Publish location (relative path + filename without extension)
    pub tgt_location: Option<String>,
    /// Snapshot interval, if a snapshot profile is part of the formatgroup
    pub snapshot_interval: Option<String>,
    /// Caller data echoed back in the job report
    pub client_passthru: Option<String>,
    /// Comma-separated proc ids to run while processing
    pub proc: Option<String>,
    /// Additional data for the procs
    pub client_input: Option<String>,
    /// Transcode start offset (seconds, or a percentage with '%')
    pub startpos: Option<String>,
    /// Transcode end offset from the end of the src (seconds)
    pub endpos: Option<String>,
}

impl JobSpec {
    /// One src file, one format profile, published on the CDN.
    pub fn single(format: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            source: source.into(),
            output: Some(OUTPUT_EXPORT_TO_CDN.to_string()),
            ..Self::default()
        }
    }

    /// One src file, one formatgroup, published on the CDN.
    pub fn batch(formatgroup: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            formatgroup: Some(formatgroup.into()),
            source: source.into(),
            output: Some(OUTPUT_EXPORT_TO_CDN.to_string()),
            ..Self::default()
        }
    }

    /// Publish location for the transcoded file(s).
    pub fn tgt_location(mut self, tgt_location: impl Into<String>) -> Self {
        self.tgt_location = Some(tgt_location.into());
        self
    }

    fn into_body(self) -> Result<Value> {
        let mut body = EntryBody::new();

        match (self.format, self.formatgroup) {
            (Some(_), Some(_)) => {
                return Err(MediaGridError::InvalidArgument(
                    "format and formatgroup cannot be combined".into(),
                ))
            }
            (Some(format), None) => body = body.param("format", format),
            (None, Some(formatgroup)) => body = body.param("formatgroup", formatgroup),
            (None, None) => {
                return Err(MediaGridError::InvalidArgument(
                    "a job needs a format or formatgroup id".into(),
                ))
            }
        }

        if self.source.is_empty() {
            return Err(MediaGridError::InvalidArgument(
                "a job needs a src or import location".into(),
            ));
        }
        if let Some(input) = self.input {
            body = body
                .param("input", input)
                .param("import_location", self.source);
        } else {
            body = body.param("src_location", self.source);
        }

        if let Some(output) = self.output {
            body = body.param("output", output);
        }
        if let Some(tgt_location) = self.tgt_location {
            body = body.param("tgt_location", tgt_location);
        }
        if let Some(snapshot_interval) = self.snapshot_interval {
            body = body.param("snapshot_interval", snapshot_interval);
        }
        if let Some(client_passthru) = self.client_passthru {
            body = body.param("client_passthru", client_passthru);
        }
        if let Some(proc) = self.proc {
            body = body.param("proc", proc);
        }
        if let Some(client_input) = self.client_input {
            body = body.param("client_input", client_input);
        }
        if let Some(startpos) = self.startpos {
            body = body.param("startpos", startpos);
        }
        if let Some(endpos) = self.endpos {
            body = body.param("endpos", endpos);
        }

        Ok(body.into_value())
    }
}

/// Client for the transcoding service.
pub struct TranscodeClient {
    rest: RestClient,
}

impl TranscodeClient {
    /// Create a client against the default transcoding host.
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

    // Src resource
    // ------------

    /// Upload a source file to be transcoded (streaming).
    ///
    /// If a src with the same filename exists a suffix is appended, so
    /// check the filename param in the response entry.
    pub async fn create_src(&self, filename: &str, local_path: &Path) -> Result<EntryDoc> {
        self.rest
            .put_file("/src/", None, local_path, &[("Slug", filename)])
            .await
    }

    /// Get a single src instance.
    pub async fn get_src(&self, filename: &str) -> Result<EntryDoc> {
        let uri = format!("/src/{}/{}/", self.rest.username(), filename);
        self.rest.get(&uri, None).await
    }

    /// List src instances.
    pub async fn src_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/src/", query).await
    }

    /// Delete a src instance.
    pub async fn delete_src(&self, filename: &str) -> Result<()> {
        let uri = format!("/src/{}/{}/", self.rest.username(), filename);
        self.rest.delete(&uri, None).await
    }

    // Job resource
    // ------------

    /// Launch a single transcoding job (one src file, one transcoded
    /// file) and publish the result on the CDN.
    pub async fn create_single_job(
        &self,
        format: &str,
        src_filename: &str,
        tgt_location: &str,
    ) -> Result<EntryDoc> {
        self.create_job(JobSpec::single(format, src_filename).tgt_location(tgt_location))
            .await
    }

    /// Launch a batch transcoding job (one src file, one transcoded file
    /// per profile in the formatgroup) and publish the results on the CDN.
    pub async fn create_batch_job(
        &self,
        formatgroup: &str,
        src_filename: &str,
        tgt_location: &str,
    ) -> Result<EntryDoc> {
        self.create_job(JobSpec::batch(formatgroup, src_filename).tgt_location(tgt_location))
            .await
    }

    /// Launch a transcoding job with full control over the job params.
    ///
    /// Invalid combinations (format + formatgroup, missing source) fail
    /// with `InvalidArgument` before any request is made.
    pub async fn create_job(&self, spec: JobSpec) -> Result<EntryDoc> {
        let body = spec.into_body()?;
        self.rest.post("/job/", None, &body).await
    }

    /// Fetch a job entry by id (ids are URLs handed out by the service).
    pub async fn get_job(&self, id_or_url: &str) -> Result<EntryDoc> {
        self.rest.get(id_or_url, None).await
    }

    /// List job instances.
    pub async fn job_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/job/", query).await
    }

    /// Refetch a job and report whether it has reached a terminal state.
    ///
    /// The passed entry is overwritten with the fresh representation. For
    /// a batch job this only returns true once every job in the batch is
    /// done (aggregate percentage at 100). The caller drives the polling
    /// loop and chooses the sleep interval.
    pub async fn is_job_complete(&self, job: &mut EntryDoc) -> Result<bool> {
        let id = job.entry.id.clone().ok_or_else(|| {
            MediaGridError::InvalidArgument("job entry has no id to poll".into())
        })?;

        *job = self.get_job(&id).await?;

        let batch_status = job.entry.param_i64("batch_status").unwrap_or(-1);
        Ok(match batch_status {
            -1 => job
                .entry
                .param_i64("status")
                .is_some_and(|s| s >= status::FINISHED),
            100 => true,
            _ => false,
        })
    }

    // Transc resource (transcoded results kept on the service)
    // --------------------------------------------------------

    /// List transcoded file instances.
    pub async fn transc_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/transc/", query).await
    }

    /// Get a single transcoded file instance.
    pub async fn get_transc(&self, filename: &str) -> Result<EntryDoc> {
        let uri = format!("/transc/{}/{}", self.rest.username(), filename);
        self.rest.get(&uri, None).await
    }

    /// Download a transcoded file, streaming it to `local_path`.
    pub async fn get_transc_file(&self, filename: &str, local_path: &Path) -> Result<PathBuf> {
        let uri = format!("/transc/{}/{}", self.rest.username(), filename);
        self.rest.download_to(&uri, local_path).await
    }

    /// Delete a transcoded file instance.
    pub async fn delete_transc(&self, filename: &str) -> Result<()> {
        let uri = format!("/transc/{}/{}", self.rest.username(), filename);
        self.rest.delete(&uri, None).await
    }

    // Format catalogue
    // ----------------

    /// List format profiles.
    pub async fn format_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/format/", query).await
    }

    /// Get a single format profile.
    pub async fn get_format(&self, id: &str) -> Result<EntryDoc> {
        let uri = format!("/format/{id}");
        self.rest.get(&uri, None).await
    }

    /// List formatgroups.
    pub async fn formatgroup_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/formatgroup/", query).await
    }

    /// Get a single formatgroup.
    pub async fn get_formatgroup(&self, id: &str) -> Result<EntryDoc> {
        let uri = format!("/formatgroup/{id}");
        self.rest.get(&uri, None).await
    }

    /// List proc profiles.
    pub async fn proc_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/proc/", query).await
    }

    /// Next page of any feed from this service.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }

    // Srcencode resource
    // ------------------

    /// Upload a source to be automatically transcoded with a formatgroup
    /// and published, authorized by the formatgroup's shared secret.
    ///
    /// The file is streamed. `client_passthru` is echoed back in the job
    /// report; `proc_ids` name procs to run while processing.
    #[allow(clippy::too_many_arguments)]
    pub async fn upload_srcencode(
        &self,
        filename: &str,
        local_path: &Path,
        formatgroup_id: &str,
        secret: &str,
        valid_for_secs: i64,
        publish_dir: &str,
        client_passthru: Option<&Value>,
        proc_ids: &[&str],
    ) -> Result<EntryDoc> {
        let grant = UploadGrant::new(secret, valid_for_secs);
        self.srcencode_with_grant(
            filename,
            local_path,
            formatgroup_id,
            &grant,
            publish_dir,
            client_passthru,
            proc_ids,
        )
        .await
    }

    /// Like [`upload_srcencode`](Self::upload_srcencode), but with a
    /// caller-built grant (explicit expiry and nonce).
    #[allow(clippy::too_many_arguments)]
    pub async fn srcencode_with_grant(
        &self,
        filename: &str,
        local_path: &Path,
        formatgroup_id: &str,
        grant: &UploadGrant,
        publish_dir: &str,
        client_passthru: Option<&Value>,
        proc_ids: &[&str],
    ) -> Result<EntryDoc> {
        let uri = format!("/srcencode_m/{}/", self.rest.username());
        let info = grant.info(&[
            ("publish_filename", json!(filename)),
            ("publish_dir", json!(publish_dir)),
            ("formatgroup_id", json!(formatgroup_id)),
            (
                "client_passthru",
                client_passthru.cloned().unwrap_or(Value::Null),
            ),
            ("proc_ids", json!(proc_ids)),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_spec_single() {
        let body = JobSpec::single(formats::MP4_KEEP_SIZE, "movie.mp4")
            .tgt_location("test/mymovie")
            .into_body()
            .unwrap();

        let params = &body["entry"]["content"]["params"];
        assert_eq!(params["format"], "1");
        assert_eq!(params["src_location"], "movie.mp4");
        assert_eq!(params["output"], "1");
        assert_eq!(params["tgt_location"], "test/mymovie");
        assert!(params.get("formatgroup").is_none());
    }

    #[test]
    fn test_job_spec_with_input_profile() {
        let spec = JobSpec {
            format: Some(formats::MP4_480P.to_string()),
            input: Some("1".to_string()),
            source: "/import/movie.mov".to_string(),
            ..JobSpec::default()
        };
        let body = spec.into_body().unwrap();

        let params = &body["entry"]["content"]["params"];
        assert_eq!(params["input"], "1");
        assert_eq!(params["import_location"], "/import/movie.mov");
        assert!(params.get("src_location").is_none());
    }

    #[test]
    fn test_job_spec_format_and_formatgroup_rejected() {
        let spec = JobSpec {
            format: Some("1".to_string()),
            formatgroup: Some("40".to_string()),
            source: "movie.mp4".to_string(),
            ..JobSpec::default()
        };
        assert!(matches!(
            spec.into_body(),
            Err(MediaGridError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_job_spec_requires_profile_and_source() {
        let spec = JobSpec {
            source: "movie.mp4".to_string(),
            ..JobSpec::default()
        };
        assert!(matches!(
            spec.into_body(),
            Err(MediaGridError::InvalidArgument(_))
        ));

        let spec = JobSpec {
            format: Some("1".to_string()),
            ..JobSpec::default()
        };
        assert!(matches!(
            spec.into_body(),
            Err(MediaGridError::InvalidArgument(_))
        ));
    }
}
