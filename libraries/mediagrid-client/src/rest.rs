//! Generic REST/JSON transport shared by all MediaGrid service facades.
//!
//! One blocking-free request per call, HTTP Basic auth on every request,
//! JSON bodies in and out, and file-transfer variants that stream instead
//! of buffering. No retries: a failed call surfaces immediately as an
//! error and the caller decides what to do.

use crate::config::{Credentials, Endpoint};
use crate::envelope::FeedDoc;
use crate::error::{MediaGridError, Result};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Content type used for file request bodies.
const FILE_CONTENT_TYPE: &str = "video/*";

/// Compose a query string from name/value pairs, percent-encoding values.
///
/// The services take filter options (date ranges, paging, ...) as plain
/// query strings; this keeps caller-built values wire-safe.
pub fn query_string<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Generic client for one MediaGrid service endpoint.
///
/// Holds only immutable state (credentials, endpoint, the underlying
/// connection pool); independent instances can be used concurrently.
pub struct RestClient {
    http: Client,
    credentials: Credentials,
    endpoint: Endpoint,
}

impl RestClient {
    /// Create a client for the given endpoint.
    pub fn new(credentials: Credentials, endpoint: Endpoint) -> Result<Self> {
        if endpoint.host.is_empty() {
            return Err(MediaGridError::InvalidArgument(
                "endpoint host cannot be empty".into(),
            ));
        }

        // No overall request timeout: item transfers are large media files.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(endpoint.user_agent.clone())
            .build()
            .map_err(MediaGridError::Request)?;

        Ok(Self {
            http,
            credentials,
            endpoint,
        })
    }

    /// Account name these requests authenticate as.
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Compose the full URL for a request.
    ///
    /// A path that already starts with `http` is taken verbatim (services
    /// hand out absolute URLs in entry ids and pagination links). A query
    /// string is appended after `?`, with any leading `?` stripped first.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = if path.starts_with("http") {
            path.to_string()
        } else {
            let scheme = if self.endpoint.use_tls { "https" } else { "http" };
            format!(
                "{}://{}/{}",
                scheme,
                self.endpoint.host,
                path.trim_start_matches('/')
            )
        };
        if let Some(query) = query {
            if !query.is_empty() {
                url.push('?');
                url.push_str(query.trim_start_matches('?'));
            }
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// Check the status and decode the JSON body into `T`.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 300 {
            return Err(MediaGridError::Server {
                status,
                message: body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| MediaGridError::Parse(format!("invalid JSON in response: {e}")))
    }

    /// Check the status and discard any body.
    async fn check(response: reqwest::Response) -> Result<()> {
        let status = response.status().as_u16();
        if status >= 300 {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaGridError::Server {
                status,
                message,
            });
        }
        Ok(())
    }

    /// GET a JSON entry or feed.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> Result<T> {
        let url = self.build_url(path, query);
        debug!(url = %url, "GET");

        let response = self
            .request(Method::GET, &url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Self::decode(response).await
    }

    /// GET without JSON decoding; returns the raw response body.
    ///
    /// No `Accept: application/json` header is sent, so the service is free
    /// to answer in its native format (Atom, MRSS, ...).
    pub async fn get_raw(&self, path: &str, query: Option<&str>) -> Result<String> {
        let url = self.build_url(path, query);
        debug!(url = %url, "GET (raw)");

        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 300 {
            return Err(MediaGridError::Server {
                status,
                message: body,
            });
        }
        Ok(body)
    }

    /// POST a JSON body, returning the decoded response.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path, query);
        debug!(url = %url, "POST");

        let response = self
            .request(Method::POST, &url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// PUT a JSON body, returning the decoded response.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path, query);
        debug!(url = %url, "PUT");

        let response = self
            .request(Method::PUT, &url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// DELETE a resource. A succeeded delete returns no data.
    pub async fn delete(&self, path: &str, query: Option<&str>) -> Result<()> {
        let url = self.build_url(path, query);
        debug!(url = %url, "DELETE");

        let response = self
            .request(Method::DELETE, &url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Self::check(response).await
    }

    /// HEAD a resource, purely to test existence via the status code.
    pub async fn head(&self, path: &str, query: Option<&str>) -> Result<()> {
        let url = self.build_url(path, query);
        debug!(url = %url, "HEAD");

        let response = self.request(Method::HEAD, &url).send().await?;
        Self::check(response).await
    }

    /// PUT a local file as the request body (streaming upload).
    ///
    /// The file is streamed, not loaded into memory; `Content-Length` is
    /// set from the file size.
    pub async fn put_file<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
        local_path: &Path,
        extra_headers: &[(&str, &str)],
    ) -> Result<T> {
        if !local_path.exists() {
            return Err(MediaGridError::FileNotFound(
                local_path.display().to_string(),
            ));
        }

        let url = self.build_url(path, query);
        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();
        debug!(url = %url, file = %local_path.display(), size, "PUT file");

        let mut request = self
            .request(Method::PUT, &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, FILE_CONTENT_TYPE)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)));
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let result = Self::decode(response).await?;

        info!(url = %url, size, "File uploaded");
        Ok(result)
    }

    /// POST a local file as the request body.
    ///
    /// Unlike `put_file` this buffers the whole file into memory before
    /// sending; the upload resources that take POST do not accept chunked
    /// bodies. `Content-Length` is still set from the file size.
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
        local_path: &Path,
        extra_headers: &[(&str, &str)],
    ) -> Result<T> {
        if !local_path.exists() {
            return Err(MediaGridError::FileNotFound(
                local_path.display().to_string(),
            ));
        }

        let url = self.build_url(path, query);
        let contents = tokio::fs::read(local_path).await?;
        let size = contents.len() as u64;
        debug!(url = %url, file = %local_path.display(), size, "POST file");

        let mut request = self
            .request(Method::POST, &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, FILE_CONTENT_TYPE)
            .header(CONTENT_LENGTH, size)
            .body(contents);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let result = Self::decode(response).await?;

        info!(url = %url, size, "File uploaded");
        Ok(result)
    }

    /// GET a resource and stream the response body into a local file.
    ///
    /// The destination is opened before any network I/O; an unopenable
    /// destination fails with `Unwritable` without touching the network.
    /// On an error status the destination file is removed again and the
    /// error carries the service's error body, so a failed download never
    /// leaves a file behind. `alt=json` is appended so that error bodies
    /// come back as JSON.
    pub async fn download_to(&self, path: &str, local_path: &Path) -> Result<PathBuf> {
        let url = self.build_url(path, Some("alt=json"));

        let mut file = match tokio::fs::File::create(local_path).await {
            Ok(file) => file,
            Err(_) => {
                return Err(MediaGridError::Unwritable(
                    local_path.display().to_string(),
                ))
            }
        };

        debug!(url = %url, dest = %local_path.display(), "GET to file");

        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status().as_u16();
        if status >= 300 {
            let message = response.text().await.unwrap_or_default();
            drop(file);
            let _ = tokio::fs::remove_file(local_path).await;
            return Err(MediaGridError::Server {
                status,
                message,
            });
        }

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        info!(url = %url, dest = %local_path.display(), size = downloaded, "File downloaded");
        Ok(local_path.to_path_buf())
    }

    /// Follow a feed's `next` link and return the next page, or None at
    /// the end of results. Stateless: continuation is keyed only by the
    /// URL the service embedded in the previous page.
    pub async fn next_feed(&self, doc: &FeedDoc) -> Result<Option<FeedDoc>> {
        match doc.next_link() {
            Some(href) => {
                let href = href.to_string();
                Ok(Some(self.get(&href, None).await?))
            }
            None => Ok(None),
        }
    }
}
