//! Streaming edge service.

use crate::config::{Credentials, Endpoint};
use crate::envelope::FeedDoc;
use crate::error::Result;
use crate::rest::RestClient;

/// Default host of the streaming edge service.
pub const DEFAULT_HOST: &str = "edge.str01.mediagrid.io";

/// Client for the streaming edge service.
pub struct EdgeClient {
    rest: RestClient,
}

impl EdgeClient {
    /// Create a client against the default edge host.
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

    /// Streaming applications provisioned for the account.
    pub async fn application_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/wowapp/", query).await
    }

    /// Next page of any feed from this service.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }
}
