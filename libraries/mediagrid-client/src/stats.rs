//! Usage statistics and metering feeds.
//!
//! All operations are read-only feed queries. Filtering (date ranges,
//! aggregation, paging) happens through caller-supplied query strings; the
//! service documents the accepted parameters per resource.

use crate::config::{Credentials, Endpoint};
use crate::envelope::FeedDoc;
use crate::error::Result;
use crate::rest::RestClient;

/// Default host of the statistics service.
pub const DEFAULT_HOST: &str = "stats.mon01.mediagrid.io";

/// Client for the statistics service.
pub struct StatsClient {
    rest: RestClient,
}

impl StatsClient {
    /// Create a client against the default statistics host.
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

    /// Traffic records, optionally scoped to a path on the CDN.
    pub async fn traffic_feed(&self, path: Option<&str>, query: Option<&str>) -> Result<FeedDoc> {
        let mut uri = String::from("/traffic/");
        if let Some(path) = path {
            uri.push_str(path.trim_start_matches('/'));
        }
        self.rest.get(&uri, query).await
    }

    /// Aggregated traffic totals.
    pub async fn total_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/total/", query).await
    }

    /// Storage usage records.
    pub async fn storage_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/storage/", query).await
    }

    /// Concurrent viewer records.
    pub async fn concurrent_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/concurrent/v1/", query).await
    }

    /// Geographic breakdown by domain.
    pub async fn domain_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/geo/domain/", query).await
    }

    /// Geographic breakdown by city.
    pub async fn city_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/geo/city/", query).await
    }

    /// Geographic breakdown by requesting host.
    pub async fn host_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/geo/host/", query).await
    }

    /// Saved statistics filters.
    pub async fn filter_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/filter/", query).await
    }

    /// Traffic broken down by type (download, streaming, ...).
    pub async fn traffic_type_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/traffic-type/", query).await
    }

    /// Billable usage per customer.
    pub async fn payed_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/customer/payed/", query).await
    }

    /// Users attached to the customer account.
    pub async fn users_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/customer/users/", query).await
    }

    /// Used quota per customer.
    pub async fn used_feed(&self, query: Option<&str>) -> Result<FeedDoc> {
        self.rest.get("/customer/used/", query).await
    }

    /// Next page of any feed from this service.
    pub async fn next_feed(&self, feed: &FeedDoc) -> Result<Option<FeedDoc>> {
        self.rest.next_feed(feed).await
    }
}
