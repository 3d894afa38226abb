//! Account credentials and service endpoint configuration.

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("mediagrid-rs/", env!("CARGO_PKG_VERSION"));

/// MediaGrid account credentials.
///
/// Sent as HTTP Basic auth on every request. Immutable once a client has
/// been constructed from them.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Where a service lives and how to reach it.
///
/// Every service family has its own host (e.g. the storage service and the
/// transcoding service are separate deployments). Uploads over TLS require
/// a secure account on the platform side.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Hostname of the web service, without scheme (e.g. "storage.cdn01.mediagrid.io")
    pub host: String,
    /// Use https instead of http
    pub use_tls: bool,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Endpoint {
    /// Create an endpoint for the given host, plain http, default user agent.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            use_tls: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Enable TLS for this endpoint.
    pub fn with_tls(mut self) -> Self {
        self.use_tls = true;
        self
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
