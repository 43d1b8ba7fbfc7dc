use std::time::Duration;

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("psnawp-rs/", env!("CARGO_PKG_VERSION"));

/// Which URL schemes the client accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// `https://` only.
    #[default]
    TlsOnly,
    /// `http://` as well; meant for local mock servers.
    AllowInsecureHttp,
}

/// Settings consumed by [`HttpClientBuilder`](crate::HttpClientBuilder).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Upper bound on one request, connect to last body byte. Default 30s.
    pub request_timeout: Duration,
    /// Responses larger than this fail with `BodyTooLarge`. Default 10 MiB.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    /// Requests that may queue in front of the connection pool before the
    /// client reports `Overloaded`. Default 64.
    pub buffer_capacity: usize,
    /// `None` keeps hyper-util's default.
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 << 20,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
        }
    }
}
