use std::time::Duration;
use url::Url;

/// User agent sent when the caller does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("restly/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL that every relative request path is resolved against.
    pub base_url: Url,
    /// Value of the `User-Agent` header for issued requests.
    pub user_agent: String,
    /// Per-exchange timeout, enforced by the transport.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with default user agent and timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
