use crate::class::RestClass;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::net::{ReqwestTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shared state behind every class and request issued by one client.
pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
}

/// Entry point for a REST API rooted at one base URL.
///
/// The client is a cheap handle; clones share the same configuration and
/// transport.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client with default configuration for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Scope a resource class below the base URL, e.g. `"posts"`.
    pub fn create_class(&self, path: &str) -> RestClass {
        RestClass::new(self.inner.clone(), path)
    }

    /// The class addressing the base URL itself.
    pub fn root_class(&self) -> RestClass {
        RestClass::new(self.inner.clone(), "")
    }
}

#[derive(Default)]
pub struct RestClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl RestClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Swap in a custom transport (tests, instrumentation).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<RestClient, ClientError> {
        let raw = self.base_url.ok_or(ClientError::MissingBaseUrl)?;
        let base_url = Url::parse(&raw)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrlNotABase(raw));
        }

        let mut config = ClientConfig::new(base_url);
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(&config.user_agent, config.timeout)
                    .map_err(|e| ClientError::Transport(e.to_string()))?,
            ),
        };

        Ok(RestClient {
            inner: Arc::new(ClientInner { config, transport }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_base_url() {
        let err = RestClient::builder().build().unwrap_err();
        assert!(matches!(err, ClientError::MissingBaseUrl));
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        let err = RestClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ClientError::BaseUrlParse(_)));
    }

    #[test]
    fn base_url_must_support_paths() {
        let err = RestClient::builder()
            .base_url("mailto:someone@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::BaseUrlNotABase(_)));
    }

    #[test]
    fn builder_overrides_land_in_the_config() {
        let client = RestClient::builder()
            .base_url("http://localhost:3000")
            .user_agent("tester/1.0")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.config().user_agent, "tester/1.0");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn classes_scope_their_paths() {
        let client = RestClient::new("http://localhost:3000").unwrap();
        let posts = client.create_class("posts");
        assert_eq!(posts.path(), "posts");
        assert_eq!(posts.subclass("comments").path(), "posts/comments");
        assert_eq!(client.root_class().path(), "");
    }
}
