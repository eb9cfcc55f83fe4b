//! Configuration for the HTTP transport.

use std::time::Duration;

/// Configuration for [`HttpTransport`](super::HttpTransport).
///
/// # Example
///
/// ```
/// use seqload_loader::HttpTransportConfig;
/// use std::time::Duration;
///
/// let config = HttpTransportConfig::new()
///     .with_base_url("https://cdn.example.com/sounds/")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL that relative keys are resolved against.
    pub(crate) base_url: Option<String>,
    /// User agent string for HTTP requests.
    pub(crate) user_agent: String,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: concat!("seqload/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative keys against this URL.
    ///
    /// A trailing slash matters: `https://cdn/x/` joined with `a.mp3` gives
    /// `https://cdn/x/a.mp3`, while `https://cdn/x` gives `https://cdn/a.mp3`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Configured request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpTransportConfig::default();
        assert!(config.base_url.is_none());
        assert!(config.user_agent.starts_with("seqload/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let config = HttpTransportConfig::new()
            .with_base_url("https://cdn.test/")
            .with_user_agent("tests/1.0")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url.as_deref(), Some("https://cdn.test/"));
        assert_eq!(config.user_agent, "tests/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
