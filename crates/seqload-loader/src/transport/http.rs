//! HTTP transport using reqwest.
//!
//! Issues a single `GET` per fetch. There is no retry logic: a failed fetch
//! is reported once and recorded by the controller.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use url::Url;

use seqload_core::{
    FetchError, LoaderError, ResourceDescriptor, ResourceKey, ResponseEncoding, TransportPort,
};

use super::config::HttpTransportConfig;

/// Production transport fetching resources over HTTP(S).
///
/// Keys that parse as absolute URLs are fetched as-is; anything else is
/// resolved against the configured base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    /// Create a transport from its configuration.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, LoaderError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|base| {
                Url::parse(base)
                    .map_err(|e| LoaderError::config(format!("invalid base URL '{base}': {e}")))
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LoaderError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Resolve a key to the URL that will be fetched.
    pub fn resolve(&self, key: &ResourceKey) -> Result<Url, FetchError> {
        let url = match Url::parse(key.as_str()) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let Some(base) = &self.base_url else {
                    return Err(FetchError::invalid_key(
                        key.as_str(),
                        "relative key and no base URL configured",
                    ));
                };
                base.join(key.as_str())
                    .map_err(|e| FetchError::invalid_key(key.as_str(), e.to_string()))?
            }
            Err(e) => return Err(FetchError::invalid_key(key.as_str(), e.to_string())),
        };

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(FetchError::invalid_key(
                key.as_str(),
                format!("unsupported scheme '{scheme}'"),
            )),
        }
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn fetch(
        &self,
        descriptor: &ResourceDescriptor,
        encoding: ResponseEncoding,
    ) -> Result<Bytes, FetchError> {
        let url = self.resolve(&descriptor.key)?;
        tracing::debug!(target: "seqload.transport", key = %descriptor.key, %url, %encoding, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(descriptor.key.as_str()));
        }
        if !status.is_success() {
            return Err(FetchError::network_with_status(
                format!("GET {url} returned {status}"),
                status.as_u16(),
            ));
        }

        match encoding {
            ResponseEncoding::Binary => response.bytes().await.map_err(|e| network_error(&e)),
            ResponseEncoding::Text => response
                .text()
                .await
                .map(Bytes::from)
                .map_err(|e| FetchError::decode(e.to_string())),
        }
    }
}

fn network_error(err: &reqwest::Error) -> FetchError {
    match err.status() {
        Some(status) => FetchError::network_with_status(err.to_string(), status.as_u16()),
        None => FetchError::network(err.to_string()),
    }
}
