//! Transport port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::ResponseEncoding;
use crate::errors::FetchError;
use crate::resource::ResourceDescriptor;

/// Port for fetching a resource payload.
///
/// Implementations must settle exactly once per call: either a payload or a
/// failure, never both and never neither. The loader issues at most one
/// fetch at a time and never retries.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Fetch the payload for `descriptor`, reading the body as `encoding`.
    async fn fetch(
        &self,
        descriptor: &ResourceDescriptor,
        encoding: ResponseEncoding,
    ) -> Result<Bytes, FetchError>;
}
