//! Decoration port definition.

use bytes::Bytes;

use crate::media::MediaHandle;
use crate::resource::ResourceDescriptor;

/// Port for turning a fetched payload into a playable handle.
///
/// Decoration is a pure, synchronous transform with no I/O. It is assumed
/// never to fail.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait DecoratorPort: Send + Sync {
    /// Build a handle for the payload fetched for `descriptor`.
    fn decorate(&self, descriptor: &ResourceDescriptor, raw: &Bytes) -> MediaHandle;
}
