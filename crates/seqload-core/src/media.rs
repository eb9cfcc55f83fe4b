//! Decorated media handles.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default MIME type for payloads whose type cannot be inferred.
pub const DEFAULT_MEDIA_TYPE: &str = "audio/mpeg";

/// A playable handle built from a fetched payload.
///
/// The handle shares the payload buffer (`Bytes` is reference counted), so
/// cloning it is cheap. The payload itself is not serialized; events sent
/// over the wire carry only the object URL, MIME type and size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaHandle {
    /// Opaque in-process URL identifying this handle (`blob:<uuid>`).
    pub object_url: String,
    /// MIME type of the payload.
    pub mime: String,
    /// Payload size in bytes.
    pub size: u64,
    /// The payload backing this handle.
    #[serde(skip)]
    pub bytes: Bytes,
}

impl MediaHandle {
    /// Create a new handle over a payload.
    pub fn new(object_url: impl Into<String>, mime: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            object_url: object_url.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_records_size() {
        let handle = MediaHandle::new("blob:1", DEFAULT_MEDIA_TYPE, Bytes::from_static(b"abc"));
        assert_eq!(handle.size, 3);
        assert_eq!(handle.mime, "audio/mpeg");
    }

    #[test]
    fn test_handle_serialization_omits_payload() {
        let handle = MediaHandle::new("blob:1", "audio/ogg", Bytes::from_static(b"abc"));
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"objectUrl": "blob:1", "mime": "audio/ogg", "size": 3})
        );
    }
}
