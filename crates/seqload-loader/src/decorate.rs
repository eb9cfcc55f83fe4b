//! Audio handle decorator.
//!
//! Wraps a fetched payload into a [`MediaHandle`] with a fresh `blob:` URL,
//! picking the MIME type from the key's file extension.

use bytes::Bytes;
use uuid::Uuid;

use seqload_core::media::DEFAULT_MEDIA_TYPE;
use seqload_core::{DecoratorPort, MediaHandle, ResourceDescriptor};

/// Decorator producing audio media handles.
#[derive(Debug, Clone)]
pub struct AudioDecorator {
    fallback_mime: String,
}

impl AudioDecorator {
    /// Create a decorator that falls back to `audio/mpeg`.
    pub fn new() -> Self {
        Self {
            fallback_mime: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }

    /// Use a different MIME type for unrecognized extensions.
    #[must_use]
    pub fn with_fallback_mime(mut self, mime: impl Into<String>) -> Self {
        self.fallback_mime = mime.into();
        self
    }

    /// MIME type for a lowercase file extension.
    fn mime_for_extension(ext: &str) -> Option<&'static str> {
        let mime = match ext {
            "mp3" | "mpga" => "audio/mpeg",
            "ogg" | "oga" | "opus" => "audio/ogg",
            "wav" => "audio/wav",
            "m4a" | "aac" => "audio/aac",
            "flac" => "audio/flac",
            "webm" | "weba" => "audio/webm",
            _ => return None,
        };
        Some(mime)
    }
}

impl Default for AudioDecorator {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoratorPort for AudioDecorator {
    fn decorate(&self, descriptor: &ResourceDescriptor, raw: &Bytes) -> MediaHandle {
        let mime = descriptor
            .key
            .extension()
            .and_then(|ext| Self::mime_for_extension(&ext))
            .unwrap_or(self.fallback_mime.as_str());

        MediaHandle::new(format!("blob:{}", Uuid::new_v4()), mime, raw.clone())
    }
}
