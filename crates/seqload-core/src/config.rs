//! Loader configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LoaderError;

/// How the transport should read response bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEncoding {
    /// Raw bytes, untouched.
    #[default]
    Binary,
    /// UTF-8 text, stored as its bytes.
    Text,
}

impl ResponseEncoding {
    /// Get the lowercase name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ResponseEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseEncoding {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            // `arraybuffer` is what browser-era manifests call binary bodies
            "binary" | "arraybuffer" | "bytes" => Ok(Self::Binary),
            "text" => Ok(Self::Text),
            other => Err(LoaderError::config(format!(
                "unknown response encoding '{other}' (expected 'binary' or 'text')"
            ))),
        }
    }
}

/// Configuration for a queue controller.
///
/// Deserializes from camelCase keys (`autoStart`, `debug`,
/// `responseEncoding`); missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    /// Call `start()` as soon as the controller is constructed.
    pub auto_start: bool,
    /// Record debug traces (start on empty queue, fetch failures, dropped
    /// enqueues) and log them at warn level.
    pub debug: bool,
    /// Body encoding requested from the transport.
    pub response_encoding: ResponseEncoding,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            debug: false,
            response_encoding: ResponseEncoding::Binary,
        }
    }
}

impl LoaderConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether construction starts the controller.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set debug trace recording.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the response encoding.
    #[must_use]
    pub const fn with_response_encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.response_encoding = encoding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert!(config.auto_start);
        assert!(!config.debug);
        assert_eq!(config.response_encoding, ResponseEncoding::Binary);
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"debug": true, "responseEncoding": "text"}"#).unwrap();
        assert!(config.auto_start);
        assert!(config.debug);
        assert_eq!(config.response_encoding, ResponseEncoding::Text);
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::new()
            .with_auto_start(false)
            .with_debug(true)
            .with_response_encoding(ResponseEncoding::Text);
        assert!(!config.auto_start);
        assert!(config.debug);
        assert_eq!(config.response_encoding.to_string(), "text");
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("binary".parse::<ResponseEncoding>().unwrap(), ResponseEncoding::Binary);
        assert_eq!(
            "ArrayBuffer".parse::<ResponseEncoding>().unwrap(),
            ResponseEncoding::Binary
        );
        assert_eq!("text".parse::<ResponseEncoding>().unwrap(), ResponseEncoding::Text);
        assert!(matches!(
            "blob".parse::<ResponseEncoding>(),
            Err(LoaderError::Config { .. })
        ));
    }
}
