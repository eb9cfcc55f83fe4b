//! Resource manifests.
//!
//! A manifest is a JSON file in one of two shapes:
//!
//! ```json
//! ["intro.mp3", { "key": "click.ogg", "volume": 0.5 }]
//! ```
//!
//! or, with loader settings alongside the items:
//!
//! ```json
//! {
//!   "baseUrl": "https://cdn.example.com/sounds/",
//!   "config": { "debug": true, "responseEncoding": "binary" },
//!   "items": ["intro.mp3", { "src": "click.ogg" }]
//! }
//! ```
//!
//! Object entries accept `key` or `src`; every other field is kept as
//! descriptor metadata.

use std::path::Path;

use serde::Deserialize;

use seqload_core::{LoaderConfig, ResourceDescriptor};

use crate::error::CliError;

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Base URL for relative keys.
    pub base_url: Option<String>,
    /// Loader settings, if the manifest carries any.
    pub config: Option<LoaderConfig>,
    /// Descriptors in manifest order.
    pub items: Vec<ResourceDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    List(Vec<Entry>),
    Full(FullManifest),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullManifest {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    config: Option<LoaderConfig>,
    items: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Key(String),
    Descriptor(ResourceDescriptor),
}

impl From<Entry> for ResourceDescriptor {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Key(key) => Self::new(key),
            Entry::Descriptor(descriptor) => descriptor,
        }
    }
}

impl Manifest {
    /// Parse manifest JSON.
    pub fn parse(text: &str) -> Result<Self, CliError> {
        let file: ManifestFile =
            serde_json::from_str(text).map_err(|e| CliError::Manifest(e.to_string()))?;

        let manifest = match file {
            ManifestFile::List(entries) => Self {
                items: entries.into_iter().map(Into::into).collect(),
                ..Self::default()
            },
            ManifestFile::Full(full) => Self {
                base_url: full.base_url,
                config: full.config,
                items: full.items.into_iter().map(Into::into).collect(),
            },
        };

        if let Some(empty) = manifest.items.iter().position(|d| d.key.as_str().is_empty()) {
            return Err(CliError::Manifest(format!("item {empty} has an empty key")));
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }
}
