//! Loader lifecycle events.
//!
//! Events are addressed by name. The three built-in names are `itemLoaded`,
//! `itemError` and `complete`; any other name is carried as
//! [`EventName::Custom`] so handlers can be registered for names the loader
//! does not emit itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FetchError;
use crate::media::MediaHandle;
use crate::resource::ResourceDescriptor;
use crate::status::ResultSummary;

/// Title carried by every `itemError` payload.
pub const ITEM_ERROR_TITLE: &str = "seqload fetch error";

/// Name of a lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A resource was fetched and decorated.
    ItemLoaded,
    /// A resource fetch failed.
    ItemError,
    /// The batch drained with nothing outstanding.
    Complete,
    /// Any other name.
    Custom(String),
}

impl EventName {
    /// Get the wire name of this event.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ItemLoaded => "itemLoaded",
            Self::ItemError => "itemError",
            Self::Complete => "complete",
            Self::Custom(name) => name,
        }
    }

    /// Whether the loader itself emits this event.
    pub const fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        match name {
            "itemLoaded" => Self::ItemLoaded,
            "itemError" => Self::ItemError,
            "complete" => Self::Complete,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

/// Payload delivered to event handlers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LoaderEvent {
    /// A resource was fetched and decorated.
    #[serde(rename_all = "camelCase")]
    ItemLoaded {
        /// The decorated handle.
        result: MediaHandle,
        /// The descriptor as enqueued.
        item: ResourceDescriptor,
    },

    /// A resource fetch failed. The failure is recorded, not thrown.
    #[serde(rename_all = "camelCase")]
    ItemError {
        /// Short title, always [`ITEM_ERROR_TITLE`].
        title: String,
        /// Human-readable message.
        message: String,
        /// The descriptor as enqueued.
        data: ResourceDescriptor,
        /// The structured failure.
        error: FetchError,
    },

    /// The batch drained with nothing outstanding.
    Complete {
        /// Result counts at the moment of completion.
        summary: ResultSummary,
    },

    /// Caller-defined event.
    Custom {
        /// Event name.
        name: String,
        /// Arbitrary payload.
        payload: serde_json::Value,
    },
}

impl LoaderEvent {
    /// Build an `itemError` event for a failed descriptor.
    pub fn item_error(data: ResourceDescriptor, error: FetchError) -> Self {
        Self::ItemError {
            title: ITEM_ERROR_TITLE.to_string(),
            message: error.user_message(),
            data,
            error,
        }
    }

    /// The name handlers are registered under for this event.
    pub fn name(&self) -> EventName {
        match self {
            Self::ItemLoaded { .. } => EventName::ItemLoaded,
            Self::ItemError { .. } => EventName::ItemError,
            Self::Complete { .. } => EventName::Complete,
            Self::Custom { name, .. } => EventName::from(name.as_str()),
        }
    }

    /// The descriptor this event is about, if any.
    pub const fn descriptor(&self) -> Option<&ResourceDescriptor> {
        match self {
            Self::ItemLoaded { item, .. } => Some(item),
            Self::ItemError { data, .. } => Some(data),
            Self::Complete { .. } | Self::Custom { .. } => None,
        }
    }
}
