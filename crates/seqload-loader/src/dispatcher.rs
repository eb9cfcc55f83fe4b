//! Event dispatcher.
//!
//! Maps each event name to at most one handler. Registering a handler for a
//! name replaces the previous one; this is not a multi-subscriber bus.
//! Emitting an event with no registered handler is a silent no-op.

use std::collections::HashMap;
use std::fmt;

use seqload_core::{EventName, LoaderEvent};

/// A registered event handler.
///
/// Handlers run synchronously on the thread that emits the event and must
/// not block.
pub type EventHandler = Box<dyn FnMut(&LoaderEvent) + Send + 'static>;

/// Registry of one optional handler per event name.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<EventName, EventHandler>,
}

impl EventDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`, replacing any existing handler.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn on(&mut self, name: impl Into<EventName>, handler: EventHandler) -> bool {
        self.handlers.insert(name.into(), handler).is_some()
    }

    /// Remove the handler for `name`.
    ///
    /// Returns `true` if a handler was registered.
    pub fn off(&mut self, name: &EventName) -> bool {
        self.handlers.remove(name).is_some()
    }

    /// Whether a handler is registered for `name`.
    pub fn has_handler(&self, name: &EventName) -> bool {
        self.handlers.contains_key(name)
    }

    /// Invoke the handler registered under the event's name, if any.
    ///
    /// Returns `true` if a handler ran.
    pub fn emit(&mut self, event: &LoaderEvent) -> bool {
        let name = event.name();
        self.handlers.get_mut(&name).is_some_and(|handler| {
            handler(event);
            true
        })
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().map(EventName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EventDispatcher")
            .field("handlers", &names)
            .finish()
    }
}
