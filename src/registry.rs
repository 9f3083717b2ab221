//! Handler registry: event-type tag to ordered handler list.
//!
//! The registry is built once at startup and read thereafter. Handlers carry
//! an explicit kind tag so the pipeline knows statically which calling
//! convention each one expects; nothing is ever inferred from a failed call.

use crate::effect::Effect;
use crate::error::Result;
use crate::event::EventRecord;
use crate::handlers;
use crate::pipeline::ScratchState;
use std::collections::HashMap;

/// Signature of a handler that is a pure function of the event.
pub type StatelessFn = fn(&EventRecord) -> Result<Vec<Effect>>;

/// Signature of a handler that also reads and mutates pipeline scratch state.
pub type StatefulFn = fn(&mut ScratchState, &EventRecord) -> Result<Vec<Effect>>;

/// A registered handler, tagged with the calling convention it declares.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Pure function of the event record.
    Stateless(StatelessFn),

    /// Additionally reads/writes the pipeline's scratch state.
    Stateful(StatefulFn),
}

/// Mapping from event-type tag to the ordered list of handlers for it.
///
/// Registration order is preserved and determines the order effects are
/// emitted within one event when multiple handlers match the same type.
/// Duplicate registrations are permitted and run twice; the registry never
/// deduplicates.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Creates a registry populated with every built-in domain handler.
    ///
    /// This is the explicit, statically built equivalent of decentralized
    /// registration: every `(event_type, handler)` pair is enumerated here.
    pub fn with_default_handlers() -> Self {
        let mut registry = HandlerRegistry::new();
        registry.register("buy", Handler::Stateless(handlers::trade_handler));
        registry.register("sell", Handler::Stateless(handlers::trade_handler));
        registry.register("T", Handler::Stateful(handlers::clearing_handler));
        registry
    }

    /// Appends `handler` to the list for `event_type`, preserving insertion
    /// order.
    pub fn register(&mut self, event_type: &str, handler: Handler) {
        self.handlers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    /// Returns the handlers for `event_type` in registration order.
    ///
    /// Unknown types return an empty slice, never an error: an event with no
    /// matching handler simply produces no effects.
    pub fn lookup(&self, event_type: &str) -> &[Handler] {
        self.handlers
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` if no handlers are registered at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
