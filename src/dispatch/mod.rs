// Dispatch module - static registration tables and event routing
//
// Tables are `const` slices owned by each schema generation; nothing here
// is mutable after program start.

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ReportError, Result};
use crate::event::CanonicalEvent;
use crate::schema::Generation;

/// Adapter entry point for one host event
pub type Handler = fn(&Value) -> Result<Vec<CanonicalEvent>>;

/// One row of a registration table
#[derive(Clone, Copy)]
pub struct Subscription {
    pub event: &'static str,
    pub handler: Handler,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

/// Routes host events to the handlers of one schema generation
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    generation: Generation,
    table: &'static [Subscription],
}

impl Dispatcher {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            table: generation.adapter().subscriptions(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Event names the host should deliver, in declaration order
    pub fn subscribed_events(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.iter().map(|s| s.event)
    }

    /// Run the handler registered for `event`
    pub fn dispatch(&self, event: &str, payload: &Value) -> Result<Vec<CanonicalEvent>> {
        let subscription = self
            .table
            .iter()
            .find(|s| s.event == event)
            .ok_or_else(|| ReportError::UnknownEvent {
                event: event.to_string(),
                generation: self.generation,
            })?;

        trace!(event, generation = %self.generation, "dispatching host event");
        let events = (subscription.handler)(payload)?;
        debug!(event, produced = events.len(), "translated host event");
        Ok(events)
    }
}
