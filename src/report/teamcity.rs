// TeamCity formatter - host events in, service message lines out

use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::debug;

use super::{Formatter, OutputSink, Parameters, VerdictLedger};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::event::CanonicalEvent;
use crate::protocol::Encoder;
use crate::schema::Generation;

pub const DEFAULT_NAME: &str = "teamcity";
pub const DESCRIPTION: &str = "Formatter for teamcity";

/// Formatter translating one schema generation into service messages
#[derive(Debug)]
pub struct TeamCityFormatter {
    name: String,
    dispatcher: Dispatcher,
    encoder: Encoder,
    parameters: Parameters,
    verdicts: Mutex<VerdictLedger>,
    sink: OutputSink,
}

impl TeamCityFormatter {
    pub fn new(generation: Generation, encoder: Encoder, sink: OutputSink) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            dispatcher: Dispatcher::new(generation),
            encoder,
            parameters: Parameters::default(),
            verdicts: Mutex::default(),
            sink,
        }
    }

    /// Register under a different formatter name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn generation(&self) -> Generation {
        self.dispatcher.generation()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Encode and write already-translated events, in order.
    /// Repeated verdicts for an entity within one cycle are dropped.
    pub fn emit(&self, events: &[CanonicalEvent]) -> Result<()> {
        let mut verdicts = self.verdicts.lock().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            if !verdicts.admit(event) {
                debug!(entity = event.name(), "entity already has a verdict, dropping");
                continue;
            }
            self.sink.write_line(&self.encoder.encode(event))?;
        }
        Ok(())
    }
}

impl Formatter for TeamCityFormatter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        self.parameters.set(name, value)
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    fn subscribed_events(&self) -> Vec<&'static str> {
        self.dispatcher.subscribed_events().collect()
    }

    fn handle(&self, event: &str, payload: &Value) -> Result<()> {
        let events = self.dispatcher.dispatch(event, payload)?;
        debug!(formatter = %self.name, event, lines = events.len(), "emitting service messages");
        self.emit(&events)
    }
}
