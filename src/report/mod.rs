// Report module - formatter contract, parameters and output

pub mod sink;
pub mod teamcity;
pub mod verdicts;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ReportError, Result};
pub use sink::{OutputSink, SharedBuffer, SinkTarget};
pub use teamcity::TeamCityFormatter;
pub use verdicts::VerdictLedger;

/// Contract a host test runner drives a formatter through
pub trait Formatter: Send + Sync {
    /// Name the host selects the formatter by
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Store a host-supplied parameter; each name may be set once
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()>;

    fn parameter(&self, name: &str) -> Option<&str>;

    /// Event names the host should deliver
    fn subscribed_events(&self) -> Vec<&'static str>;

    /// Called once per host lifecycle event, strictly in host order
    fn handle(&self, event: &str, payload: &Value) -> Result<()>;
}

/// Set-once parameter store. Values are opaque to the formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        if self.values.contains_key(name) {
            return Err(ReportError::ParameterAlreadySet(name.to_string()));
        }
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
