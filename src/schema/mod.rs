// Schema module - adapters from host event generations to canonical events
//
// Each generation owns its event names and raw result encoding; the
// shapes below are the parts all three agree on.

pub mod v1;
pub mod v2;
pub mod v3;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::dispatch::Subscription;
use crate::error::{ReportError, Result};
use crate::event::{CanonicalEvent, StepStatus};

/// Host event schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Flat event names, numeric codes 0..=4, steps reported as tests
    V1,
    /// `tester.*` event names, numeric codes 0/10/20/30/99
    V2,
    /// `tester.*` event names, textual statuses
    #[default]
    V3,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::V1, Generation::V2, Generation::V3];

    pub fn adapter(self) -> &'static dyn SchemaAdapter {
        match self {
            Generation::V1 => &v1::V1Schema,
            Generation::V2 => &v2::V2Schema,
            Generation::V3 => &v3::V3Schema,
        }
    }
}

impl std::str::FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            "v3" | "3" => Ok(Self::V3),
            other => Err(format!("unknown schema '{}' (expected v1, v2 or v3)", other)),
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::V1 => f.write_str("v1"),
            Generation::V2 => f.write_str("v2"),
            Generation::V3 => f.write_str("v3"),
        }
    }
}

/// Contract every schema generation fulfils
pub trait SchemaAdapter: Send + Sync {
    fn generation(&self) -> Generation;

    /// Registration table, in declaration order
    fn subscriptions(&self) -> &'static [Subscription];

    /// Whether each step becomes its own test entity (as opposed to
    /// output folded onto the running scenario)
    fn reports_steps_as_tests(&self) -> bool;
}

/// Feature as seen by every generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeatureNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// Scenario as seen by every generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StepNode {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

/// Exception attached to a step result
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostException {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl HostException {
    /// `file[:line]`, if the host told us where it was raised
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref().filter(|f| !f.is_empty())?;
        Some(match self.line {
            Some(line) => format!("{}:{}", file, line),
            None => file.to_string(),
        })
    }
}

/// Payload of feature before/after events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureEvent {
    pub feature: FeatureNode,
}

/// Payload of scenario before events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioEvent {
    pub scenario: ScenarioNode,
}

pub(crate) fn decode<T: DeserializeOwned>(event: &'static str, payload: &Value) -> Result<T> {
    T::deserialize(payload).map_err(|source| ReportError::MalformedPayload {
        event: event.to_string(),
        source,
    })
}

/// A title the protocol can key on, or a contract violation
pub(crate) fn require_title<'a>(event: &'static str, title: Option<&'a str>) -> Result<&'a str> {
    match title {
        Some(title) if !title.trim().is_empty() => Ok(title),
        _ => {
            warn!(event, "host delivered an event without a title");
            Err(ReportError::MissingTitle { event })
        }
    }
}

/// `file://<path>[:<line>]`
pub(crate) fn location_hint(file: Option<&str>, line: Option<u32>) -> Option<String> {
    let file = file.filter(|f| !f.is_empty())?;
    Some(match line {
        Some(line) => format!("file://{}:{}", file, line),
        None => format!("file://{}", file),
    })
}

pub(crate) fn feature_started(event: &'static str, feature: &FeatureNode) -> Result<Vec<CanonicalEvent>> {
    let title = require_title(event, feature.title.as_deref())?;
    Ok(vec![CanonicalEvent::suite_started(
        title,
        location_hint(feature.file.as_deref(), None),
    )])
}

pub(crate) fn feature_finished(event: &'static str, feature: &FeatureNode) -> Result<Vec<CanonicalEvent>> {
    let title = require_title(event, feature.title.as_deref())?;
    Ok(vec![CanonicalEvent::suite_finished(
        title,
        location_hint(feature.file.as_deref(), None),
    )])
}

pub(crate) fn scenario_started(event: &'static str, scenario: &ScenarioNode) -> Result<Vec<CanonicalEvent>> {
    let title = require_title(event, scenario.title.as_deref())?;
    Ok(vec![CanonicalEvent::test_started(
        title,
        location_hint(scenario.file.as_deref(), scenario.line),
        true,
    )])
}

/// Verdict (if any) followed by the closing `TestFinished`
pub(crate) fn scenario_finished(
    event: &'static str,
    scenario: &ScenarioNode,
    status: StepStatus,
) -> Result<Vec<CanonicalEvent>> {
    let title = require_title(event, scenario.title.as_deref())?;
    let mut events = Vec::with_capacity(2);
    events.extend(CanonicalEvent::verdict(status.into(), title, None));
    events.push(CanonicalEvent::test_finished(title));
    Ok(events)
}

/// Step output folded onto the running scenario: `StdErr` for an
/// attached exception, then `StdOut` with the step line.
pub(crate) fn step_output(
    event: &'static str,
    step: &StepNode,
    exception: Option<&HostException>,
) -> Result<Vec<CanonicalEvent>> {
    let text = require_title(event, step.text.as_deref())?;
    let mut events = Vec::with_capacity(2);

    if let Some(exception) = exception {
        let location = exception.location().unwrap_or_else(|| text.to_string());
        events.push(CanonicalEvent::std_err(location, exception.message.clone()));
    }

    events.push(CanonicalEvent::std_out(text, step_line(step, text)));
    Ok(events)
}

/// Step as written in the feature file, keyword included when known
pub(crate) fn step_line(step: &StepNode, text: &str) -> String {
    match step.keyword.as_deref().map(str::trim) {
        Some(keyword) if !keyword.is_empty() => format!("{} {}", keyword, text),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_title_rejects_missing_and_blank() {
        assert!(matches!(
            require_title("e", None),
            Err(ReportError::MissingTitle { event: "e" })
        ));
        assert!(require_title("e", Some("   ")).is_err());
        assert_eq!(require_title("e", Some(" F ")).ok(), Some(" F "));
    }

    #[test]
    fn test_location_hint_forms() {
        assert_eq!(
            location_hint(Some("features/a.feature"), None).as_deref(),
            Some("file://features/a.feature")
        );
        assert_eq!(
            location_hint(Some("a.feature"), Some(7)).as_deref(),
            Some("file://a.feature:7")
        );
        assert_eq!(location_hint(None, Some(7)), None);
        assert_eq!(location_hint(Some(""), None), None);
    }

    #[test]
    fn test_exception_location() {
        let exception = HostException {
            message: "x".to_string(),
            file: Some("FeatureX.feature".to_string()),
            line: Some(12),
        };
        assert_eq!(exception.location().as_deref(), Some("FeatureX.feature:12"));
        assert_eq!(HostException::default().location(), None);
    }

    #[test]
    fn test_step_output_without_exception_location_falls_back_to_step() {
        let step = StepNode {
            text: Some("I fail".to_string()),
            keyword: Some("When".to_string()),
            line: None,
        };
        let exception = HostException {
            message: "nope".to_string(),
            ..Default::default()
        };
        let events = step_output("e", &step, Some(&exception)).expect("valid step");
        assert_eq!(
            events,
            vec![
                CanonicalEvent::std_err("I fail", "nope"),
                CanonicalEvent::std_out("I fail", "When I fail"),
            ]
        );
    }

    #[test]
    fn test_generation_from_str() {
        assert_eq!("V2".parse(), Ok(Generation::V2));
        assert_eq!("3".parse(), Ok(Generation::V3));
        assert!("v4".parse::<Generation>().is_err());
    }

    #[test]
    fn test_adapter_reports_its_generation() {
        for generation in Generation::ALL {
            assert_eq!(generation.adapter().generation(), generation);
        }
    }
}
