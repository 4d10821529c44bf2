// Generation V1 - flat event names, numeric codes 0..=4.
// Every step is classified on its own and closed as a test of its own.
// Step verdicts land on the owning scenario, so `afterScenario` only closes it.

use serde::Deserialize;
use tracing::debug;

use super::{
    FeatureEvent, Generation, HostException, ScenarioEvent, ScenarioNode, SchemaAdapter,
    StepNode, decode, feature_finished, feature_started, require_title, scenario_started,
};
use crate::dispatch::Subscription;
use crate::error::{ReportError, Result};
use crate::event::{CanonicalEvent, StepStatus};

pub const BEFORE_FEATURE: &str = "beforeFeature";
pub const AFTER_FEATURE: &str = "afterFeature";
pub const BEFORE_SCENARIO: &str = "beforeScenario";
pub const AFTER_SCENARIO: &str = "afterScenario";
pub const AFTER_STEP: &str = "afterStep";

pub const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription {
        event: BEFORE_FEATURE,
        handler: |payload| before_feature(&decode(BEFORE_FEATURE, payload)?),
    },
    Subscription {
        event: AFTER_FEATURE,
        handler: |payload| after_feature(&decode(AFTER_FEATURE, payload)?),
    },
    Subscription {
        event: BEFORE_SCENARIO,
        handler: |payload| before_scenario(&decode(BEFORE_SCENARIO, payload)?),
    },
    Subscription {
        event: AFTER_SCENARIO,
        handler: |payload| after_scenario(&decode(AFTER_SCENARIO, payload)?),
    },
    Subscription {
        event: AFTER_STEP,
        handler: |payload| after_step(&decode(AFTER_STEP, payload)?),
    },
];

pub struct V1Schema;

impl SchemaAdapter for V1Schema {
    fn generation(&self) -> Generation {
        Generation::V1
    }

    fn subscriptions(&self) -> &'static [Subscription] {
        SUBSCRIPTIONS
    }

    fn reports_steps_as_tests(&self) -> bool {
        true
    }
}

/// `afterScenario` payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioResultEvent {
    pub scenario: ScenarioNode,
    pub result: i64,
}

/// `afterStep` payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepResultEvent {
    /// Scenario owning the step; verdicts are attributed to it
    pub scenario: ScenarioNode,
    pub step: StepNode,
    pub result: i64,
    #[serde(default)]
    pub exception: Option<HostException>,
}

/// Decode a V1 result code
pub fn status(code: i64) -> Result<StepStatus> {
    match code {
        0 => Ok(StepStatus::Passed),
        1 => Ok(StepStatus::Skipped),
        2 => Ok(StepStatus::Pending),
        3 => Ok(StepStatus::Undefined),
        4 => Ok(StepStatus::Failed),
        other => Err(ReportError::UnknownStatus {
            generation: Generation::V1,
            status: other.to_string(),
        }),
    }
}

pub fn before_feature(event: &FeatureEvent) -> Result<Vec<CanonicalEvent>> {
    feature_started(BEFORE_FEATURE, &event.feature)
}

pub fn after_feature(event: &FeatureEvent) -> Result<Vec<CanonicalEvent>> {
    feature_finished(AFTER_FEATURE, &event.feature)
}

pub fn before_scenario(event: &ScenarioEvent) -> Result<Vec<CanonicalEvent>> {
    scenario_started(BEFORE_SCENARIO, &event.scenario)
}

pub fn after_scenario(event: &ScenarioResultEvent) -> Result<Vec<CanonicalEvent>> {
    let title = require_title(AFTER_SCENARIO, event.scenario.title.as_deref())?;
    let status = status(event.result)?;
    debug!(scenario = title, %status, "closing scenario");
    Ok(vec![CanonicalEvent::test_finished(title)])
}

pub fn after_step(event: &StepResultEvent) -> Result<Vec<CanonicalEvent>> {
    let scenario = require_title(AFTER_STEP, event.scenario.title.as_deref())?;
    let text = require_title(AFTER_STEP, event.step.text.as_deref())?;
    let message = event.exception.as_ref().map(|e| e.message.clone());

    let mut events = Vec::with_capacity(2);
    events.extend(CanonicalEvent::verdict(
        status(event.result)?.into(),
        scenario,
        message,
    ));
    events.push(CanonicalEvent::test_finished(text));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step_event(result: i64) -> StepResultEvent {
        StepResultEvent {
            scenario: ScenarioNode {
                title: Some("Buying apples".to_string()),
                ..Default::default()
            },
            step: StepNode {
                text: Some("I pay".to_string()),
                keyword: Some("When".to_string()),
                line: Some(4),
            },
            result,
            exception: None,
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status(0).ok(), Some(StepStatus::Passed));
        assert_eq!(status(1).ok(), Some(StepStatus::Skipped));
        assert_eq!(status(2).ok(), Some(StepStatus::Pending));
        assert_eq!(status(3).ok(), Some(StepStatus::Undefined));
        assert_eq!(status(4).ok(), Some(StepStatus::Failed));
        assert!(matches!(
            status(5),
            Err(ReportError::UnknownStatus { generation: Generation::V1, .. })
        ));
    }

    #[test]
    fn test_passed_step_only_finishes() {
        let events = after_step(&step_event(0)).expect("valid step");
        assert_eq!(events, vec![CanonicalEvent::test_finished("I pay")]);
    }

    #[test]
    fn test_undefined_step_fails_owning_scenario_first() {
        let events = after_step(&step_event(3)).expect("valid step");
        assert_eq!(
            events,
            vec![
                CanonicalEvent::test_failed("Buying apples", None),
                CanonicalEvent::test_finished("I pay"),
            ]
        );
    }

    #[test]
    fn test_failed_step_carries_exception_message() {
        let mut event = step_event(4);
        event.exception = Some(HostException {
            message: "expected 3 apples".to_string(),
            ..Default::default()
        });
        let events = after_step(&event).expect("valid step");
        assert_eq!(
            events[0],
            CanonicalEvent::test_failed("Buying apples", Some("expected 3 apples".to_string()))
        );
    }

    #[test]
    fn test_pending_step_is_ignored() {
        let events = after_step(&step_event(2)).expect("valid step");
        assert_eq!(events[0], CanonicalEvent::test_ignored("Buying apples"));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_step_without_scenario_title_is_rejected() {
        let mut event = step_event(0);
        event.scenario.title = None;
        assert!(matches!(
            after_step(&event),
            Err(ReportError::MissingTitle { event: AFTER_STEP })
        ));
    }

    #[test]
    fn test_before_feature_from_payload() {
        let payload = json!({"feature": {"title": "Shop", "file": "features/shop.feature"}});
        let handler = SUBSCRIPTIONS[0].handler;
        let events = handler(&payload).expect("valid payload");
        assert_eq!(
            events,
            vec![CanonicalEvent::suite_started(
                "Shop",
                Some("file://features/shop.feature".to_string())
            )]
        );
    }

    #[test]
    fn test_before_scenario_captures_output_with_line_hint() {
        let event = ScenarioEvent {
            scenario: ScenarioNode {
                title: Some("Buying apples".to_string()),
                file: Some("shop.feature".to_string()),
                line: Some(3),
            },
        };
        assert_eq!(
            before_scenario(&event).expect("valid scenario"),
            vec![CanonicalEvent::test_started(
                "Buying apples",
                Some("file://shop.feature:3".to_string()),
                true
            )]
        );
    }

    #[test]
    fn test_failed_scenario_only_finishes() {
        let event = ScenarioResultEvent {
            scenario: ScenarioNode {
                title: Some("Buying apples".to_string()),
                ..Default::default()
            },
            result: 4,
        };
        assert_eq!(
            after_scenario(&event).expect("valid scenario"),
            vec![CanonicalEvent::test_finished("Buying apples")]
        );
    }

    #[test]
    fn test_after_scenario_rejects_unknown_code() {
        let payload = json!({"scenario": {"title": "S"}, "result": 7});
        let handler = SUBSCRIPTIONS[3].handler;
        assert!(matches!(
            handler(&payload),
            Err(ReportError::UnknownStatus { generation: Generation::V1, .. })
        ));
    }

    #[test]
    fn test_after_scenario_without_result_is_malformed() {
        let payload = json!({"scenario": {"title": "S"}});
        let handler = SUBSCRIPTIONS[3].handler;
        assert!(matches!(
            handler(&payload),
            Err(ReportError::MalformedPayload { .. })
        ));
    }
}
