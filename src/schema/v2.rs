// Generation V2 - `tester.*` event names, numeric result codes.
// Step output is folded onto the running scenario as std-out/std-err.

use serde::Deserialize;
use tracing::debug;

use super::{
    FeatureEvent, Generation, HostException, ScenarioEvent, ScenarioNode, SchemaAdapter,
    StepNode, decode, feature_finished, feature_started, scenario_finished, scenario_started,
    step_output,
};
use crate::dispatch::Subscription;
use crate::error::{ReportError, Result};
use crate::event::{CanonicalEvent, StepStatus};

pub const BEFORE_FEATURE: &str = "tester.feature_tested.before";
pub const AFTER_FEATURE: &str = "tester.feature_tested.after";
pub const BEFORE_SCENARIO: &str = "tester.scenario_tested.before";
pub const AFTER_SCENARIO: &str = "tester.scenario_tested.after";
pub const BEFORE_STEP: &str = "tester.step_tested.before";
pub const AFTER_STEP: &str = "tester.step_tested.after";

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
    // Subscribed but silent: nothing is known about a step before it runs
    Subscription {
        event: BEFORE_STEP,
        handler: |_| Ok(Vec::new()),
    },
    Subscription {
        event: AFTER_STEP,
        handler: |payload| after_step(&decode(AFTER_STEP, payload)?),
    },
];

pub struct V2Schema;

impl SchemaAdapter for V2Schema {
    fn generation(&self) -> Generation {
        Generation::V2
    }

    fn subscriptions(&self) -> &'static [Subscription] {
        SUBSCRIPTIONS
    }

    fn reports_steps_as_tests(&self) -> bool {
        false
    }
}

/// Result object of scenario and step events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestResult {
    pub code: i64,
    #[serde(default)]
    pub exception: Option<HostException>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioResultEvent {
    pub scenario: ScenarioNode,
    pub result: TestResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepResultEvent {
    pub step: StepNode,
    pub result: TestResult,
}

/// Decode a V2 result code
pub fn status(code: i64) -> Result<StepStatus> {
    match code {
        0 => Ok(StepStatus::Passed),
        10 => Ok(StepStatus::Skipped),
        20 => Ok(StepStatus::Pending),
        30 => Ok(StepStatus::Undefined),
        99 => Ok(StepStatus::Failed),
        other => Err(ReportError::UnknownStatus {
            generation: Generation::V2,
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
    scenario_finished(AFTER_SCENARIO, &event.scenario, status(event.result.code)?)
}

pub fn after_step(event: &StepResultEvent) -> Result<Vec<CanonicalEvent>> {
    let step_status = status(event.result.code)?;
    debug!(status = %step_status, "step finished");
    step_output(AFTER_STEP, &event.step, event.result.exception.as_ref())
}
