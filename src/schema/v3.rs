// Generation V3 - `tester.*` event names, textual statuses

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

pub use super::v2::{AFTER_FEATURE, AFTER_SCENARIO, AFTER_STEP, BEFORE_FEATURE, BEFORE_SCENARIO};

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

pub struct V3Schema;

impl SchemaAdapter for V3Schema {
    fn generation(&self) -> Generation {
        Generation::V3
    }

    fn subscriptions(&self) -> &'static [Subscription] {
        SUBSCRIPTIONS
    }

    fn reports_steps_as_tests(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestResult {
    pub status: String,
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

/// Decode a V3 status name
pub fn status(name: &str) -> Result<StepStatus> {
    name.parse().map_err(|_| ReportError::UnknownStatus {
        generation: Generation::V3,
        status: name.to_string(),
    })
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
    scenario_finished(AFTER_SCENARIO, &event.scenario, status(&event.result.status)?)
}

pub fn after_step(event: &StepResultEvent) -> Result<Vec<CanonicalEvent>> {
    let step_status = status(&event.result.status)?;
    debug!(status = %step_status, "step finished");
    step_output(AFTER_STEP, &event.step, event.result.exception.as_ref())
}
