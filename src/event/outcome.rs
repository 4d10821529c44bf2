// Outcome classification - the one policy shared by every schema generation

use serde::{Deserialize, Serialize};

/// Raw result vocabulary a host reports for a step or scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Skipped,
    Pending,
    Undefined,
    Failed,
}

impl StepStatus {
    pub const ALL: [StepStatus; 5] = [
        StepStatus::Passed,
        StepStatus::Skipped,
        StepStatus::Pending,
        StepStatus::Undefined,
        StepStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Skipped => "skipped",
            Self::Pending => "pending",
            Self::Undefined => "undefined",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for StepStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "skipped" => Ok(Self::Skipped),
            "pending" => Ok(Self::Pending),
            "undefined" => Ok(Self::Undefined),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way verdict derived from a [`StepStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Passed,
    Failed,
    Ignored,
}

impl From<StepStatus> for Outcome {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Passed => Outcome::Passed,
            // An undefined step is a failure, not merely unimplemented
            StepStatus::Failed | StepStatus::Undefined => Outcome::Failed,
            StepStatus::Pending | StepStatus::Skipped => Outcome::Ignored,
        }
    }
}
