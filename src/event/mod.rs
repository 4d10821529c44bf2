// Event module - canonical test lifecycle events
// Every schema generation translates into these; the encoder only ever sees these.

pub mod outcome;

pub use outcome::{Outcome, StepStatus};

use serde::{Deserialize, Serialize};

/// Schema-independent representation of one reportable occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CanonicalEvent {
    /// A feature (suite) begins
    SuiteStarted {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location_hint: Option<String>,
    },

    /// A feature (suite) ends
    SuiteFinished {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location_hint: Option<String>,
    },

    /// A scenario begins
    TestStarted {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location_hint: Option<String>,
        #[serde(default)]
        capture_output: bool,
    },

    /// A scenario ends, whatever its outcome
    TestFinished { name: String },

    /// A scenario or step did not pass
    TestFailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A scenario or step was skipped or pending
    TestIgnored { name: String },

    /// Informational text attached to an entity
    StdOut { name: String, text: String },

    /// Error detail attached to an entity
    StdErr { name: String, text: String },
}

impl CanonicalEvent {
    pub fn suite_started(name: impl Into<String>, location_hint: Option<String>) -> Self {
        Self::SuiteStarted {
            name: name.into(),
            location_hint,
        }
    }

    pub fn suite_finished(name: impl Into<String>, location_hint: Option<String>) -> Self {
        Self::SuiteFinished {
            name: name.into(),
            location_hint,
        }
    }

    pub fn test_started(
        name: impl Into<String>,
        location_hint: Option<String>,
        capture_output: bool,
    ) -> Self {
        Self::TestStarted {
            name: name.into(),
            location_hint,
            capture_output,
        }
    }

    pub fn test_finished(name: impl Into<String>) -> Self {
        Self::TestFinished { name: name.into() }
    }

    pub fn test_failed(name: impl Into<String>, message: Option<String>) -> Self {
        Self::TestFailed {
            name: name.into(),
            message,
        }
    }

    pub fn test_ignored(name: impl Into<String>) -> Self {
        Self::TestIgnored { name: name.into() }
    }

    pub fn std_out(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::StdOut {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn std_err(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::StdErr {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Build the verdict event for a non-passing outcome.
    ///
    /// Passing outcomes produce nothing; the caller still owes the
    /// matching `TestFinished`.
    pub fn verdict(outcome: Outcome, name: &str, message: Option<String>) -> Option<Self> {
        match outcome {
            Outcome::Passed => None,
            Outcome::Failed => Some(Self::test_failed(name, message)),
            Outcome::Ignored => Some(Self::test_ignored(name)),
        }
    }

    /// Title of the entity the event refers to
    pub fn name(&self) -> &str {
        match self {
            Self::SuiteStarted { name, .. }
            | Self::SuiteFinished { name, .. }
            | Self::TestStarted { name, .. }
            | Self::TestFinished { name }
            | Self::TestFailed { name, .. }
            | Self::TestIgnored { name }
            | Self::StdOut { name, .. }
            | Self::StdErr { name, .. } => name,
        }
    }
}
