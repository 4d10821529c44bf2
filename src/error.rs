// Error types for event translation and encoding

use thiserror::Error;

use crate::schema::Generation;

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

/// Host-contract violations and sink failures
#[derive(Debug, Error)]
pub enum ReportError {
    /// The host delivered an event without a usable title
    #[error("event '{event}' carries no title")]
    MissingTitle { event: &'static str },

    /// The host fired an event the generation never subscribed to
    #[error("event '{event}' is not subscribed by schema {generation}")]
    UnknownEvent { event: String, generation: Generation },

    /// The payload does not match the generation's event shape
    #[error("malformed payload for event '{event}': {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// A raw result code or status string outside the generation's vocabulary
    #[error("unknown result status '{status}' for schema {generation}")]
    UnknownStatus {
        generation: Generation,
        status: String,
    },

    #[error("parameter '{0}' is already set")]
    ParameterAlreadySet(String),

    #[error("failed to write service message: {0}")]
    Io(#[from] std::io::Error),
}
