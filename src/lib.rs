pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod logging;
pub mod protocol;
pub mod report;
pub mod schema;

pub use dispatch::Dispatcher;
pub use error::{ReportError, Result};
pub use event::{CanonicalEvent, Outcome, StepStatus};
pub use protocol::{Encoder, EncoderOptions, EscapeMode};
pub use report::{Formatter, OutputSink, TeamCityFormatter};
pub use schema::Generation;
