// Diagnostic logging for the binary. Service messages never go through here.
// Logs default to stderr, which is also the default message sink; lines from
// both stay whole, so `--log-file` is only needed to keep them apart.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Default filter when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "teamcity_bdd=debug,warn"
    } else {
        "teamcity_bdd=warn,error"
    }
}

/// Log destination: `path` (truncated) when given, stderr otherwise
pub fn log_writer(path: Option<&Path>) -> io::Result<BoxMakeWriter> {
    Ok(match path {
        Some(path) => BoxMakeWriter::new(Mutex::new(File::create(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    })
}

/// Install the global subscriber
pub fn init(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    tracing_subscriber::fmt()
        .event_format(LogFormatter)
        .with_writer(log_writer(log_file)?)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .init();
    Ok(())
}

/// `LEVEL [HH:MM:SS] target: message fields`
pub struct LogFormatter;

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let timestamp = Local::now().format("%H:%M:%S");

        let level_str = match *metadata.level() {
            tracing::Level::TRACE => "TRACE",
            tracing::Level::DEBUG => "DEBUG",
            tracing::Level::INFO => "INFO ",
            tracing::Level::WARN => "WARN ",
            tracing::Level::ERROR => "ERROR",
        };

        write!(writer, "{} [{}] {}: ", level_str, timestamp, metadata.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
