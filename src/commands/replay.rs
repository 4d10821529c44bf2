// Replay command - feed a recorded host event log through the formatter

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{info, warn};

use crate::cli::args::ReplayArgs;
use crate::config::Config;
use crate::report::Formatter;

/// One line of an event log
#[derive(Debug, Clone, Deserialize)]
pub struct HostEvent {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

/// Counts reported after a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub handled: usize,
    pub rejected: usize,
}

pub fn handle_replay(args: &ReplayArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config.formatter);
    let formatter = super::build_formatter(&config, args.parameters())?;

    info!(
        "Replaying {} as schema {}",
        args.input.display(),
        formatter.generation()
    );

    let summary = if args.input.as_os_str() == "-" {
        replay(&formatter, io::stdin().lock(), args.keep_going)?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open event log: {}", args.input.display()))?;
        replay(&formatter, BufReader::new(file), args.keep_going)?
    };

    info!(
        "Replayed {} event(s), {} rejected",
        summary.handled, summary.rejected
    );

    if summary.rejected > 0 {
        anyhow::bail!("{} event(s) rejected", summary.rejected);
    }

    Ok(())
}

/// Deliver each non-blank line to `formatter`, strictly in order.
///
/// Without `keep_going` the first bad line aborts the replay.
pub fn replay(
    formatter: &dyn Formatter,
    reader: impl BufRead,
    keep_going: bool,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event log")?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;

        let outcome = serde_json::from_str::<HostEvent>(&line)
            .with_context(|| format!("line {}: not a host event", line_no))
            .and_then(|host| {
                formatter
                    .handle(&host.event, &host.payload)
                    .with_context(|| format!("line {}: event '{}'", line_no, host.event))
            });

        match outcome {
            Ok(()) => summary.handled += 1,
            Err(e) if keep_going => {
                warn!("{:#}", e);
                summary.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}
