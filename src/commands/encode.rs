// Encode command - render one canonical event

use anyhow::{Context, Result};
use std::io::Read;

use crate::cli::args::EncodeArgs;
use crate::config::Config;
use crate::event::CanonicalEvent;
use crate::protocol::Encoder;
use crate::report::OutputSink;

pub fn handle_encode(args: &EncodeArgs, mut config: Config) -> Result<()> {
    args.encoder.apply(&mut config.formatter);

    let source = if args.event == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        args.event.clone()
    };

    let line = encode_json(&Encoder::new(config.formatter.encoder_options()), &source)?;

    let target = config.formatter.sink_target();
    let sink = OutputSink::open(&target)
        .with_context(|| format!("Failed to open output: {}", target))?;
    sink.write_line(&line)
        .context("Failed to write service message")?;

    Ok(())
}

/// Parse a canonical event from JSON and render it
pub fn encode_json(encoder: &Encoder, source: &str) -> Result<String> {
    let event: CanonicalEvent =
        serde_json::from_str(source.trim()).context("Invalid canonical event JSON")?;

    if event.name().trim().is_empty() {
        anyhow::bail!("Canonical event has an empty name");
    }

    Ok(encoder.encode(&event))
}
