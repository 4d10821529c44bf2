// Commands module - handles CLI command execution

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::debug;

pub mod encode;
pub mod replay;
pub mod subscriptions;

pub use encode::handle_encode;
pub use replay::handle_replay;
pub use subscriptions::handle_subscriptions;

use crate::config::Config;
use crate::protocol::Encoder;
use crate::report::{Formatter, OutputSink, TeamCityFormatter};

/// Handle shell completion
pub fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Supported: bash, zsh, fish, elvish, powershell",
                shell_type
            );
        }
    };

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    generate(shell, &mut cmd, name, &mut stdout);

    Ok(())
}

/// Build a formatter from effective configuration.
///
/// `overrides` win over parameters from the config file; each name is
/// then set exactly once.
pub fn build_formatter(
    config: &Config,
    overrides: Vec<(String, String)>,
) -> Result<TeamCityFormatter> {
    let formatter_config = &config.formatter;
    let target = formatter_config.sink_target();
    let sink = OutputSink::open(&target)
        .with_context(|| format!("Failed to open output: {}", target))?;

    let mut formatter = TeamCityFormatter::new(
        formatter_config.effective_schema(),
        Encoder::new(formatter_config.encoder_options()),
        sink,
    )
    .with_name(formatter_config.name.clone());

    let mut parameters: BTreeMap<String, String> = config.parameters.clone();
    parameters.extend(overrides);
    for (name, value) in &parameters {
        formatter.set_parameter(name, value)?;
    }
    for (name, value) in formatter.parameters().iter() {
        debug!(formatter = formatter.name(), parameter = name, value, "formatter parameter");
    }

    Ok(formatter)
}
