// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::FormatterConfig;
use crate::protocol::{EscapeMode, StdOutStyle};
use crate::schema::Generation;

/// Translate BDD runner lifecycle events into TeamCity service messages
#[derive(Parser, Debug)]
#[command(name = "teamcity-bdd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Translate BDD runner lifecycle events into TeamCity service messages",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a newline-delimited JSON log of host events
    Replay(ReplayArgs),

    /// Print the registration table of a schema generation
    Subscriptions(SubscriptionsArgs),

    /// Render a single canonical event given as JSON
    Encode(EncodeArgs),
}

/// Encoder and output overrides shared by commands that write messages
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderArgs {
    /// Attribute escaping (teamcity, legacy)
    #[arg(long, value_name = "MODE")]
    pub escape: Option<EscapeMode>,

    /// Emit a newline before every service message
    #[arg(long, default_value_t = false)]
    pub leading_newline: bool,

    /// Message kind for step output (testStdOut, message)
    #[arg(long, value_name = "STYLE")]
    pub stdout_style: Option<StdOutStyle>,

    /// Attach a flowId attribute to every message
    #[arg(long, value_name = "FLOW_ID")]
    pub flow_id: Option<String>,

    /// Attach a timestamp attribute to every message
    #[arg(long, default_value_t = false)]
    pub timestamps: bool,

    /// Where to write messages: stderr (default), stdout or a file path
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    pub output: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Event log to read, `-` for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Host schema generation (v1, v2, v3)
    #[arg(short = 's', long, value_name = "SCHEMA")]
    pub schema: Option<Generation>,

    /// Formatter name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Formatter parameter, may be repeated
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Log contract violations and continue with the next event
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    #[command(flatten)]
    pub encoder: EncoderArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SubscriptionsArgs {
    /// Host schema generation (v1, v2, v3)
    #[arg(short = 's', long, value_name = "SCHEMA")]
    pub schema: Option<Generation>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Canonical event as JSON, `-` for stdin
    pub event: String,

    #[command(flatten)]
    pub encoder: EncoderArgs,
}

fn is_json_format(value: &str) -> bool {
    value.eq_ignore_ascii_case("json")
}

impl SubscriptionsArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}

impl EncoderArgs {
    /// Apply command-line overrides on top of file configuration
    pub fn apply(&self, config: &mut FormatterConfig) {
        if let Some(escape) = self.escape {
            config.escape = escape;
        }
        if self.leading_newline {
            config.leading_newline = true;
        }
        if let Some(style) = self.stdout_style {
            config.stdout_style = style;
        }
        if let Some(flow_id) = &self.flow_id {
            config.flow_id = Some(flow_id.clone());
        }
        if self.timestamps {
            config.timestamps = true;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
    }
}

impl ReplayArgs {
    pub fn apply(&self, config: &mut FormatterConfig) {
        if let Some(schema) = self.schema {
            config.schema = Some(schema);
        }
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        self.encoder.apply(config);
    }

    /// `KEY=VALUE` pairs; a bare key gets an empty value
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|param| match param.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.to_string()),
                None => (param.trim().to_string(), String::new()),
            })
            .collect()
    }
}
