// Configuration file handling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::protocol::{EncoderOptions, EscapeMode, StdOutStyle};
use crate::report::SinkTarget;
use crate::schema::Generation;

pub const CONFIG_FILE_NAME: &str = ".teamcity-bdd.toml";
pub const ENV_TEAMCITY_BDD_SCHEMA: &str = "TEAMCITY_BDD_SCHEMA";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub formatter: FormatterConfig,

    /// Opaque parameters handed to the formatter once at startup
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatterConfig {
    /// Name the host selects the formatter by
    #[serde(default = "default_name")]
    pub name: String,

    /// Host event schema generation; falls back to the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Generation>,

    /// Attribute escaping
    #[serde(default)]
    pub escape: EscapeMode,

    /// Emit a newline before every service message
    #[serde(default)]
    pub leading_newline: bool,

    /// Message kind used for step output
    #[serde(default)]
    pub stdout_style: StdOutStyle,

    /// Fixed flowId attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,

    /// Attach timestamps to every message
    #[serde(default)]
    pub timestamps: bool,

    /// stderr, stdout or a file path
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            schema: None,
            escape: EscapeMode::default(),
            leading_newline: false,
            stdout_style: StdOutStyle::default(),
            flow_id: None,
            timestamps: false,
            output: default_output(),
        }
    }
}

pub fn default_name() -> String {
    String::from(crate::report::teamcity::DEFAULT_NAME)
}

pub fn default_output() -> String {
    String::from("stderr")
}

/// Schema named by the environment, if any and valid
pub fn schema_from_env() -> Option<Generation> {
    std::env::var(ENV_TEAMCITY_BDD_SCHEMA).ok()?.parse().ok()
}

impl FormatterConfig {
    /// Configured schema, else `TEAMCITY_BDD_SCHEMA`, else the newest
    pub fn effective_schema(&self) -> Generation {
        self.schema.or_else(schema_from_env).unwrap_or_default()
    }

    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            escape: self.escape,
            leading_newline: self.leading_newline,
            stdout_style: self.stdout_style,
            flow_id: self.flow_id.clone(),
            timestamps: self.timestamps,
        }
    }

    pub fn sink_target(&self) -> SinkTarget {
        self.output.parse().unwrap_or_default()
    }
}

impl Config {
    /// Candidate config locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load configuration from default locations
    pub fn load() -> Option<(Self, PathBuf)> {
        Self::search_paths()
            .into_iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(&path).map(|config| (config, path)))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
