use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_LEVEL: &str = "info";

/// Where console logs should be emitted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleOutput {
    Stdout,
    #[default]
    Stderr,
    None,
}

impl fmt::Display for ConsoleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleOutput::Stdout => write!(f, "stdout"),
            ConsoleOutput::Stderr => write!(f, "stderr"),
            ConsoleOutput::None => write!(f, "none"),
        }
    }
}

impl FromStr for ConsoleOutput {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "stdout" => Ok(ConsoleOutput::Stdout),
            "stderr" => Ok(ConsoleOutput::Stderr),
            "none" => Ok(ConsoleOutput::None),
            _ => Err(format!(
                "invalid logging.console_output '{}'; supported values are stdout, stderr, none",
                value
            )),
        }
    }
}

/// Process logging settings from the `[logging]` config section.
///
/// This governs operational tracing only; the orchestration audit trail is a
/// separate sink with its own configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default tracing directive when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub default_level: String,

    /// Mirror process logs into a file sink
    #[serde(default = "default_enable_file")]
    pub enable_file: bool,

    /// Log directory (relative paths resolve against the workspace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Console sink selection
    #[serde(default)]
    pub console_output: ConsoleOutput,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            enable_file: default_enable_file(),
            log_dir: None,
            console_output: ConsoleOutput::default(),
        }
    }
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

fn default_enable_file() -> bool {
    true
}
