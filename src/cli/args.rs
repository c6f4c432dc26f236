use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Workspace containing lazarus.toml and runtime state (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to custom config file (default: {workspace}/lazarus.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Override the API bind address (default from config: 127.0.0.1:8900)
    #[arg(long, value_name = "ADDR", help_heading = "Configuration")]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Primary tool to attempt
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Capability category used for fallback search
    #[arg(long, value_name = "CATEGORY")]
    pub category: String,

    /// JSON object passed verbatim to whichever tool is invoked
    #[arg(long, value_name = "JSON", default_value = "{}")]
    pub params: String,

    /// Correlation identifier threaded through the audit trail
    #[arg(long, value_name = "SESSION")]
    pub session: Option<String>,

    /// Workspace containing lazarus.toml (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to custom config file (default: {workspace}/lazarus.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolsArgs {
    /// Workspace containing lazarus.toml (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to custom config file (default: {workspace}/lazarus.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct LogsArgs {
    /// Number of entries to show, newest first (default: 50)
    #[arg(long, default_value = "50", value_name = "N")]
    pub limit: usize,

    /// Remove all entries instead of listing them
    #[arg(long)]
    pub clear: bool,

    /// Workspace containing lazarus.toml (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to custom config file (default: {workspace}/lazarus.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}
