pub mod loader;

pub use loader::ConfigLoader;

use crate::core::types::RankingStrategy;
use crate::logging::config::LoggingSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Lazarus configuration loaded from lazarus.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LazarusConfig {
    /// HTTP service configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Tool invocation configuration
    #[serde(default)]
    pub invoker: InvokerConfig,

    /// Fallback resolution configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Audit log sink configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Process logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Registry catalogue: one entry per invocable tool
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the orchestration API
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Tool invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokerConfig {
    /// Per-call timeout in milliseconds; a hung tool must not stall healing
    #[serde(default = "default_invoke_timeout_ms")]
    pub timeout_ms: u64,
}

/// Fallback resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Cap on category-match candidates
    #[serde(default = "default_match_cap")]
    pub match_cap: usize,

    /// Ordering applied to category-match candidates
    #[serde(default)]
    pub ranking: RankingStrategy,
}

/// Audit log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSONL ledger file path (relative paths resolve against the workspace)
    #[serde(default = "default_audit_file")]
    pub log_file: PathBuf,
}

/// One registry catalogue entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name
    pub name: String,

    /// Capability grouping used for similarity-based fallback search
    pub category: String,

    /// Invocation endpoint URL
    pub endpoint: String,

    /// Ordered tool names to try when this tool fails
    #[serde(default)]
    pub fallback_tools: Vec<String>,

    /// Lower priority is tried first among eligible fallbacks
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Inactive tools are never selected as fallback candidates
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_invoke_timeout_ms(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_cap: default_match_cap(),
            ranking: RankingStrategy::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_file: default_audit_file(),
        }
    }
}

// Default functions
fn default_bind() -> String {
    "127.0.0.1:8900".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_invoke_timeout_ms() -> u64 {
    30_000
}

fn default_match_cap() -> usize {
    3
}

fn default_audit_file() -> PathBuf {
    PathBuf::from(".lazarus/audit.jsonl")
}

fn default_priority() -> i32 {
    100
}

fn default_is_active() -> bool {
    true
}
