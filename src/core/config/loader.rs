#![allow(clippy::result_large_err)]

use super::LazarusConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/lazarus.toml).
    /// Environment variables override config file values.
    /// A missing file yields defaults plus env vars.
    pub fn load_from_workspace(workspace_path: &Path) -> Result<LazarusConfig, AppError> {
        let config_path = workspace_path.join("lazarus.toml");
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load config from specific file path.
    /// Returns Ok(None) if file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<LazarusConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: LazarusConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Load from an explicit --config path, falling back to the workspace file.
    pub fn load(
        config_path: Option<&Path>,
        workspace_path: &Path,
    ) -> Result<LazarusConfig, AppError> {
        let mut config = match config_path {
            Some(path) => Self::load_from_file(path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("Config file {} does not exist", path.display()),
                )
            })?,
            None => {
                return Self::load_from_workspace(workspace_path);
            }
        };
        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    /// Environment variables take precedence over config file values.
    fn apply_env_overrides(config: &mut LazarusConfig) {
        if let Ok(bind) = env::var("LAZARUS_SERVER_BIND") {
            config.server.bind = bind;
        }

        if let Ok(timeout_str) = env::var("LAZARUS_INVOKER_TIMEOUT_MS") {
            if let Ok(timeout_ms) = timeout_str.parse::<u64>() {
                config.invoker.timeout_ms = timeout_ms;
            }
        }

        if let Ok(cap_str) = env::var("LAZARUS_RESOLVER_MATCH_CAP") {
            if let Ok(match_cap) = cap_str.parse::<usize>() {
                config.resolver.match_cap = match_cap;
            }
        }

        if let Ok(log_file) = env::var("LAZARUS_AUDIT_LOG_FILE") {
            config.audit.log_file = PathBuf::from(log_file);
        }

        if let Ok(level) = env::var("LAZARUS_LOG_LEVEL") {
            config.logging.default_level = level;
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "LAZARUS_SERVER_BIND - Override API bind address (default: 127.0.0.1:8900)",
            "LAZARUS_INVOKER_TIMEOUT_MS - Override per-invocation timeout (default: 30000)",
            "LAZARUS_RESOLVER_MATCH_CAP - Override category match cap (default: 3)",
            "LAZARUS_AUDIT_LOG_FILE - Override audit ledger path (default: .lazarus/audit.jsonl)",
            "LAZARUS_LOG_LEVEL - Override process log level (default: info)",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &LazarusConfig) -> Result<(), AppError> {
        config
            .server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("server.bind '{}' is not a socket address: {}", config.server.bind, e),
                )
            })?;

        if config.invoker.timeout_ms == 0 {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "invoker.timeout_ms must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for tool in &config.tools {
            if tool.name.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "tool name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!("duplicate tool name '{}'", tool.name),
                ));
            }
            url::Url::parse(&tool.endpoint).map_err(|e| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("tool '{}' endpoint '{}' is invalid: {}", tool.name, tool.endpoint, e),
                )
            })?;
        }

        Ok(())
    }
}
