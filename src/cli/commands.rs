use crate::{
    cli::args::{ExecArgs, LogsArgs, ServeArgs, ToolsArgs},
    core::{
        audit::AuditLog,
        config::{ConfigLoader, LazarusConfig},
        invoker::ToolInvoker,
        orchestrator::{HealingOrchestrator, ToolExecutionRequest},
        registry::ToolRegistry,
        resolver::FallbackResolver,
    },
    logging, server,
    server::ApiState,
    Result,
};
use anyhow::{anyhow, Context};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn resolve_workspace(path: &Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => env::current_dir().context("failed to determine current directory"),
    }
}

fn load_config(config: &Option<PathBuf>, workspace: &Path) -> Result<LazarusConfig> {
    ConfigLoader::load(config.as_deref(), workspace).map_err(anyhow::Error::new)
}

fn resolve_audit_path(config: &LazarusConfig, workspace: &Path) -> PathBuf {
    if config.audit.log_file.is_absolute() {
        config.audit.log_file.clone()
    } else {
        workspace.join(&config.audit.log_file)
    }
}

/// Assemble the orchestration stack from resolved configuration.
fn build_stack(
    config: &LazarusConfig,
    workspace: &Path,
) -> Result<(Arc<ToolRegistry>, Arc<AuditLog>, HealingOrchestrator)> {
    let registry = Arc::new(ToolRegistry::from_specs(
        config.tools.clone(),
        config.resolver.ranking,
    ));
    let audit = Arc::new(
        AuditLog::open(resolve_audit_path(config, workspace)).map_err(anyhow::Error::new)?,
    );
    let invoker = ToolInvoker::from_timeout_ms(config.invoker.timeout_ms);
    let resolver = FallbackResolver::new(registry.clone(), config.resolver.match_cap);
    let orchestrator =
        HealingOrchestrator::new(registry.clone(), invoker, resolver, audit.clone());
    Ok((registry, audit, orchestrator))
}

pub async fn serve(args: ServeArgs) -> Result<()> {
    let workspace = resolve_workspace(&args.path)?;
    let mut config = load_config(&args.config, &workspace)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let _guard = logging::init(&config.logging, &workspace)?;
    let (registry, audit, orchestrator) = build_stack(&config, &workspace)?;
    tracing::info!(
        "starting orchestration service with {} registered tools",
        registry.len()
    );

    let state = Arc::new(ApiState {
        orchestrator,
        audit,
    });
    server::serve(state, &config.server)
        .await
        .map_err(anyhow::Error::new)
}

pub async fn exec(args: ExecArgs) -> Result<()> {
    let workspace = resolve_workspace(&args.path)?;
    let config = load_config(&args.config, &workspace)?;
    let _guard = logging::init(&config.logging, &workspace)?;

    let params: serde_json::Value = serde_json::from_str(&args.params)
        .map_err(|e| anyhow!("--params must be valid JSON: {}", e))?;

    let (_registry, _audit, orchestrator) = build_stack(&config, &workspace)?;
    let request = ToolExecutionRequest {
        tool_name: args.tool,
        category: args.category,
        params,
        session_id: args.session,
    };

    let result = orchestrator.execute(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn tools(args: ToolsArgs) -> Result<()> {
    let workspace = resolve_workspace(&args.path)?;
    let config = load_config(&args.config, &workspace)?;
    let registry = ToolRegistry::from_specs(config.tools, config.resolver.ranking);

    if registry.is_empty() {
        println!("No tools registered. Add [[tools]] entries to lazarus.toml.");
        return Ok(());
    }

    for tool in registry.iter() {
        let status = if tool.is_active { "active" } else { "inactive" };
        let fallbacks = if tool.fallback_tools.is_empty() {
            "-".to_string()
        } else {
            tool.fallback_tools.join(", ")
        };
        println!(
            "{}  [{}] priority={} {}  fallbacks: {}  endpoint: {}",
            tool.name, tool.category, tool.priority, status, fallbacks, tool.endpoint
        );
    }
    Ok(())
}

pub async fn logs(args: LogsArgs) -> Result<()> {
    let workspace = resolve_workspace(&args.path)?;
    let config = load_config(&args.config, &workspace)?;
    let audit =
        AuditLog::open(resolve_audit_path(&config, &workspace)).map_err(anyhow::Error::new)?;

    if args.clear {
        audit.clear().map_err(anyhow::Error::new)?;
        println!("Audit log cleared");
        return Ok(());
    }

    for entry in audit.latest(args.limit) {
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}
