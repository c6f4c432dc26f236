use crate::core::audit::{AuditEvent, AuditLog};
use crate::core::invoker::ToolInvoker;
use crate::core::registry::ToolRegistry;
use crate::core::resolver::FallbackResolver;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// One client ask: execute `tool_name`, healing within `category` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionRequest {
    pub tool_name: String,
    pub category: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// The orchestrator's response. Constructed once per request; the audit log
/// holds the persisted trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tool_used: String,
    pub was_healed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing_path: Option<Vec<String>>,
}

/// Drives one request through the healing state machine:
/// lookup primary, invoke it, and on failure walk the resolver's candidates
/// in order until one succeeds or all are exhausted.
///
/// Attempts are strictly sequential so the audit log's write order is the
/// real attempt order. No failure mode escapes to the caller; every path
/// yields a `ToolResult` plus log entries.
pub struct HealingOrchestrator {
    registry: Arc<ToolRegistry>,
    invoker: ToolInvoker,
    resolver: FallbackResolver,
    audit: Arc<AuditLog>,
}

impl HealingOrchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        invoker: ToolInvoker,
        resolver: FallbackResolver,
        audit: Arc<AuditLog>,
    ) -> Self {
        HealingOrchestrator {
            registry,
            invoker,
            resolver,
            audit,
        }
    }

    pub async fn execute(&self, request: &ToolExecutionRequest) -> ToolResult {
        let tool_name = request.tool_name.as_str();
        let session = request.session_id.as_deref();
        let mut healing_path = vec![request.tool_name.clone()];

        // LOOKUP_PRIMARY: the one path that never attempts healing.
        let primary = match self.registry.get(tool_name) {
            Some(tool) => tool.clone(),
            None => {
                self.audit.record(
                    AuditEvent::error(format!("Tool not found: {}", tool_name))
                        .session(session)
                        .tool(tool_name),
                );
                return ToolResult {
                    success: false,
                    data: None,
                    error: Some("Tool not found".to_string()),
                    tool_used: request.tool_name.clone(),
                    was_healed: false,
                    healing_path: None,
                };
            }
        };

        // INVOKE_PRIMARY
        self.audit.record(
            AuditEvent::info(format!("Executing primary tool: {}", tool_name))
                .session(session)
                .tool(tool_name)
                .metadata(json!({ "params": request.params })),
        );

        let mut outcome = self
            .invoker
            .invoke(tool_name, &primary.endpoint, &request.params)
            .await;

        if outcome.success {
            self.audit.record(
                AuditEvent::success(format!("{} executed successfully", tool_name))
                    .session(session)
                    .tool(tool_name),
            );
            return ToolResult {
                success: true,
                data: outcome.data,
                error: None,
                tool_used: request.tool_name.clone(),
                was_healed: false,
                healing_path: None,
            };
        }

        // RESOLVE_FALLBACKS
        info!("primary tool {} failed, entering healing mode", tool_name);
        self.audit.record(
            AuditEvent::healing(format!(
                "Primary tool {} failed. Searching for backups...",
                tool_name
            ))
            .session(session)
            .tool(tool_name)
            .metadata(json!({ "error": outcome.error })),
        );

        let candidates = self.resolver.resolve(&request.category, tool_name);
        info!("found {} potential fallbacks", candidates.len());

        // INVOKE_FALLBACK*: strictly in resolver order, one at a time.
        for candidate in &candidates {
            healing_path.push(candidate.name.clone());

            self.audit.record(
                AuditEvent::healing(format!("Attempting fallback: {}", candidate.name))
                    .session(session)
                    .tool(tool_name)
                    .backup(&candidate.name),
            );

            outcome = self
                .invoker
                .invoke(&candidate.name, &candidate.endpoint, &request.params)
                .await;

            if outcome.success {
                self.audit.record(
                    AuditEvent::success(format!(
                        "Self-healed! {} succeeded after {} failed",
                        candidate.name, tool_name
                    ))
                    .session(session)
                    .tool(&candidate.name)
                    .metadata(json!({ "healing_path": healing_path })),
                );
                return ToolResult {
                    success: true,
                    data: outcome.data,
                    error: None,
                    tool_used: candidate.name.clone(),
                    was_healed: true,
                    healing_path: Some(healing_path),
                };
            }

            self.audit.record(
                AuditEvent::error(format!("Fallback {} also failed", candidate.name))
                    .session(session)
                    .tool(&candidate.name)
                    .metadata(json!({ "error": outcome.error })),
            );
        }

        // EXHAUSTED
        warn!(
            "all tools exhausted for {} after {} attempts",
            tool_name,
            healing_path.len()
        );
        self.audit.record(
            AuditEvent::error("All tools exhausted. Could not complete task.")
                .session(session)
                .tool(tool_name)
                .metadata(json!({
                    "healing_path": healing_path,
                    "final_error": outcome.error,
                })),
        );

        let last_error = outcome.error.unwrap_or_else(|| "Unknown error".to_string());
        let tool_used = healing_path
            .last()
            .cloned()
            .unwrap_or_else(|| request.tool_name.clone());
        ToolResult {
            success: false,
            data: None,
            error: Some(format!("All tools failed. Last error: {}", last_error)),
            tool_used,
            was_healed: false,
            healing_path: Some(healing_path),
        }
    }
}
