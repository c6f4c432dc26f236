use crate::core::registry::ToolRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Replacement candidate produced by fallback resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCandidate {
    pub name: String,
    pub endpoint: String,
}

/// Produces the ordered candidate list for a failed tool.
///
/// Explicit fallback declarations always take precedence over category
/// similarity; candidates are deduplicated and never include the failed tool
/// or inactive records.
pub struct FallbackResolver {
    registry: Arc<ToolRegistry>,
    match_cap: usize,
}

impl FallbackResolver {
    pub fn new(registry: Arc<ToolRegistry>, match_cap: usize) -> Self {
        FallbackResolver {
            registry,
            match_cap,
        }
    }

    pub fn resolve(&self, category: &str, failed_tool: &str) -> Vec<FallbackCandidate> {
        if let Some(tool) = self.registry.get(failed_tool) {
            if !tool.fallback_tools.is_empty() {
                let explicit = dedup(
                    self.registry
                        .explicit_fallbacks(tool)
                        .into_iter()
                        .map(|candidate| FallbackCandidate {
                            name: candidate.name.clone(),
                            endpoint: candidate.endpoint.clone(),
                        }),
                );
                if !explicit.is_empty() {
                    debug!(
                        "resolved {} explicit fallbacks for {}",
                        explicit.len(),
                        failed_tool
                    );
                    return explicit;
                }
            }
        }

        let matches = dedup(
            self.registry
                .match_category(category, failed_tool, self.match_cap)
                .into_iter()
                .map(|candidate| FallbackCandidate {
                    name: candidate.name.clone(),
                    endpoint: candidate.endpoint.clone(),
                }),
        );
        debug!(
            "resolved {} category candidates for {} in '{}'",
            matches.len(),
            failed_tool,
            category
        );
        matches
    }
}

fn dedup(candidates: impl Iterator<Item = FallbackCandidate>) -> Vec<FallbackCandidate> {
    let mut seen = HashSet::new();
    candidates
        .filter(|candidate| seen.insert(candidate.name.clone()))
        .collect()
}
