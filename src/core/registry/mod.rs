use crate::core::config::ToolSpec;
use crate::core::types::RankingStrategy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One invocable capability as recorded in the catalogue.
///
/// Records are created and edited out-of-band; during orchestration the
/// registry is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub category: String,
    pub endpoint: String,
    pub fallback_tools: Vec<String>,
    pub priority: i32,
    pub is_active: bool,
}

impl From<ToolSpec> for Tool {
    fn from(spec: ToolSpec) -> Self {
        Tool {
            name: spec.name,
            category: spec.category,
            endpoint: spec.endpoint,
            fallback_tools: spec.fallback_tools,
            priority: spec.priority,
            is_active: spec.is_active,
        }
    }
}

/// Name-keyed catalogue of tools with deterministic candidate ranking.
///
/// The map preserves catalogue insertion order so both ranking strategies
/// stay stable across runs.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: IndexMap<String, Tool>,
    ranking: RankingStrategy,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Tool>, ranking: RankingStrategy) -> Self {
        let mut map = IndexMap::with_capacity(tools.len());
        for tool in tools {
            map.insert(tool.name.clone(), tool);
        }
        ToolRegistry {
            tools: map,
            ranking,
        }
    }

    pub fn from_specs(specs: Vec<ToolSpec>, ranking: RankingStrategy) -> Self {
        Self::new(specs.into_iter().map(Tool::from).collect(), ranking)
    }

    /// Look up a tool by name. A missing record is an ordinary outcome.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Active records for a tool's explicit fallback list, ascending priority.
    /// Names not present in the catalogue are skipped; the failed tool never
    /// lists itself.
    pub fn explicit_fallbacks(&self, tool: &Tool) -> Vec<&Tool> {
        let mut fallbacks: Vec<&Tool> = tool
            .fallback_tools
            .iter()
            .filter(|name| name.as_str() != tool.name)
            .filter_map(|name| self.tools.get(name))
            .filter(|candidate| candidate.is_active)
            .collect();
        fallbacks.sort_by_key(|candidate| candidate.priority);
        fallbacks
    }

    /// Active same-category tools excluding `exclude`, ranked and capped.
    pub fn match_category(&self, category: &str, exclude: &str, cap: usize) -> Vec<&Tool> {
        let mut matches: Vec<&Tool> = self
            .tools
            .values()
            .filter(|tool| tool.is_active && tool.category == category && tool.name != exclude)
            .collect();
        if self.ranking == RankingStrategy::Priority {
            // Stable sort keeps catalogue order for equal priorities.
            matches.sort_by_key(|tool| tool.priority);
        }
        matches.truncate(cap);
        matches
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Catalogue iteration in insertion order, for listings.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }
}
