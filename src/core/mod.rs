pub mod audit;
pub mod config;
pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod types;

pub use audit::{AuditEvent, AuditLog, LogEntry};
pub use config::{ConfigLoader, LazarusConfig, ToolSpec};
pub use error::AppError;
pub use invoker::{InvocationOutcome, ToolInvoker};
pub use orchestrator::{HealingOrchestrator, ToolExecutionRequest, ToolResult};
pub use registry::{Tool, ToolRegistry};
pub use resolver::{FallbackCandidate, FallbackResolver};
pub use types::*;
