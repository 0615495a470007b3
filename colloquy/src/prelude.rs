//! Convenience re-exports for common usage.
//!
//! ```rust,ignore
//! use colloquy::prelude::*;
//! ```

pub use crate::agent::{
    Agent, Instructions, InstructionsProvider, RunConfig, RunItem, RunResult, Runner,
};
pub use crate::client::{
    GenerationClient, GenerationRequest, ModelSettings, ResponsePart, SharedGenerationClient,
};
pub use crate::context::RunContext;
pub use crate::error::{
    Error, GenerationError, GenerationErrorKind, GuardrailStage, Result, ToolError,
};
pub use crate::guardrail::{
    GuardrailVerdict, InputGuardrail, InputGuardrailCheck, OutputGuardrail, OutputGuardrailCheck,
};
pub use crate::handoff::{Handoff, HandoffFilter};
pub use crate::hooks::{NoopRunHooks, RunHooks, SharedRunHooks};
pub use crate::message::{Message, Part, Role};
pub use crate::tool::{FunctionTool, SharedTool, Tool, ToolDefinition, ToolResult};
