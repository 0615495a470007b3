//! Lifecycle hooks for observing a run.
//!
//! [`RunHooks`] is an async trait with default no-op implementations, so
//! implementors override only the events they care about. Hooks observe
//! the run; they cannot steer it.
//!
//! # Lifecycle Events
//!
//! 1. **`on_agent_start`** — fires when an agent becomes active: once for
//!    the starting agent, and again for each handoff target.
//! 2. **Turn loop** (repeats until a final output):
//!    - `on_tool_start` → *tool execution* → `on_tool_end`, for each
//!      resolved tool call. A call naming an unknown tool fires neither.
//!    - `on_handoff` when control transfers to another agent.
//! 3. **`on_agent_end`** — the active agent produced the final output.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RunContext;

/// A shared, thread-safe [`RunHooks`] trait object.
pub type SharedRunHooks = std::sync::Arc<dyn RunHooks>;

/// Run-level lifecycle hooks.
///
/// Every method receives the active agent's name so listeners can
/// distinguish agents in handoff scenarios. All methods have default
/// no-op implementations.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `Arc<dyn RunHooks>`.
#[async_trait]
pub trait RunHooks: Send + Sync {
    /// Called when an agent becomes the active agent: once for the
    /// starting agent and once per handoff target.
    async fn on_agent_start(&self, _ctx: &RunContext, _agent_name: &str) {}

    /// Called after the active agent produces the final output.
    async fn on_agent_end(&self, _ctx: &RunContext, _agent_name: &str, _output: &str) {}

    /// Called immediately before a resolved tool is invoked.
    ///
    /// Not called for tool calls naming an unknown tool.
    async fn on_tool_start(
        &self,
        _ctx: &RunContext,
        _agent_name: &str,
        _tool_name: &str,
        _args: &Value,
    ) {
    }

    /// Called immediately after a tool completes.
    ///
    /// `result` is the payload fed back to the model: the tool's output
    /// on success, or an error shape when execution failed.
    async fn on_tool_end(
        &self,
        _ctx: &RunContext,
        _agent_name: &str,
        _tool_name: &str,
        _result: &Value,
    ) {
    }

    /// Called when control is handed off from one agent to another.
    async fn on_handoff(&self, _ctx: &RunContext, _from_agent: &str, _to_agent: &str) {}
}

/// A [`RunHooks`] implementation that does nothing.
///
/// The default when no hooks are configured on a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunHooks;

#[async_trait]
impl RunHooks for NoopRunHooks {}
