//! Run configuration and result types.

use std::time::Duration;

use serde_json::Value;

use crate::context::RunContext;
use crate::guardrail::{InputGuardrail, OutputGuardrail};
use crate::hooks::SharedRunHooks;
use crate::message::Message;

/// Run-level configuration passed to [`Runner::run`](super::Runner::run).
///
/// All fields have defaults; `RunConfig::default()` gives a plain run
/// with the standard turn budget and no hooks.
#[derive(Clone, Default)]
pub struct RunConfig {
    /// Turn budget override. When `None`, [`Runner::DEFAULT_MAX_TURNS`]
    /// (10) applies.
    pub max_turns: Option<usize>,

    /// Lifecycle hooks observing the run.
    pub hooks: Option<SharedRunHooks>,

    /// Seed for the run context, carrying pre-populated user state that
    /// hooks, guardrails, and handoff filters can read.
    pub context: Option<RunContext>,

    /// Input guardrails applied in addition to the starting agent's own,
    /// checked after them.
    pub input_guardrails: Vec<InputGuardrail>,

    /// Output guardrails applied in addition to the final agent's own,
    /// checked after them.
    pub output_guardrails: Vec<OutputGuardrail>,

    /// Optional deadline applied to each generation call. When the
    /// deadline elapses the run fails with a timeout generation error.
    pub generation_timeout: Option<Duration>,
}

impl RunConfig {
    /// Create a default run configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the turn budget.
    #[must_use]
    pub const fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Set lifecycle hooks for the run.
    #[must_use]
    pub fn hooks(mut self, hooks: SharedRunHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Seed the run context.
    #[must_use]
    pub fn context(mut self, context: RunContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a run-level input guardrail.
    #[must_use]
    pub fn input_guardrail(mut self, guardrail: InputGuardrail) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Add a run-level output guardrail.
    #[must_use]
    pub fn output_guardrail(mut self, guardrail: OutputGuardrail) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Set a per-call generation deadline.
    #[must_use]
    pub const fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("max_turns", &self.max_turns)
            .field("hooks", &self.hooks.is_some())
            .field("context", &self.context.is_some())
            .field("input_guardrails", &self.input_guardrails.len())
            .field("output_guardrails", &self.output_guardrails.len())
            .field("generation_timeout", &self.generation_timeout)
            .finish()
    }
}

/// One recorded event from a run, in occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunItem {
    /// The model requested a tool invocation.
    ToolCall {
        /// Agent that was active when the call was made.
        agent_name: String,
        /// Name of the tool called.
        tool_name: String,
        /// Arguments the model supplied.
        args: Value,
        /// Whether the called tool is marked for display in the chat
        /// thread. `false` for calls naming an unknown tool.
        show_in_thread: bool,
    },

    /// A tool invocation completed.
    ToolOutput {
        /// Agent that was active when the call was made.
        agent_name: String,
        /// Name of the tool called.
        tool_name: String,
        /// The payload fed back to the model: the tool's output, or an
        /// error shape when execution failed.
        output: Value,
        /// Whether the called tool is marked for display in the chat
        /// thread.
        show_in_thread: bool,
    },

    /// Control transferred to another agent.
    Handoff {
        /// Agent that initiated the transfer.
        from_agent: String,
        /// Agent that received control.
        agent_name: String,
        /// The model's stated reason for the transfer.
        reason: String,
    },
}

impl RunItem {
    /// Returns `true` if this item records a handoff.
    #[must_use]
    pub const fn is_handoff(&self) -> bool {
        matches!(self, Self::Handoff { .. })
    }

    /// Returns `true` if this item should be surfaced in the chat thread.
    ///
    /// Only tool calls and outputs whose tool is marked `show_in_thread`
    /// qualify.
    #[must_use]
    pub const fn shown_in_thread(&self) -> bool {
        matches!(
            self,
            Self::ToolCall {
                show_in_thread: true,
                ..
            } | Self::ToolOutput {
                show_in_thread: true,
                ..
            }
        )
    }
}

/// The result of a completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The final text output that terminated the loop.
    pub final_output: String,

    /// Messages produced during the run: the model's turns and the
    /// function responses fed back to it. Excludes the caller's input
    /// and any injected messages.
    pub new_messages: Vec<Message>,

    /// Everything that happened, in order.
    pub items: Vec<RunItem>,

    /// Name of the agent that produced the final output.
    pub last_agent: String,

    /// Number of turns consumed.
    pub turns: usize,

    /// Final state of the run context: turn counter, last active agent,
    /// and whatever state hooks and checks accumulated.
    pub context: RunContext,
}

impl RunResult {
    /// The final text output.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.final_output
    }

    /// Handoff items, in order of occurrence.
    pub fn handoffs(&self) -> impl Iterator<Item = &RunItem> {
        self.items.iter().filter(|i| i.is_handoff())
    }

    /// Items flagged for display in the chat thread, in order.
    pub fn thread_items(&self) -> impl Iterator<Item = &RunItem> {
        self.items.iter().filter(|i| i.shown_in_thread())
    }
}
