//! Agent configuration types.
//!
//! An [`Agent`] is a pure description: identity, instructions, model
//! settings, tool catalog, handoff targets, and guardrails. It contains
//! no execution logic; the [`Runner`](super::Runner) decides how it runs.
//!
//! Agents are immutable once built and shared as `Arc<Agent>` so that
//! several handoffs can point at the same target.
//!
//! # Example
//!
//! ```rust,ignore
//! use colloquy::prelude::*;
//!
//! let analyst = Agent::new("analyst")
//!     .instructions("You answer questions about dashboard data.")
//!     .settings(ModelSettings::new().model("gemini-2.0-flash"))
//!     .tool(lookup_metric_tool())
//!     .shared();
//!
//! let triage = Agent::new("triage")
//!     .instructions("Route the user to the right specialist.")
//!     .handoff(Handoff::to(analyst.clone()));
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ModelSettings;
use crate::context::RunContext;
use crate::guardrail::{InputGuardrail, OutputGuardrail};
use crate::handoff::Handoff;
use crate::message::Message;
use crate::tool::{SharedTool, ToolDefinition};

/// Source of an agent's system instruction, resolved per turn.
///
/// The async form exists so instructions can embed live data, such as
/// the current user's identity or a dashboard description fetched at
/// run time.
#[async_trait]
pub trait InstructionsProvider: Send + Sync {
    /// Produce the system instruction for the given run context.
    async fn instructions(&self, context: &RunContext) -> String;
}

#[async_trait]
impl<F> InstructionsProvider for F
where
    F: Fn(&RunContext) -> String + Send + Sync,
{
    async fn instructions(&self, context: &RunContext) -> String {
        self(context)
    }
}

/// Instructions that guide the agent's behavior.
///
/// Either a static string set at construction time, or a provider that
/// generates the system instruction from the run context on each turn.
#[derive(Clone)]
pub enum Instructions {
    /// Static instruction string.
    Static(String),
    /// Dynamic instruction generator, resolved per turn.
    Dynamic(Arc<dyn InstructionsProvider>),
}

impl Instructions {
    /// Resolve the instructions for the given run context.
    pub async fn resolve(&self, context: &RunContext) -> String {
        match self {
            Self::Static(s) => s.clone(),
            Self::Dynamic(p) => p.instructions(context).await,
        }
    }
}

impl fmt::Debug for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => f.debug_tuple("Static").field(s).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<closure>").finish(),
        }
    }
}

impl<S: Into<String>> From<S> for Instructions {
    fn from(s: S) -> Self {
        Self::Static(s.into())
    }
}

/// A pure configuration struct defining an agent.
///
/// # Fields
///
/// - **`name`** — unique identifier used in logging, handoff resolution,
///   and run items
/// - **`instructions`** — system instruction, static or dynamic
/// - **`settings`** — model parameters for generation calls
/// - **`tools`** — capabilities the agent can invoke
/// - **`handoffs`** — agents this one can transfer control to
/// - **`input_guardrails`** / **`output_guardrails`** — safety checks
///   bracketing the run
/// - **`response_schema`** — optional structured-output schema
pub struct Agent {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) instructions: Instructions,
    pub(crate) settings: ModelSettings,
    pub(crate) tools: Vec<SharedTool>,
    pub(crate) handoffs: Vec<Handoff>,
    pub(crate) input_guardrails: Vec<InputGuardrail>,
    pub(crate) output_guardrails: Vec<OutputGuardrail>,
    pub(crate) inject_messages: Vec<Message>,
    pub(crate) response_schema: Option<Value>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("instructions", &self.instructions)
            .field("settings", &self.settings)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name().to_string()).collect::<Vec<_>>(),
            )
            .field(
                "handoffs",
                &self.handoffs.iter().map(Handoff::name).collect::<Vec<_>>(),
            )
            .field("input_guardrails", &self.input_guardrails)
            .field("output_guardrails", &self.output_guardrails)
            .field("inject_messages", &self.inject_messages.len())
            .field("response_schema", &self.response_schema.is_some())
            .finish()
    }
}

impl Agent {
    /// System instruction used when none is configured.
    pub const DEFAULT_INSTRUCTIONS: &'static str = "You are a helpful AI assistant.";

    /// Create a new agent with the given name and sensible defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Agent: {name}"),
            name,
            instructions: Instructions::Static(String::new()),
            settings: ModelSettings::default(),
            tools: Vec::new(),
            handoffs: Vec::new(),
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            inject_messages: Vec::new(),
            response_schema: None,
        }
    }

    /// Set the system instructions (static string).
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Instructions::Static(instructions.into());
        self
    }

    /// Set dynamic instructions resolved from the run context at each
    /// activation.
    #[must_use]
    pub fn dynamic_instructions(mut self, provider: impl InstructionsProvider + 'static) -> Self {
        self.instructions = Instructions::Dynamic(Arc::new(provider));
        self
    }

    /// Set the agent description.
    ///
    /// Used as the default description of this agent's handoff tool when
    /// another agent can transfer to it.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the model settings for generation calls.
    #[must_use]
    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add a tool to this agent.
    #[must_use]
    pub fn tool(mut self, tool: SharedTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set all tools for this agent.
    #[must_use]
    pub fn tools(mut self, tools: Vec<SharedTool>) -> Self {
        self.tools = tools;
        self
    }

    /// Add a handoff target.
    #[must_use]
    pub fn handoff(mut self, handoff: Handoff) -> Self {
        self.handoffs.push(handoff);
        self
    }

    /// Set all handoff targets.
    #[must_use]
    pub fn handoffs(mut self, handoffs: Vec<Handoff>) -> Self {
        self.handoffs = handoffs;
        self
    }

    /// Add an input guardrail.
    ///
    /// Input guardrails run once before the first generation call, for
    /// the starting agent of a run only.
    #[must_use]
    pub fn input_guardrail(mut self, guardrail: InputGuardrail) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Add an output guardrail.
    ///
    /// Output guardrails run once against the final output, belonging to
    /// whichever agent produced it.
    #[must_use]
    pub fn output_guardrail(mut self, guardrail: OutputGuardrail) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Prepend a message to every generation request made by this agent.
    ///
    /// Injected messages are sent to the model ahead of the conversation
    /// history but never appear in the recorded output of a run.
    #[must_use]
    pub fn inject_message(mut self, message: Message) -> Self {
        self.inject_messages.push(message);
        self
    }

    /// Set all injected messages for this agent.
    #[must_use]
    pub fn inject_messages(mut self, messages: Vec<Message>) -> Self {
        self.inject_messages = messages;
        self
    }

    /// Set a structured-output schema forwarded on generation requests.
    #[must_use]
    pub fn response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Wrap this agent in an `Arc` so it can serve as a handoff target.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the agent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent's description.
    #[must_use]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Returns the agent's model settings.
    #[must_use]
    pub const fn get_settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Returns the number of tools registered on this agent.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Resolve the system instructions for the given run context.
    ///
    /// Falls back to [`Self::DEFAULT_INSTRUCTIONS`] when no instructions
    /// were configured.
    pub async fn resolve_instructions(&self, context: &RunContext) -> String {
        let instructions = self.instructions.resolve(context).await;
        if instructions.is_empty() {
            Self::DEFAULT_INSTRUCTIONS.to_string()
        } else {
            instructions
        }
    }

    /// Find a tool by name.
    #[must_use]
    pub fn find_tool(&self, name: &str) -> Option<&SharedTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Find a handoff by its synthetic tool name.
    #[must_use]
    pub fn find_handoff(&self, tool_name: &str) -> Option<&Handoff> {
        self.handoffs.iter().find(|h| h.name() == tool_name)
    }

    /// Definitions of this agent's own tools, excluding handoff tools.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }
}
