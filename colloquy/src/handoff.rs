//! Handoffs — transferring control between agents mid-run.
//!
//! A [`Handoff`] wraps a target [`Agent`](crate::Agent) and is exposed to
//! the model as a synthetic tool named `transfer_to_<agent>`. When the
//! model calls it, the [`Runner`](crate::Runner) swaps the active agent
//! and continues the same run: same conversation, same turn budget, with
//! the target's instructions and tool catalog from the next turn on.
//!
//! A handoff can carry a filter that decides per-turn whether the
//! transfer is offered at all. Filters are evaluated while the tool
//! catalog is assembled, so a filtered-out handoff is invisible to the
//! model rather than rejected after the fact.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::agent::Agent;
use crate::context::RunContext;
use crate::error::Result;
use crate::tool::ToolDefinition;

/// Name prefix shared by all synthetic handoff tools.
pub const HANDOFF_PREFIX: &str = "transfer_to_";

/// Returns `true` if a tool call name denotes a handoff.
#[must_use]
pub fn is_handoff_call(tool_name: &str) -> bool {
    tool_name.starts_with(HANDOFF_PREFIX)
}

/// Derive the default handoff tool name for an agent name.
///
/// Lowercases the name and maps runs of non-alphanumeric characters to a
/// single underscore, so `"Billing Desk"` becomes `transfer_to_billing_desk`.
#[must_use]
pub fn default_handoff_tool_name(agent_name: &str) -> String {
    let mut slug = String::with_capacity(agent_name.len());
    let mut last_was_sep = false;
    for c in agent_name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !slug.is_empty() {
            slug.push('_');
            last_was_sep = true;
        }
    }
    if slug.ends_with('_') {
        slug.pop();
    }
    format!("{HANDOFF_PREFIX}{slug}")
}

/// Per-turn predicate deciding whether a handoff is offered to the model.
#[async_trait]
pub trait HandoffFilter: Send + Sync {
    /// Return `true` to offer this handoff on the current turn.
    ///
    /// # Errors
    ///
    /// A filter failure does not block the transfer; the runner logs it
    /// and keeps the handoff offered.
    async fn allow(&self, context: &RunContext) -> Result<bool>;
}

#[async_trait]
impl<F> HandoffFilter for F
where
    F: Fn(&RunContext) -> Result<bool> + Send + Sync,
{
    async fn allow(&self, context: &RunContext) -> Result<bool> {
        self(context)
    }
}

/// A transfer of control to another agent, offered to the model as a tool.
#[derive(Clone)]
pub struct Handoff {
    target: Arc<Agent>,
    tool_name: String,
    description: String,
    filter: Option<Arc<dyn HandoffFilter>>,
}

impl Handoff {
    /// Create a handoff to the given agent.
    ///
    /// The tool name defaults to `transfer_to_<agent>` and the description
    /// defaults to the target agent's description.
    #[must_use]
    pub fn to(target: Arc<Agent>) -> Self {
        Self {
            tool_name: default_handoff_tool_name(target.name()),
            description: format!(
                "Transfer the conversation to the '{}' agent. {}",
                target.name(),
                target.get_description()
            ),
            target,
            filter: None,
        }
    }

    /// Override the synthetic tool name.
    ///
    /// The name must keep the `transfer_to_` prefix; the runner recognizes
    /// handoff calls by it.
    #[must_use]
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    /// Override the tool description shown to the model.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a per-turn filter deciding whether this handoff is offered.
    #[must_use]
    pub fn filter(mut self, filter: impl HandoffFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// The target agent.
    #[must_use]
    pub fn target(&self) -> &Arc<Agent> {
        &self.target
    }

    /// Name of the target agent.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        self.target.name()
    }

    /// Name of the synthetic tool exposed to the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.tool_name
    }

    /// Whether this handoff is offered on the current turn.
    ///
    /// A filter that fails is treated as allowing the handoff; the
    /// failure is logged and the model keeps the option.
    pub async fn is_enabled(&self, context: &RunContext) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => match filter.allow(context).await {
                Ok(allowed) => allowed,
                Err(err) => {
                    warn!(
                        handoff = %self.tool_name,
                        error = %err,
                        "handoff filter failed, offering handoff anyway"
                    );
                    true
                }
            },
        }
    }

    /// Build the synthetic tool definition exposed to the model.
    ///
    /// Every handoff tool takes a single required `reason` string so the
    /// transfer motive is recorded in the run items.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            &self.tool_name,
            &self.description,
            json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Why the conversation is being transferred."
                    }
                },
                "required": ["reason"],
                "additionalProperties": false
            }),
        )
    }
}

impl fmt::Debug for Handoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handoff")
            .field("tool_name", &self.tool_name)
            .field("agent_name", &self.target.name())
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}
