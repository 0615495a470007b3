//! Tool trait and definitions for agent capabilities.
//!
//! A tool is a named capability with a declared parameter schema and an
//! async action. Tools are read-only descriptors during a run and are
//! shared as `Arc<dyn Tool>`; the runner looks them up by name in the
//! active agent's catalog and absorbs execution failures into error
//! payloads so the run can continue.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// A type alias for `Result<T, ToolError>`.
pub type ToolResult<T> = Result<T, ToolError>;

/// Definition of a tool as exposed to the model.
///
/// `parameters` is a JSON-schema-like object: typed properties, a
/// `required` list, optional enum constraints. The runtime does not
/// enforce the schema; it is advisory for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool (snake_case, unique per agent).
    pub name: String,

    /// Description of what the tool does, used by the model to decide
    /// when to call it.
    pub description: String,

    /// JSON schema for the tool's parameters.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Returns the tool name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The core trait for capabilities an agent can invoke.
///
/// `execute` may perform network I/O. It should report failures through
/// [`ToolError`] rather than panicking; the runner converts any error
/// into a `{"error": true, "message": ...}` payload fed back to the
/// model on the next turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name of the tool, unique within an agent.
    fn name(&self) -> &str;

    /// Description of what the tool does.
    fn description(&self) -> String;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Whether invocations of this tool should be surfaced to the end
    /// user in the chat thread.
    fn show_in_thread(&self) -> bool {
        false
    }

    /// Execute the tool with the given JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when execution fails; the runner feeds it
    /// back to the model as an error payload.
    async fn execute(&self, args: Value) -> ToolResult<Value>;

    /// Build the definition exposed to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }
}

/// A shared, thread-safe tool for use in agent catalogs.
pub type SharedTool = Arc<dyn Tool>;

type ToolHandler =
    dyn Fn(Value) -> Pin<Box<dyn Future<Output = ToolResult<Value>> + Send>> + Send + Sync;

/// A closure-backed [`Tool`] implementation.
///
/// The ergonomic way to define one-off tools without a dedicated struct:
///
/// ```rust,ignore
/// let tool = FunctionTool::new(
///     "get_current_time",
///     "Returns the current time.",
///     json!({"type": "object", "properties": {}}),
///     |_args| async move { Ok(json!({"time": "2024-01-01T00:00:00Z"})) },
/// );
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
    show_in_thread: bool,
    handler: Box<ToolHandler>,
}

impl FunctionTool {
    /// Create a new function tool from an async closure.
    #[must_use]
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            show_in_thread: false,
            handler: Box::new(move |args| Box::pin(handler(args))),
        }
    }

    /// Mark invocations of this tool as user-visible in the chat thread.
    #[must_use]
    pub const fn show_in_thread(mut self, show: bool) -> Self {
        self.show_in_thread = show;
        self
    }

    /// Wrap this tool in an `Arc` for use in an agent catalog.
    #[must_use]
    pub fn shared(self) -> SharedTool {
        Arc::new(self)
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    fn show_in_thread(&self) -> bool {
        self.show_in_thread
    }

    async fn execute(&self, args: Value) -> ToolResult<Value> {
        (self.handler)(args).await
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("show_in_thread", &self.show_in_thread)
            .finish_non_exhaustive()
    }
}
