//! Content generation client contract.
//!
//! The runtime treats text generation as an opaque async remote call:
//! a [`GenerationRequest`] (conversation, system instruction, tool catalog,
//! model settings) goes in, a list of [`ResponsePart`]s comes out. Any
//! rejection is fatal to the run and surfaced as
//! [`Error::Generation`](crate::Error::Generation) — the core never retries.
//!
//! [`MockClient`] provides a scripted implementation for tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// Model parameters for a generation call.
///
/// All fields are optional; the backing service applies its own defaults
/// for anything left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl ModelSettings {
    /// Create empty settings (service defaults apply).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the nucleus sampling parameter.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the maximum output token count.
    #[must_use]
    pub const fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// A content generation request assembled by the runner for one turn.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// The outbound conversation: injected messages, history, and
    /// reconstructed function call/response pairs.
    pub contents: Vec<Message>,

    /// System instruction for this turn's agent.
    pub system_instruction: Option<String>,

    /// Model parameters from the agent's settings.
    pub settings: ModelSettings,

    /// Tool catalog exposed to the model: the agent's own tools plus
    /// synthetic handoff tools.
    pub tools: Vec<ToolDefinition>,

    /// Optional structured-output schema.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// Create a request with the given conversation contents.
    #[must_use]
    pub fn new(contents: Vec<Message>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the model settings.
    #[must_use]
    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the tool catalog.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the structured-output schema.
    #[must_use]
    pub fn response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Names of the tools offered in this request.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// One fragment of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePart {
    /// A text fragment.
    Text {
        /// The text content.
        text: String,
    },
    /// A requested tool invocation.
    FunctionCall {
        /// Name of the tool to invoke.
        name: String,
        /// Arguments as a JSON object.
        args: Value,
    },
}

impl ResponsePart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a function call part.
    #[must_use]
    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Self::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Get the text content if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::FunctionCall { .. } => None,
        }
    }

    /// Get `(name, args)` if this is a function call part.
    #[must_use]
    pub fn as_function_call(&self) -> Option<(&str, &Value)> {
        match self {
            Self::FunctionCall { name, args } => Some((name, args)),
            Self::Text { .. } => None,
        }
    }
}

/// Trait for content generation backends.
///
/// Implementations wrap whatever text-generation service the host product
/// uses. The runner holds the client as `Arc<dyn GenerationClient>` and
/// issues one `generate` call per turn.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a model response for the given request.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] on any failure; the runner surfaces
    /// it as a fatal run error without retrying.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<ResponsePart>, GenerationError>;
}

/// Type alias for an Arc-wrapped generation client.
pub type SharedGenerationClient = Arc<dyn GenerationClient>;

/// A scripted generation client for testing.
///
/// Replies with the queued responses in order and records every request
/// it receives, so tests can assert on outbound contents and tool
/// catalogs. Running past the script returns an internal error.
#[derive(Debug, Default)]
pub struct MockClient {
    script: Mutex<Vec<Vec<ResponsePart>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl MockClient {
    /// Create an empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain-text reply.
    #[must_use]
    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.reply_parts(vec![ResponsePart::text(text)])
    }

    /// Queue a single function call reply.
    #[must_use]
    pub fn reply_call(self, name: impl Into<String>, args: Value) -> Self {
        self.reply_parts(vec![ResponsePart::function_call(name, args)])
    }

    /// Queue an arbitrary reply.
    #[must_use]
    pub fn reply_parts(self, parts: Vec<ResponsePart>) -> Self {
        {
            let mut script = self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            script.push(parts);
        }
        self
    }

    /// Number of `generate` calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<ResponsePart>, GenerationError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request.clone());

        let script = self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        script
            .get(index)
            .cloned()
            .ok_or_else(|| GenerationError::internal(format!("Mock script exhausted at call {index}")))
    }
}

/// A client that always fails, for exercising fatal generation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingClient;

#[async_trait]
impl GenerationClient for FailingClient {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<ResponsePart>, GenerationError> {
        Err(GenerationError::network("generation backend unavailable"))
    }
}
