//! Safety checks for run inputs and final outputs.
//!
//! Guardrails are validation checks bracketing a run:
//!
//! - **[`InputGuardrail`]** — validates the effective input once, before
//!   the first generation call (off-topic detection, content filtering).
//! - **[`OutputGuardrail`]** — validates the final text output after the
//!   turn loop completes (PII detection, policy compliance).
//!
//! # Tripwire Mechanism
//!
//! Each check returns a [`GuardrailVerdict`]. When any verdict trips, the
//! run halts with [`Error::GuardrailTriggered`](crate::Error) carrying the
//! guardrail's name, stage, message, and diagnostic info. Guardrails
//! never see mid-run tool traffic; they bracket the run, input once at the
//! start and output once at the end.
//!
//! Within a pipeline all checks run concurrently, but verdicts are
//! examined in registration order, so the first registered guardrail that
//! tripped is the one reported. A check that itself fails (returns `Err`)
//! does not veto the run; the failure is logged and treated as a pass.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use colloquy::prelude::*;
//!
//! struct TopicFilter;
//!
//! #[async_trait::async_trait]
//! impl InputGuardrailCheck for TopicFilter {
//!     async fn check(
//!         &self,
//!         _context: &RunContext,
//!         _agent_name: &str,
//!         input: &[Message],
//!     ) -> Result<GuardrailVerdict> {
//!         let text: String = input.iter().map(Message::text).collect();
//!         if text.contains("forbidden") {
//!             Ok(GuardrailVerdict::trip("Off-topic request"))
//!         } else {
//!             Ok(GuardrailVerdict::pass())
//!         }
//!     }
//! }
//!
//! let agent = Agent::new("support")
//!     .instructions("You are a helpful assistant.")
//!     .input_guardrail(InputGuardrail::new("topic-filter", TopicFilter));
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RunContext;
use crate::error::Result;
use crate::message::Message;

/// The verdict of a guardrail check.
///
/// When `tripped` is `true` the run is halted and the verdict's message
/// and info surface in the resulting error.
#[derive(Debug, Clone)]
pub struct GuardrailVerdict {
    /// Whether the tripwire was triggered.
    pub tripped: bool,

    /// Optional human-readable explanation, surfaced in the error.
    pub message: Option<String>,

    /// Structured diagnostic payload (detected issues, scores).
    pub info: Value,
}

impl GuardrailVerdict {
    /// Create a passing verdict.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            tripped: false,
            message: None,
            info: Value::Null,
        }
    }

    /// Create a tripping verdict with an explanation.
    #[must_use]
    pub fn trip(message: impl Into<String>) -> Self {
        Self {
            tripped: true,
            message: Some(message.into()),
            info: Value::Null,
        }
    }

    /// Attach a structured diagnostic payload to this verdict.
    #[must_use]
    pub fn with_info(mut self, info: impl Into<Value>) -> Self {
        self.info = info.into();
        self
    }

    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_tripped(&self) -> bool {
        self.tripped
    }
}

/// Trait for input guardrail check logic.
///
/// The check receives the run context, the active agent's name, and the
/// effective input for the run (history plus the new user message, after
/// any injected messages).
#[async_trait]
pub trait InputGuardrailCheck: Send + Sync {
    /// Check the run input and return a verdict.
    ///
    /// # Errors
    ///
    /// A check failure does not veto the run; the runner logs it and
    /// treats the check as passing.
    async fn check(
        &self,
        context: &RunContext,
        agent_name: &str,
        input: &[Message],
    ) -> Result<GuardrailVerdict>;
}

#[async_trait]
impl<F> InputGuardrailCheck for F
where
    F: Fn(&RunContext, &str, &[Message]) -> Result<GuardrailVerdict> + Send + Sync,
{
    async fn check(
        &self,
        context: &RunContext,
        agent_name: &str,
        input: &[Message],
    ) -> Result<GuardrailVerdict> {
        self(context, agent_name, input)
    }
}

/// A named input guardrail, run once before the first generation call.
///
/// Input guardrails are configured on an [`Agent`](crate::Agent) and run
/// by the [`Runner`](crate::Runner) against the starting agent only; a
/// handoff mid-run does not re-trigger input guardrails.
#[derive(Clone)]
pub struct InputGuardrail {
    name: String,
    check: Arc<dyn InputGuardrailCheck>,
}

impl InputGuardrail {
    /// Create a new input guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl InputGuardrailCheck + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the name of this guardrail.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute this guardrail check.
    ///
    /// # Errors
    ///
    /// Propagates the check's own failure, distinct from a tripped
    /// verdict.
    pub async fn run(
        &self,
        context: &RunContext,
        agent_name: &str,
        input: &[Message],
    ) -> Result<GuardrailVerdict> {
        self.check.check(context, agent_name, input).await
    }
}

impl std::fmt::Debug for InputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Trait for output guardrail check logic.
///
/// The check receives the run context, the name of the agent that
/// produced the output, and the final text output of the run.
#[async_trait]
pub trait OutputGuardrailCheck: Send + Sync {
    /// Check the final output and return a verdict.
    ///
    /// # Errors
    ///
    /// A check failure does not veto the run; the runner logs it and
    /// treats the check as passing.
    async fn check(
        &self,
        context: &RunContext,
        agent_name: &str,
        output: &str,
    ) -> Result<GuardrailVerdict>;
}

#[async_trait]
impl<F> OutputGuardrailCheck for F
where
    F: Fn(&RunContext, &str, &str) -> Result<GuardrailVerdict> + Send + Sync,
{
    async fn check(
        &self,
        context: &RunContext,
        agent_name: &str,
        output: &str,
    ) -> Result<GuardrailVerdict> {
        self(context, agent_name, output)
    }
}

/// A named output guardrail, run once against the final output.
///
/// Output guardrails belong to the agent that produced the final output,
/// which after a handoff is the target agent, not the starting one. If
/// any tripwire triggers, the output is withheld and the run errors.
#[derive(Clone)]
pub struct OutputGuardrail {
    name: String,
    check: Arc<dyn OutputGuardrailCheck>,
}

impl OutputGuardrail {
    /// Create a new output guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl OutputGuardrailCheck + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the name of this guardrail.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute this guardrail check.
    ///
    /// # Errors
    ///
    /// Propagates the check's own failure, distinct from a tripped
    /// verdict.
    pub async fn run(
        &self,
        context: &RunContext,
        agent_name: &str,
        output: &str,
    ) -> Result<GuardrailVerdict> {
        self.check.check(context, agent_name, output).await
    }
}

impl std::fmt::Debug for OutputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
