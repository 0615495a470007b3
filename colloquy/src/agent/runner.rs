//! Runner — the turn-loop execution engine.
//!
//! The [`Runner`] drives an [`Agent`] through the orchestration loop:
//!
//! 1. Assemble the tool catalog (own tools + enabled handoff tools)
//! 2. Call the generation client with the working conversation
//! 3. Classify the response: handoff, tool calls, or final output
//! 4. Execute tool calls and feed their results back, or swap the
//!    active agent on a handoff
//! 5. Loop until a final output or the turn budget runs out
//!
//! Input guardrails run once before the first generation call; output
//! guardrails run once against the final output. Tool failures are
//! recoverable (converted to error payloads the model sees next turn);
//! generation failures, guardrail trips, unresolvable handoffs, and an
//! exhausted turn budget are fatal.
//!
//! The runner never mutates the caller's history. It works on its own
//! copy and reports everything it produced in [`RunResult`].

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::client::{GenerationRequest, ResponsePart, SharedGenerationClient};
use crate::context::RunContext;
use crate::error::{Error, GenerationError, GuardrailStage, Result};
use crate::guardrail::{InputGuardrail, OutputGuardrail};
use crate::handoff::is_handoff_call;
use crate::hooks::{NoopRunHooks, RunHooks, SharedRunHooks};
use crate::message::{Message, Part, Role};
use crate::tool::ToolDefinition;

use super::config::Agent;
use super::result::{RunConfig, RunItem, RunResult};

/// What the model asked for on one turn, after classification.
enum TurnStep {
    /// Plain text, no function calls. The run is complete.
    FinalOutput(String),
    /// Regular tool calls to execute before the next turn.
    ToolCalls(Vec<ToolCallRequest>),
    /// A transfer of control. Wins over any tool calls bundled into the
    /// same response; those are dropped unexecuted.
    Handoff {
        /// Synthetic tool name the model called.
        tool_name: String,
        /// The model's stated reason for the transfer.
        reason: String,
    },
}

/// One tool call extracted from a model response.
#[derive(Debug, Clone)]
struct ToolCallRequest {
    name: String,
    args: Value,
}

/// Outcome of executing (or failing to resolve) one tool call.
struct ToolCallOutcome {
    name: String,
    payload: Value,
    show_in_thread: bool,
}

/// Mutable state accumulated over one run.
struct RunState {
    current: Arc<Agent>,
    context: RunContext,
    working: Vec<Message>,
    new_messages: Vec<Message>,
    items: Vec<RunItem>,
}

impl RunState {
    /// Append a message to both the working conversation and the run's
    /// recorded output.
    fn push_message(&mut self, message: Message) {
        self.working.push(message.clone());
        self.new_messages.push(message);
    }
}

/// The execution engine driving agents through the turn loop.
///
/// A `Runner` owns a generation client and nothing else; all per-run
/// state is local to each [`run`](Runner::run) call, so one runner can
/// serve concurrent runs.
#[derive(Clone)]
pub struct Runner {
    client: SharedGenerationClient,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").finish_non_exhaustive()
    }
}

impl Runner {
    /// Default turn budget when [`RunConfig::max_turns`] is unset.
    pub const DEFAULT_MAX_TURNS: usize = 10;

    /// Create a runner backed by the given generation client.
    #[must_use]
    pub fn new(client: SharedGenerationClient) -> Self {
        Self { client }
    }

    /// Execute a run to completion.
    ///
    /// # Arguments
    ///
    /// * `agent` — the starting agent
    /// * `input` — the user's new message text
    /// * `history` — prior conversation, cloned and never mutated
    /// * `config` — run-level configuration (budget, hooks, context
    ///   seed, extra guardrails, generation deadline)
    ///
    /// # Errors
    ///
    /// Returns [`Error::GuardrailTriggered`] when a guardrail vetoes the
    /// run, [`Error::MaxTurnsExceeded`] when the budget runs out,
    /// [`Error::HandoffResolution`] when the model requests an unknown
    /// transfer, or [`Error::Generation`] when the client fails.
    pub async fn run(
        &self,
        agent: Arc<Agent>,
        input: impl Into<String>,
        history: &[Message],
        config: RunConfig,
    ) -> Result<RunResult> {
        let input = input.into();
        let max_turns = config.max_turns.unwrap_or(Self::DEFAULT_MAX_TURNS);
        let span = info_span!(
            "run",
            agent.name = %agent.name(),
            run.max_turns = max_turns,
            run.turns = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        self.run_inner(agent, input, history, config, max_turns)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        agent: Arc<Agent>,
        input: String,
        history: &[Message],
        config: RunConfig,
        max_turns: usize,
    ) -> Result<RunResult> {
        let hooks: SharedRunHooks = config
            .hooks
            .clone()
            .unwrap_or_else(|| Arc::new(NoopRunHooks) as SharedRunHooks);

        let mut working = history.to_vec();
        working.push(Message::user(&input));

        let mut context = config.context.clone().unwrap_or_default();
        context.set_agent_name(agent.name());

        let mut state = RunState {
            context,
            working,
            new_messages: Vec::new(),
            items: Vec::new(),
            current: agent,
        };

        // Input guardrails run before any generation call: the starting
        // agent's own first, then the run-level additions.
        let input_guardrails: Vec<&InputGuardrail> = state
            .current
            .input_guardrails
            .iter()
            .chain(config.input_guardrails.iter())
            .collect();
        Self::run_input_guardrails(
            &input_guardrails,
            &state.context,
            state.current.name(),
            &state.working,
        )
        .await?;

        hooks
            .on_agent_start(&state.context, state.current.name())
            .await;

        for turn in 1..=max_turns {
            state.context.advance_turn();
            debug!(agent = %state.current.name(), turn, "Starting turn");

            let request = self.build_request(&state).await;
            let parts = self.generate(&request, &config).await.map_err(|e| {
                error!(error = %e, agent = %state.current.name(), turn, "Generation failed");
                tracing::Span::current().record("error", tracing::field::display(&e));
                e
            })?;

            match Self::classify_response(&parts) {
                TurnStep::FinalOutput(output) => {
                    state.push_message(response_message(&parts));

                    // Output guardrails belong to whichever agent produced
                    // the final output, plus the run-level additions.
                    let output_guardrails: Vec<&OutputGuardrail> = state
                        .current
                        .output_guardrails
                        .iter()
                        .chain(config.output_guardrails.iter())
                        .collect();
                    Self::run_output_guardrails(
                        &output_guardrails,
                        &state.context,
                        state.current.name(),
                        &output,
                    )
                    .await?;

                    hooks
                        .on_agent_end(&state.context, state.current.name(), &output)
                        .await;

                    tracing::Span::current().record("run.turns", turn);
                    info!(
                        agent = %state.current.name(),
                        turns = turn,
                        "Run completed",
                    );

                    return Ok(RunResult {
                        final_output: output,
                        new_messages: state.new_messages,
                        items: state.items,
                        last_agent: state.current.name().to_string(),
                        turns: turn,
                        context: state.context,
                    });
                }

                TurnStep::Handoff { tool_name, reason } => {
                    let Some(handoff) = state.current.find_handoff(&tool_name) else {
                        let err = Error::handoff_resolution(format!(
                            "agent '{}' has no handoff matching tool '{tool_name}'",
                            state.current.name()
                        ));
                        error!(error = %err, "Handoff resolution failed");
                        tracing::Span::current().record("error", tracing::field::display(&err));
                        return Err(err);
                    };
                    let target = Arc::clone(handoff.target());
                    let from = state.current.name().to_string();

                    info!(
                        from_agent = %from,
                        to_agent = %target.name(),
                        reason = %reason,
                        "Handing off",
                    );

                    state.push_message(response_message(&parts));
                    state.push_message(Message::function_response(
                        &tool_name,
                        json!({"status": "transferred", "agent": target.name()}),
                    ));
                    state.items.push(RunItem::Handoff {
                        from_agent: from.clone(),
                        agent_name: target.name().to_string(),
                        reason,
                    });

                    hooks
                        .on_handoff(&state.context, &from, target.name())
                        .await;

                    state.current = target;
                    state.context.set_agent_name(state.current.name());
                    hooks
                        .on_agent_start(&state.context, state.current.name())
                        .await;
                }

                TurnStep::ToolCalls(calls) => {
                    state.push_message(response_message(&parts));
                    for call in &calls {
                        state.items.push(RunItem::ToolCall {
                            agent_name: state.current.name().to_string(),
                            tool_name: call.name.clone(),
                            args: call.args.clone(),
                            show_in_thread: state
                                .current
                                .find_tool(&call.name)
                                .is_some_and(|t| t.show_in_thread()),
                        });
                    }

                    let outcomes =
                        Self::execute_tool_calls(&calls, &state.current, &state.context, &hooks)
                            .await;

                    for outcome in outcomes {
                        state.items.push(RunItem::ToolOutput {
                            agent_name: state.current.name().to_string(),
                            tool_name: outcome.name.clone(),
                            output: outcome.payload.clone(),
                            show_in_thread: outcome.show_in_thread,
                        });
                        state.push_message(Message::function_response(
                            &outcome.name,
                            outcome.payload,
                        ));
                    }
                }
            }
        }

        let err = Error::max_turns(max_turns);
        error!(error = %err, agent = %state.current.name(), max_turns, "Turn budget exhausted");
        tracing::Span::current().record("error", tracing::field::display(&err));
        Err(err)
    }

    /// Build the generation request for the current turn.
    ///
    /// The active agent's injected messages go first, then the working
    /// conversation. The tool catalog is reassembled each turn because
    /// handoff filters can change which transfers are offered.
    async fn build_request(&self, state: &RunState) -> GenerationRequest {
        let agent = &state.current;
        let mut contents = Vec::with_capacity(agent.inject_messages.len() + state.working.len());
        contents.extend(agent.inject_messages.iter().cloned());
        contents.extend(state.working.iter().cloned());

        let mut request = GenerationRequest::new(contents)
            .settings(agent.settings.clone())
            .tools(Self::assemble_catalog(agent, &state.context).await)
            .system_instruction(agent.resolve_instructions(&state.context).await);

        if let Some(schema) = &agent.response_schema {
            request = request.response_schema(schema.clone());
        }
        request
    }

    /// Issue the generation call, applying the configured deadline.
    async fn generate(
        &self,
        request: &GenerationRequest,
        config: &RunConfig,
    ) -> Result<Vec<ResponsePart>> {
        let response = match config.generation_timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.client.generate(request)).await {
                    Ok(res) => res,
                    Err(_) => Err(GenerationError::timeout(deadline)),
                }
            }
            None => self.client.generate(request).await,
        };
        Ok(response?)
    }

    /// Assemble the per-turn tool catalog: the agent's own tools plus a
    /// synthetic tool for each handoff whose filter allows the offer.
    async fn assemble_catalog(agent: &Agent, context: &RunContext) -> Vec<ToolDefinition> {
        let mut catalog = agent.tool_definitions();
        for handoff in &agent.handoffs {
            if handoff.is_enabled(context).await {
                catalog.push(handoff.definition());
            }
        }
        catalog
    }

    /// Classify a model response into the next step.
    ///
    /// A handoff call anywhere in the response wins: any other calls
    /// bundled alongside it are dropped unexecuted.
    fn classify_response(parts: &[ResponsePart]) -> TurnStep {
        let calls: Vec<ToolCallRequest> = parts
            .iter()
            .filter_map(ResponsePart::as_function_call)
            .map(|(name, args)| ToolCallRequest {
                name: name.to_string(),
                args: args.clone(),
            })
            .collect();

        if let Some(handoff_call) = calls.iter().find(|c| is_handoff_call(&c.name)) {
            let reason = handoff_call
                .args
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return TurnStep::Handoff {
                tool_name: handoff_call.name.clone(),
                reason,
            };
        }

        if !calls.is_empty() {
            return TurnStep::ToolCalls(calls);
        }

        let text: String = parts.iter().filter_map(ResponsePart::as_text).collect();
        TurnStep::FinalOutput(text)
    }

    /// Execute tool calls concurrently, preserving call order in the
    /// returned outcomes.
    async fn execute_tool_calls(
        calls: &[ToolCallRequest],
        agent: &Agent,
        context: &RunContext,
        hooks: &SharedRunHooks,
    ) -> Vec<ToolCallOutcome> {
        let futs: Vec<_> = calls
            .iter()
            .map(|call| Self::execute_single_tool(call, agent, context, hooks))
            .collect();
        futures::future::join_all(futs).await
    }

    /// Execute one tool call.
    ///
    /// A call naming an unknown tool, and a tool that fails, both yield
    /// an error payload fed back to the model; neither is fatal. Hooks
    /// fire only when the tool was actually resolved and dispatched.
    async fn execute_single_tool(
        call: &ToolCallRequest,
        agent: &Agent,
        context: &RunContext,
        hooks: &SharedRunHooks,
    ) -> ToolCallOutcome {
        let tool_span = info_span!(
            "tool",
            tool.name = %call.name,
            tool.success = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        async {
            let Some(tool) = agent.find_tool(&call.name) else {
                warn!(tool = %call.name, agent = %agent.name(), "Tool not found");
                tracing::Span::current().record("tool.success", false);
                return ToolCallOutcome {
                    name: call.name.clone(),
                    payload: error_payload(format!("Tool '{}' not found", call.name)),
                    show_in_thread: false,
                };
            };
            let show_in_thread = tool.show_in_thread();

            hooks
                .on_tool_start(context, agent.name(), &call.name, &call.args)
                .await;

            let payload = match tool.execute(call.args.clone()).await {
                Ok(value) => {
                    tracing::Span::current().record("tool.success", true);
                    value
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool execution failed");
                    let current = tracing::Span::current();
                    current.record("tool.success", false);
                    current.record("error", tracing::field::display(&e));
                    error_payload(e.to_string())
                }
            };

            hooks
                .on_tool_end(context, agent.name(), &call.name, &payload)
                .await;

            ToolCallOutcome {
                name: call.name.clone(),
                payload,
                show_in_thread,
            }
        }
        .instrument(tool_span)
        .await
    }

    /// Run input guardrails concurrently; verdicts are checked in
    /// registration order so the first registered trip wins.
    ///
    /// A check that itself fails is logged and treated as a pass.
    async fn run_input_guardrails(
        guardrails: &[&InputGuardrail],
        context: &RunContext,
        agent_name: &str,
        input: &[Message],
    ) -> Result<()> {
        if guardrails.is_empty() {
            return Ok(());
        }

        let futs: Vec<_> = guardrails
            .iter()
            .map(|g| g.run(context, agent_name, input))
            .collect();
        let verdicts = futures::future::join_all(futs).await;

        for (guardrail, verdict) in guardrails.iter().zip(verdicts) {
            match verdict {
                Err(e) => {
                    warn!(
                        guardrail = %guardrail.name(),
                        error = %e,
                        "Input guardrail check failed, treating as pass"
                    );
                }
                Ok(v) if v.is_tripped() => {
                    let err = Error::guardrail_triggered(
                        guardrail.name(),
                        GuardrailStage::Input,
                        v.message,
                        v.info,
                    );
                    info!(guardrail = %guardrail.name(), "Input guardrail tripped");
                    return Err(err);
                }
                Ok(_) => {}
            }
        }
        Ok(())
    }

    /// Run output guardrails concurrently against the final output, with
    /// the same ordering and fail-open behavior as the input pipeline.
    async fn run_output_guardrails(
        guardrails: &[&OutputGuardrail],
        context: &RunContext,
        agent_name: &str,
        output: &str,
    ) -> Result<()> {
        if guardrails.is_empty() {
            return Ok(());
        }

        let futs: Vec<_> = guardrails
            .iter()
            .map(|g| g.run(context, agent_name, output))
            .collect();
        let verdicts = futures::future::join_all(futs).await;

        for (guardrail, verdict) in guardrails.iter().zip(verdicts) {
            match verdict {
                Err(e) => {
                    warn!(
                        guardrail = %guardrail.name(),
                        error = %e,
                        "Output guardrail check failed, treating as pass"
                    );
                }
                Ok(v) if v.is_tripped() => {
                    let err = Error::guardrail_triggered(
                        guardrail.name(),
                        GuardrailStage::Output,
                        v.message,
                        v.info,
                    );
                    info!(guardrail = %guardrail.name(), "Output guardrail tripped");
                    return Err(err);
                }
                Ok(_) => {}
            }
        }
        Ok(())
    }
}

/// Convert a recoverable tool failure into the payload the model sees.
fn error_payload(message: String) -> Value {
    json!({"error": true, "message": message})
}

/// Reconstruct a model message from response parts.
fn response_message(parts: &[ResponsePart]) -> Message {
    let message_parts = parts
        .iter()
        .map(|p| match p {
            ResponsePart::Text { text } => Part::text(text),
            ResponsePart::FunctionCall { name, args } => Part::function_call(name, args.clone()),
        })
        .collect();
    Message::with_parts(Role::Model, message_parts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    mod classification {
        use super::*;

        #[test]
        fn text_only_is_final_output() {
            let parts = vec![ResponsePart::text("Revenue was up 4%.")];
            assert!(matches!(
                Runner::classify_response(&parts),
                TurnStep::FinalOutput(ref s) if s == "Revenue was up 4%."
            ));
        }

        #[test]
        fn text_fragments_concatenate() {
            let parts = vec![ResponsePart::text("Revenue "), ResponsePart::text("up.")];
            assert!(matches!(
                Runner::classify_response(&parts),
                TurnStep::FinalOutput(ref s) if s == "Revenue up."
            ));
        }

        #[test]
        fn function_calls_classify_as_tool_calls() {
            let parts = vec![
                ResponsePart::function_call("lookup", json!({"field": "revenue"})),
                ResponsePart::function_call("get_current_time", json!({})),
            ];
            match Runner::classify_response(&parts) {
                TurnStep::ToolCalls(calls) => {
                    assert_eq!(calls.len(), 2);
                    assert_eq!(calls[0].name, "lookup");
                }
                _ => panic!("expected tool calls"),
            }
        }

        #[test]
        fn handoff_wins_over_bundled_tool_calls() {
            let parts = vec![
                ResponsePart::function_call("lookup", json!({})),
                ResponsePart::function_call(
                    "transfer_to_billing",
                    json!({"reason": "billing question"}),
                ),
            ];
            match Runner::classify_response(&parts) {
                TurnStep::Handoff { tool_name, reason } => {
                    assert_eq!(tool_name, "transfer_to_billing");
                    assert_eq!(reason, "billing question");
                }
                _ => panic!("expected handoff"),
            }
        }

        #[test]
        fn handoff_without_reason_defaults_empty() {
            let parts = vec![ResponsePart::function_call("transfer_to_billing", json!({}))];
            match Runner::classify_response(&parts) {
                TurnStep::Handoff { reason, .. } => assert_eq!(reason, ""),
                _ => panic!("expected handoff"),
            }
        }

        #[test]
        fn empty_parts_are_empty_final_output() {
            assert!(matches!(
                Runner::classify_response(&[]),
                TurnStep::FinalOutput(ref s) if s.is_empty()
            ));
        }
    }

    mod payloads {
        use super::*;

        #[test]
        fn error_payload_shape() {
            let payload = error_payload("Tool 'x' not found".to_string());
            assert_eq!(payload["error"], true);
            assert_eq!(payload["message"], "Tool 'x' not found");
        }

        #[test]
        fn response_message_preserves_parts() {
            let parts = vec![
                ResponsePart::text("Looking that up."),
                ResponsePart::function_call("lookup", json!({"field": "revenue"})),
            ];
            let message = response_message(&parts);
            assert_eq!(message.role, Role::Model);
            assert_eq!(message.parts.len(), 2);
            assert!(message.has_function_calls());
            assert_eq!(message.text(), "Looking that up.");
        }
    }
}
