//! Colloquy - an agent orchestration runtime for conversational assistants
//!
//! This crate provides the turn loop that drives a chat-based assistant:
//! agents with tools and guardrails, handoffs between agents, and a
//! pluggable generation client.

pub mod agent;
pub mod client;
pub mod context;
pub mod error;
pub mod guardrail;
pub mod handoff;
pub mod hooks;
pub mod message;
pub mod prelude;
pub mod tool;

pub use agent::{Agent, RunConfig, RunItem, RunResult, Runner};
pub use context::RunContext;
pub use error::{Error, GenerationError, Result, ToolError};
