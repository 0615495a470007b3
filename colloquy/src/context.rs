//! Shared run context for hooks and guardrails.
//!
//! Provides [`RunContext`], which carries shared state across hook and
//! guardrail invocations during a run: the current turn number, the
//! active agent's name, and a user-defined state map.

use std::collections::HashMap;

use serde_json::Value;

/// Context passed to hooks and guardrail checks during a run.
///
/// Hooks receive `&RunContext`; they observe but do not steer the run.
/// The runner updates the turn counter and active agent name as the loop
/// advances, and the state map is available for user-defined data
/// sharing between hook invocations.
///
/// # Example
///
/// ```rust
/// use colloquy::RunContext;
///
/// let ctx = RunContext::new().with_agent_name("analyst").with_turn(3);
///
/// assert_eq!(ctx.agent_name(), Some("analyst"));
/// assert_eq!(ctx.turn(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Current turn number (1-indexed during execution, 0 before start).
    turn: usize,
    /// Name of the currently active agent.
    agent_name: Option<String>,
    /// User-defined state for sharing data across hooks.
    state: HashMap<String, Value>,
}

impl RunContext {
    /// Create a new empty run context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agent name.
    #[must_use]
    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    /// Set the current turn number.
    #[must_use]
    pub const fn with_turn(mut self, turn: usize) -> Self {
        self.turn = turn;
        self
    }

    /// Get the current turn number.
    #[must_use]
    pub const fn turn(&self) -> usize {
        self.turn
    }

    /// Get the active agent name, if set.
    #[must_use]
    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    /// Get a reference to the user-defined state map.
    #[must_use]
    pub const fn state(&self) -> &HashMap<String, Value> {
        &self.state
    }

    /// Get a value from the user-defined state.
    #[must_use]
    pub fn get_state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Insert a value into the user-defined state.
    pub fn set_state(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    /// Remove a value from the user-defined state.
    pub fn remove_state(&mut self, key: &str) -> Option<Value> {
        self.state.remove(key)
    }

    /// Advance to the next turn.
    pub const fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Update the active agent name.
    pub fn set_agent_name(&mut self, name: impl Into<String>) {
        self.agent_name = Some(name.into());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod construction {
        use super::*;

        #[test]
        fn new_creates_empty_context() {
            let ctx = RunContext::new();
            assert_eq!(ctx.turn(), 0);
            assert!(ctx.agent_name().is_none());
            assert!(ctx.state().is_empty());
        }

        #[test]
        fn builder_chain() {
            let ctx = RunContext::new().with_agent_name("analyst").with_turn(2);
            assert_eq!(ctx.agent_name(), Some("analyst"));
            assert_eq!(ctx.turn(), 2);
        }
    }

    mod state_management {
        use super::*;

        #[test]
        fn set_and_get_state() {
            let mut ctx = RunContext::new();
            ctx.set_state("dashboard_id", json!("dash-42"));
            assert_eq!(ctx.get_state("dashboard_id"), Some(&json!("dash-42")));
        }

        #[test]
        fn get_state_returns_none_for_missing_key() {
            let ctx = RunContext::new();
            assert!(ctx.get_state("nonexistent").is_none());
        }

        #[test]
        fn set_state_overwrites_existing() {
            let mut ctx = RunContext::new();
            ctx.set_state("key", json!(1));
            ctx.set_state("key", json!(2));
            assert_eq!(ctx.get_state("key"), Some(&json!(2)));
        }

        #[test]
        fn remove_state_returns_value() {
            let mut ctx = RunContext::new();
            ctx.set_state("key", json!("hello"));
            assert_eq!(ctx.remove_state("key"), Some(json!("hello")));
            assert!(ctx.get_state("key").is_none());
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn advance_turn_increments() {
            let mut ctx = RunContext::new();
            ctx.advance_turn();
            ctx.advance_turn();
            assert_eq!(ctx.turn(), 2);
        }

        #[test]
        fn set_agent_name_updates() {
            let mut ctx = RunContext::new().with_agent_name("triage");
            ctx.set_agent_name("analyst");
            assert_eq!(ctx.agent_name(), Some("analyst"));
        }
    }

    mod clone {
        use super::*;

        #[test]
        fn clone_creates_independent_copy() {
            let mut ctx = RunContext::new().with_agent_name("original").with_turn(3);
            ctx.set_state("k", json!(42));

            let mut cloned = ctx.clone();
            cloned.advance_turn();
            cloned.set_state("k", json!(99));

            assert_eq!(ctx.turn(), 3);
            assert_eq!(ctx.get_state("k"), Some(&json!(42)));
            assert_eq!(cloned.turn(), 4);
            assert_eq!(cloned.get_state("k"), Some(&json!(99)));
        }
    }
}
