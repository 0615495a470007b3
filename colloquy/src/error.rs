//! Unified error types for the colloquy runtime.
//!
//! The taxonomy separates fatal run errors (guardrail trips, turn budget
//! exhaustion, handoff resolution failures, remote generation failures)
//! from recoverable tool errors, which the runner absorbs into
//! conversation content instead of propagating.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Result type alias for colloquy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which guardrail pipeline raised a tripwire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailStage {
    /// The pre-loop input pipeline.
    Input,
    /// The post-final-output pipeline.
    Output,
}

impl fmt::Display for GuardrailStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// The main error type for the colloquy runtime.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A guardrail vetoed the run. Not retriable without changing the input.
    #[error("{stage} guardrail '{guardrail_name}' tripped{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    GuardrailTriggered {
        /// Name of the guardrail that tripped.
        guardrail_name: String,
        /// Which pipeline the guardrail belongs to.
        stage: GuardrailStage,
        /// Optional human-readable explanation from the guardrail.
        message: Option<String>,
        /// Structured diagnostic payload from the guardrail.
        info: Value,
    },

    /// The turn budget was exhausted without a final output.
    #[error("Maximum turns ({max_turns}) reached without final output")]
    MaxTurnsExceeded {
        /// The configured turn budget.
        max_turns: usize,
    },

    /// The model requested a handoff that cannot be resolved to a known
    /// agent. Indicates a catalog construction bug, so it is fatal.
    #[error("Handoff resolution failed: {0}")]
    HandoffResolution(String),

    /// The content generation call failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Generic runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a generic runtime error.
    #[must_use]
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Create a max-turns error.
    #[must_use]
    pub const fn max_turns(max_turns: usize) -> Self {
        Self::MaxTurnsExceeded { max_turns }
    }

    /// Create a handoff resolution error.
    #[must_use]
    pub fn handoff_resolution(msg: impl Into<String>) -> Self {
        Self::HandoffResolution(msg.into())
    }

    /// Create a guardrail tripwire error.
    #[must_use]
    pub fn guardrail_triggered(
        guardrail_name: impl Into<String>,
        stage: GuardrailStage,
        message: Option<String>,
        info: Value,
    ) -> Self {
        Self::GuardrailTriggered {
            guardrail_name: guardrail_name.into(),
            stage,
            message,
            info,
        }
    }
}

/// Error type for content generation failures.
///
/// Carried inside [`Error::Generation`]. The runner never retries these;
/// retry policy belongs to the caller or the client itself.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GenerationError {
    /// The error kind.
    pub kind: GenerationErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Optional error code from the backing service.
    pub code: Option<String>,
}

/// Categories of content generation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerationErrorKind {
    /// Network or connection failure.
    Network,
    /// The configured deadline elapsed before a response arrived.
    Timeout,
    /// The request was rejected as invalid.
    InvalidRequest,
    /// The response could not be interpreted.
    ResponseFormat,
    /// Service-side failure.
    Service,
    /// Internal error.
    Internal,
}

impl GenerationError {
    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::Network,
            message: message.into(),
            code: None,
        }
    }

    /// Create a timeout error for an elapsed deadline.
    #[must_use]
    pub fn timeout(deadline: Duration) -> Self {
        Self {
            kind: GenerationErrorKind::Timeout,
            message: format!("Generation call exceeded deadline of {deadline:?}"),
            code: None,
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::InvalidRequest,
            message: message.into(),
            code: None,
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::ResponseFormat,
            message: message.into(),
            code: None,
        }
    }

    /// Create a service error with an optional error code.
    #[must_use]
    pub fn service(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            kind: GenerationErrorKind::Service,
            message: message.into(),
            code,
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::Internal,
            message: message.into(),
            code: None,
        }
    }

    /// Check if this is a retryable error (retrying is the caller's call).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GenerationErrorKind::Network | GenerationErrorKind::Timeout
        )
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerationError {}

/// Error type for tool execution failures.
///
/// These are recoverable at the runner level: the runner converts them to
/// `{"error": true, "message": ...}` payloads fed back to the model, and
/// the run continues.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid arguments provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Generic error.
    #[error("Tool error: {0}")]
    Other(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod error {
        use super::*;

        #[test]
        fn runtime_creates_error() {
            let err = Error::runtime("something went wrong");
            assert!(matches!(err, Error::Runtime(_)));
            assert!(err.to_string().contains("something went wrong"));
        }

        #[test]
        fn max_turns_creates_error() {
            let err = Error::max_turns(10);
            assert!(matches!(err, Error::MaxTurnsExceeded { max_turns: 10 }));
            assert!(err.to_string().contains("10"));
        }

        #[test]
        fn handoff_resolution_creates_error() {
            let err = Error::handoff_resolution("no agent named 'billing'");
            assert!(matches!(err, Error::HandoffResolution(_)));
            assert!(err.to_string().contains("billing"));
        }

        #[test]
        fn guardrail_display_includes_name_and_stage() {
            let err = Error::guardrail_triggered(
                "no-pii",
                GuardrailStage::Output,
                Some("detected an email address".to_string()),
                Value::Null,
            );
            let s = err.to_string();
            assert!(s.contains("no-pii"));
            assert!(s.contains("output"));
            assert!(s.contains("email address"));
        }

        #[test]
        fn guardrail_display_without_message() {
            let err =
                Error::guardrail_triggered("topic", GuardrailStage::Input, None, Value::Null);
            let s = err.to_string();
            assert!(s.contains("input guardrail 'topic' tripped"));
            assert!(!s.contains(": "));
        }

        #[test]
        fn from_generation_error() {
            let gen_err = GenerationError::network("connection refused");
            let err: Error = gen_err.into();
            assert!(matches!(err, Error::Generation(_)));
        }

        #[test]
        fn from_json_error() {
            let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    mod generation_error {
        use super::*;

        #[test]
        fn network_creates_error() {
            let err = GenerationError::network("connection refused");
            assert_eq!(err.kind, GenerationErrorKind::Network);
            assert!(err.message.contains("connection refused"));
            assert!(err.code.is_none());
        }

        #[test]
        fn timeout_mentions_deadline() {
            let err = GenerationError::timeout(Duration::from_secs(30));
            assert_eq!(err.kind, GenerationErrorKind::Timeout);
            assert!(err.message.contains("30s"));
        }

        #[test]
        fn service_carries_code() {
            let err = GenerationError::service("quota exhausted", Some("429".to_string()));
            assert_eq!(err.kind, GenerationErrorKind::Service);
            assert!(err.to_string().contains("(code: 429)"));
        }

        #[test]
        fn is_retryable_network_and_timeout() {
            assert!(GenerationError::network("x").is_retryable());
            assert!(GenerationError::timeout(Duration::from_secs(1)).is_retryable());
            assert!(!GenerationError::invalid_request("x").is_retryable());
            assert!(!GenerationError::internal("x").is_retryable());
        }

        #[test]
        fn implements_std_error() {
            let err = GenerationError::internal("test");
            let _: &dyn std::error::Error = &err;
        }
    }

    mod tool_error {
        use super::*;

        #[test]
        fn execution_creates_error() {
            let err = ToolError::execution("failed to run");
            assert!(matches!(err, ToolError::Execution(_)));
            assert!(err.to_string().contains("failed to run"));
        }

        #[test]
        fn not_found_creates_error() {
            let err = ToolError::not_found("lookup_metric");
            assert!(matches!(err, ToolError::NotFound(_)));
            assert!(err.to_string().contains("lookup_metric"));
        }

        #[test]
        fn from_string_and_str() {
            let err: ToolError = "custom".to_string().into();
            assert!(matches!(err, ToolError::Other(_)));
            let err: ToolError = "custom".into();
            assert!(matches!(err, ToolError::Other(_)));
        }

        #[test]
        fn from_serde_json_error() {
            let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
            let err: ToolError = json_err.into();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }
    }
}
