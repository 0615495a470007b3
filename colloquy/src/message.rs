//! Conversation message types.
//!
//! A [`Message`] is a role plus an ordered list of [`Part`]s, where each
//! part is plain text, a function call requested by the model, or the
//! result of a function call fed back to the model. Conversation history
//! is an append-only sequence; the runner works on its own copy and never
//! mutates the caller's messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user message (also carries function responses back to the model).
    User,
    /// Model-generated message.
    Model,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text content.
    Text {
        /// The text content.
        text: String,
    },
    /// A function call requested by the model.
    FunctionCall {
        /// Name of the function to call.
        name: String,
        /// Arguments as a JSON object.
        args: Value,
    },
    /// The result of a function call, fed back to the model.
    FunctionResponse {
        /// Name of the function that produced this result.
        name: String,
        /// The result payload (success value or error shape).
        response: Value,
    },
}

impl Part {
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

    /// Create a function response part.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self::FunctionResponse {
            name: name.into(),
            response,
        }
    }

    /// Get the text content if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Check if this part is a function call.
    #[must_use]
    pub const fn is_function_call(&self) -> bool {
        matches!(self, Self::FunctionCall { .. })
    }
}

/// A message in a conversation: a role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender.
    pub role: Role,
    /// Ordered parts of the message.
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model message with a single text part.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model message carrying a function call.
    #[must_use]
    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::function_call(name, args)],
        }
    }

    /// Create a user message carrying a function response.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::function_response(name, response)],
        }
    }

    /// Create a message with the given role and parts.
    #[must_use]
    pub const fn with_parts(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Concatenate all text parts, in order.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// Check if this message carries any function call parts.
    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        self.parts.iter().any(Part::is_function_call)
    }
}
