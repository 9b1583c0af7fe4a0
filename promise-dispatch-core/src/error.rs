//! Error value carried by rejected lifecycle actions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error produced by a failed asynchronous payload.
///
/// The same value travels two ways after a settlement failure: it becomes the
/// payload of the rejected action (with `error: true`), and it is returned to
/// the caller awaiting the [`SettlementHandle`](crate::SettlementHandle).
/// `Clone` makes that dual delivery possible without wrapping in `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    /// Optional structured context, surfaced verbatim in the rejected payload.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    details: Option<Value>,
}

impl ActionError {
    /// Create an error with a message and no structured details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details (e.g. an HTTP status or response body).
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured details, if any were attached.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The JSON representation used as a rejected action's payload.
    pub fn to_payload(&self) -> Value {
        // Serialization of a string + optional Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
