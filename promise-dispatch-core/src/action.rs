//! Flux-standard actions and the async-bearing input shape

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;
use crate::payload::{MaybePromise, PayloadSource, PromiseSource};

/// A plain flux-standard action: the shape forwarded to reducers.
///
/// `kind` serializes as `"type"` and is always non-empty. The optional fields
/// are skipped entirely when absent so downstream serializers see "no field"
/// rather than `null`, and `error` is only emitted when true. Consumers rely
/// on that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type name, e.g. `"FETCH_PENDING"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload value, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Value>,
    /// Metadata copied verbatim from the originating action.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<Value>,
    /// True when `payload` holds an error value.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub error: bool,
}

impl Action {
    /// Create an action with no payload, meta, or error flag.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        debug_assert!(!kind.is_empty(), "action type must be non-empty");
        Self {
            kind,
            payload: None,
            meta: None,
            error: false,
        }
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the metadata.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// The shape the middleware consumes: a flux-standard action whose payload
/// may carry asynchronous work in any of the recognized forms.
#[derive(Debug)]
pub struct AsyncAction {
    /// Base action type name, e.g. `"FETCH"`.
    pub kind: String,
    /// Payload in any of the recognized shapes.
    pub payload: PayloadSource,
    /// Metadata propagated onto every derived action.
    pub meta: Option<Value>,
    /// True when `payload` holds an error value. Preserved verbatim on
    /// passthrough so re-entering rejected actions keep their flag.
    pub error: bool,
}

impl AsyncAction {
    /// Create an action with an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        debug_assert!(!kind.is_empty(), "action type must be non-empty");
        Self {
            kind,
            payload: PayloadSource::None,
            meta: None,
            error: false,
        }
    }

    /// Use an ordinary synchronous value as the payload.
    pub fn with_value(mut self, value: Value) -> Self {
        self.payload = PayloadSource::Value(value);
        self
    }

    /// Use an awaitable computation as the payload.
    pub fn with_promise<F>(mut self, future: F) -> Self
    where
        F: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        self.payload = PayloadSource::promise(future);
        self
    }

    /// Use a zero-argument thunk as the payload.
    pub fn with_thunk<T>(mut self, thunk: T) -> Self
    where
        T: FnOnce() -> MaybePromise + Send + 'static,
    {
        self.payload = PayloadSource::thunk(thunk);
        self
    }

    /// Use a structured `{ promise, data }` payload: asynchronous work plus
    /// optimistic data surfaced on the pending action.
    pub fn with_resource(mut self, promise: PromiseSource, data: Option<Value>) -> Self {
        self.payload = PayloadSource::Structured {
            promise: Some(promise),
            data,
        };
        self
    }

    /// Attach metadata, copied onto every derived action.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl From<Action> for AsyncAction {
    fn from(action: Action) -> Self {
        Self {
            kind: action.kind,
            payload: action.payload.into(),
            meta: action.meta,
            error: action.error,
        }
    }
}
