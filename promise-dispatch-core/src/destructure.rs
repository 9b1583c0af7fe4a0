//! Payload destructuring: resolving the payload shape once
//!
//! The destructurer turns a [`PayloadSource`] into either a plain passthrough
//! payload or an awaitable slot plus optional optimistic data. All shape
//! decisions happen here, in one place; the sequencer only looks at the
//! resulting variant.

use serde_json::{Map, Value};

use crate::payload::{MaybePromise, PayloadSource, PromiseSource};

/// The result of destructuring one action's payload.
///
/// Transient: built and consumed within a single dispatch call.
#[derive(Debug)]
pub enum DestructuredPayload {
    /// Nothing awaitable was found; the original plain payload, untouched.
    Plain(Option<Value>),
    /// An extracted slot (awaitable, or a thunk's plain return value) plus
    /// optional optimistic data for the pending action.
    Async {
        promise_like: MaybePromise,
        optimistic_data: Option<Value>,
    },
}

/// Extract the asynchronous work and optimistic data from a payload.
///
/// Decision order over the shapes:
/// 1. the payload is the awaitable itself;
/// 2. the payload is a zero-argument thunk: invoke it once, its return value
///    becomes the slot (no recursion — a thunk returning a plain value is
///    left for the sequencer's defensive check);
/// 3. a structured payload: take `data` as optimistic data, then resolve the
///    `promise` sub-field, callable form first;
/// 4. anything else passes through untouched.
///
/// Never panics; the single thunk invocation is the only side effect.
pub fn destructure(payload: PayloadSource) -> DestructuredPayload {
    match payload {
        PayloadSource::Promise(future) => DestructuredPayload::Async {
            promise_like: MaybePromise::Future(future),
            optimistic_data: None,
        },
        PayloadSource::Thunk(thunk) => DestructuredPayload::Async {
            promise_like: thunk(),
            optimistic_data: None,
        },
        PayloadSource::Structured { promise, data } => match promise {
            // Callable wins over the direct awaitable: it is checked first.
            Some(PromiseSource::Thunk(thunk)) => DestructuredPayload::Async {
                promise_like: thunk(),
                optimistic_data: data,
            },
            Some(PromiseSource::Future(future)) => DestructuredPayload::Async {
                promise_like: MaybePromise::Future(future),
                optimistic_data: data,
            },
            // No asynchronous work: forward the object as a plain payload.
            None => {
                let mut object = Map::new();
                if let Some(data) = data {
                    object.insert("data".into(), data);
                }
                DestructuredPayload::Plain(Some(Value::Object(object)))
            }
        },
        PayloadSource::Value(value) => DestructuredPayload::Plain(Some(value)),
        PayloadSource::None => DestructuredPayload::Plain(None),
    }
}
