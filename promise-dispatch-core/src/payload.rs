//! Payload shapes and promise-like detection
//!
//! A dispatched action's payload can carry its asynchronous work in several
//! shapes: the awaitable itself, a zero-argument thunk producing one, or a
//! structured object with a `promise` sub-field and optional optimistic
//! `data`. Instead of probing dynamic types at each use site, every shape is
//! captured up front in the [`PayloadSource`] union and resolved once by the
//! destructurer.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::ActionError;

/// A boxed asynchronous computation settling into a JSON value or an error.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<Value, ActionError>> + Send + 'static>>;

/// A zero-argument callable producing the payload's asynchronous work.
///
/// The thunk may also return a plain value; that case is detected after the
/// call and routes the action into the degenerate passthrough branch instead
/// of lifecycle expansion.
pub type ActionThunk = Box<dyn FnOnce() -> MaybePromise + Send + 'static>;

/// A value that may or may not carry an awaitable computation.
///
/// This is the domain of [`is_promise_like`]: the structural stand-in for the
/// duck-typed "has a callable `then`" check.
pub enum MaybePromise {
    /// An awaitable computation.
    Future(ActionFuture),
    /// An already-materialized plain value.
    Value(Value),
}

impl MaybePromise {
    /// Wrap a future, boxing it.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        Self::Future(Box::pin(future))
    }

    /// Wrap a plain value.
    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for MaybePromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Future(_) => f.write_str("MaybePromise::Future(..)"),
            Self::Value(v) => f.debug_tuple("MaybePromise::Value").field(v).finish(),
        }
    }
}

/// Returns true iff `value` carries an awaitable computation.
///
/// Pure and infallible: no input can make it panic, and it never observes
/// anything beyond the variant tag.
pub fn is_promise_like(value: &MaybePromise) -> bool {
    matches!(value, MaybePromise::Future(_))
}

/// The `promise` sub-field of a structured payload.
///
/// The callable shape is listed (and checked) first: when a source could be
/// read either way, invoking it wins.
pub enum PromiseSource {
    /// A callable producing the work on demand.
    Thunk(ActionThunk),
    /// The awaitable itself.
    Future(ActionFuture),
}

impl PromiseSource {
    /// Wrap a future, boxing it.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        Self::Future(Box::pin(future))
    }

    /// Wrap a zero-argument thunk.
    pub fn thunk<T>(thunk: T) -> Self
    where
        T: FnOnce() -> MaybePromise + Send + 'static,
    {
        Self::Thunk(Box::new(thunk))
    }
}

impl fmt::Debug for PromiseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thunk(_) => f.write_str("PromiseSource::Thunk(..)"),
            Self::Future(_) => f.write_str("PromiseSource::Future(..)"),
        }
    }
}

/// Every payload shape a dispatched action can carry.
pub enum PayloadSource {
    /// No payload at all.
    None,
    /// An ordinary synchronous value.
    Value(Value),
    /// The awaitable computation itself.
    Promise(ActionFuture),
    /// A zero-argument thunk producing the computation.
    Thunk(ActionThunk),
    /// An object with a `promise` sub-field and optional optimistic data.
    Structured {
        promise: Option<PromiseSource>,
        data: Option<Value>,
    },
}

impl PayloadSource {
    /// Shorthand for [`PayloadSource::Promise`], boxing the future.
    pub fn promise<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        Self::Promise(Box::pin(future))
    }

    /// Shorthand for [`PayloadSource::Thunk`], boxing the callable.
    pub fn thunk<T>(thunk: T) -> Self
    where
        T: FnOnce() -> MaybePromise + Send + 'static,
    {
        Self::Thunk(Box::new(thunk))
    }
}

impl Default for PayloadSource {
    fn default() -> Self {
        Self::None
    }
}

impl From<Value> for PayloadSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Option<Value>> for PayloadSource {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::None,
        }
    }
}

impl fmt::Debug for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("PayloadSource::None"),
            Self::Value(v) => f.debug_tuple("PayloadSource::Value").field(v).finish(),
            Self::Promise(_) => f.write_str("PayloadSource::Promise(..)"),
            Self::Thunk(_) => f.write_str("PayloadSource::Thunk(..)"),
            Self::Structured { promise, data } => f
                .debug_struct("PayloadSource::Structured")
                .field("promise", &promise.is_some())
                .field("data", data)
                .finish(),
        }
    }
}
