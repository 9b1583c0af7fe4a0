//! Core types and middleware logic for promise-dispatch
//!
//! This crate implements a promise lifecycle middleware for Redux-style
//! dispatch pipelines: when a dispatched action's payload carries
//! asynchronous work, the single action is expanded into pending, fulfilled,
//! and rejected lifecycle actions.
//!
//! # Core Concepts
//!
//! - **Action**: a flux-standard action, the message forwarded to reducers
//! - **AsyncAction**: the consumed shape, whose payload may carry a future,
//!   a zero-argument thunk, or a structured `{ promise, data }` object
//! - **PromiseMiddleware**: classifies payloads and sequences the lifecycle
//! - **Dispatcher**: the re-entrant dispatch capability settlement actions
//!   re-enter the pipeline through
//!
//! # Basic Example
//!
//! ```ignore
//! use promise_dispatch_core::prelude::*;
//! use serde_json::json;
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let middleware = PromiseMiddleware::new().connect(tx);
//!
//! let action = AsyncAction::new("FETCH")
//!     .with_promise(async { Ok(json!({ "user": "ada" })) });
//!
//! // FETCH_PENDING goes downstream synchronously via `next`.
//! let outcome = middleware.handle(|action| next_stage(action), action);
//!
//! if let DispatchOutcome::InFlight(handle) = outcome {
//!     // FETCH_FULFILLED arrives on `rx` once the work settles, and the
//!     // handle resolves with the settled value and that same action.
//!     let settlement = handle.await?;
//!     assert_eq!(settlement.action.kind, "FETCH_FULFILLED");
//! }
//! ```
//!
//! # Lifecycle
//!
//! For a payload that fails, the rejected action carries the error as its
//! payload with `error: true`, and the settlement handle fails with the
//! original error so callers can still observe and handle it. Exactly one
//! fulfilled or rejected action is produced per settlement, and the pending
//! action always precedes it.

pub mod action;
pub mod builder;
pub mod config;
pub mod destructure;
pub mod error;
pub mod middleware;
pub mod payload;
pub mod testing;

// Action exports
pub use action::{Action, AsyncAction};

// Payload exports
pub use payload::{
    is_promise_like, ActionFuture, ActionThunk, MaybePromise, PayloadSource, PromiseSource,
};

// Destructurer and builder exports
pub use builder::{build_action, BuildAction};
pub use destructure::{destructure, DestructuredPayload};

// Configuration exports
pub use config::{AsyncTypeSet, Config, DEFAULT_DELIMITER, DEFAULT_TYPES};

// Middleware exports
pub use error::ActionError;
pub use middleware::{
    ConnectedMiddleware, DispatchOutcome, Dispatcher, PromiseMiddleware, Settlement,
    SettlementHandle,
};

// Testing exports
pub use testing::{recording_dispatcher, DispatchLog, RecordingDispatcher};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, AsyncAction};
    pub use crate::config::{AsyncTypeSet, Config, DEFAULT_DELIMITER, DEFAULT_TYPES};
    pub use crate::error::ActionError;
    pub use crate::middleware::{
        ConnectedMiddleware, DispatchOutcome, Dispatcher, PromiseMiddleware, Settlement,
        SettlementHandle,
    };
    pub use crate::payload::{
        is_promise_like, MaybePromise, PayloadSource, PromiseSource,
    };
}
