//! promise-dispatch: promise lifecycle middleware for Redux-style pipelines
//!
//! Dispatch one action whose payload carries asynchronous work, observe
//! three: `FETCH_PENDING` immediately, then exactly one of `FETCH_FULFILLED`
//! or `FETCH_REJECTED` once the work settles.
//!
//! # Example
//! ```ignore
//! use promise_dispatch::prelude::*;
//! use serde_json::json;
//!
//! let middleware = PromiseMiddleware::new().connect(redispatch_tx);
//! let outcome = middleware.handle(
//!     |action| store.dispatch(action),
//!     AsyncAction::new("FETCH").with_promise(async { Ok(json!(42)) }),
//! );
//! ```

// Re-export everything from core
pub use promise_dispatch_core::*;

/// Prelude for convenient imports
pub mod prelude {
    // Actions and payload shapes
    pub use promise_dispatch_core::{
        is_promise_like, Action, AsyncAction, MaybePromise, PayloadSource, PromiseSource,
    };

    // Configuration
    pub use promise_dispatch_core::{AsyncTypeSet, Config, DEFAULT_DELIMITER, DEFAULT_TYPES};

    // Middleware
    pub use promise_dispatch_core::{
        ActionError, ConnectedMiddleware, DispatchOutcome, Dispatcher, PromiseMiddleware,
        Settlement, SettlementHandle,
    };

    // Testing helpers
    pub use promise_dispatch_core::{recording_dispatcher, DispatchLog, RecordingDispatcher};
}
