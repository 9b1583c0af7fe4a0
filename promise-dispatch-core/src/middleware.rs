//! Promise lifecycle middleware
//!
//! The sequencer sits in a unidirectional dispatch pipeline. Actions without
//! asynchronous payloads pass straight through to the next stage. Actions
//! carrying asynchronous work are expanded into a lifecycle: a pending action
//! forwarded synchronously, then exactly one fulfilled or rejected action
//! redispatched into the pipeline once the work settles.
//!
//! The two forwarding paths are deliberately distinct: `next` (a closure
//! argument, the passthrough continuation) carries the pending and
//! passthrough actions one stage downstream, while the connected
//! [`Dispatcher`] re-enters the full pipeline with the settlement actions so
//! every other middleware observes them.
//!
//! # Example
//!
//! ```ignore
//! use promise_dispatch_core::{AsyncAction, DispatchOutcome, PromiseMiddleware};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let middleware = PromiseMiddleware::new().connect(tx);
//!
//! let action = AsyncAction::new("FETCH")
//!     .with_promise(async { Ok(fetch_user().await?) });
//!
//! match middleware.handle(|action| store.dispatch(action), action) {
//!     DispatchOutcome::Forwarded(result) => { /* synchronous action */ }
//!     DispatchOutcome::InFlight(handle) => {
//!         // FETCH_PENDING already went downstream; FETCH_FULFILLED or
//!         // FETCH_REJECTED will arrive on `rx` once the work settles.
//!         let settlement = handle.await?;
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::action::{Action, AsyncAction};
use crate::builder::{build_action, BuildAction};
use crate::config::Config;
use crate::destructure::{destructure, DestructuredPayload};
use crate::error::ActionError;
use crate::payload::{is_promise_like, MaybePromise};

/// The re-entrant dispatch capability: sends a derived action back into the
/// front of the pipeline.
pub trait Dispatcher: Send + 'static {
    /// Dispatch an action into the pipeline.
    fn dispatch(&self, action: Action);
}

impl Dispatcher for mpsc::UnboundedSender<Action> {
    fn dispatch(&self, action: Action) {
        // A closed receiver means the pipeline shut down; nothing left to do.
        let _ = self.send(action);
    }
}

/// Factory for the middleware: holds the configuration built once at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct PromiseMiddleware {
    config: Config,
}

impl PromiseMiddleware {
    /// Middleware with the default token set and `"_"` delimiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Middleware with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// The immutable configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind the re-entrant dispatch capability, completing the middleware.
    ///
    /// This is the first of the three middleware stages; [`handle`] covers
    /// the remaining two (`next`, then the action itself).
    ///
    /// [`handle`]: ConnectedMiddleware::handle
    pub fn connect<D: Dispatcher>(&self, dispatcher: D) -> ConnectedMiddleware<D> {
        ConnectedMiddleware {
            config: self.config.clone(),
            dispatcher,
        }
    }
}

/// Middleware bound to a pipeline's re-entrant dispatcher.
#[derive(Debug)]
pub struct ConnectedMiddleware<D> {
    config: Config,
    dispatcher: D,
}

/// What `handle` produced for one dispatched action.
#[derive(Debug)]
pub enum DispatchOutcome<R> {
    /// The action was forwarded downstream synchronously; this is whatever
    /// the `next` continuation returned.
    Forwarded(R),
    /// Lifecycle expansion started: the pending action already went
    /// downstream, and the handle settles with the operation's outcome.
    InFlight(SettlementHandle),
}

impl<R> DispatchOutcome<R> {
    /// The passthrough result, if this was the synchronous branch.
    pub fn forwarded(self) -> Option<R> {
        match self {
            Self::Forwarded(result) => Some(result),
            Self::InFlight(_) => None,
        }
    }

    /// The settlement handle, if this was the asynchronous branch.
    pub fn in_flight(self) -> Option<SettlementHandle> {
        match self {
            Self::Forwarded(_) => None,
            Self::InFlight(handle) => Some(handle),
        }
    }
}

/// Resolved outcome of the asynchronous branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// The settled value of the underlying operation.
    pub value: Value,
    /// The fulfilled action that was redispatched.
    pub action: Action,
}

/// Awaits the settlement of one in-flight async action.
///
/// Resolves to [`Settlement`] on success or the operation's original
/// [`ActionError`] on failure, mirroring what the rejected action carries.
/// The settlement task runs regardless of whether this handle is polled or
/// dropped; there is no cancellation.
#[derive(Debug)]
pub struct SettlementHandle {
    rx: oneshot::Receiver<Result<Settlement, ActionError>>,
}

impl Future for SettlementHandle {
    type Output = Result<Settlement, ActionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|result| match result {
            Ok(outcome) => outcome,
            // The settlement task always sends before exiting, so a closed
            // channel only happens if the runtime tore the task down.
            Err(_) => Err(ActionError::new("settlement task terminated before completing")),
        })
    }
}

impl<D> ConnectedMiddleware<D>
where
    D: Dispatcher + Clone,
{
    /// Process one dispatched action.
    ///
    /// Plain actions (and thunk payloads that produced a plain value) are
    /// forwarded through `next` synchronously. Asynchronous payloads emit a
    /// pending action through `next` before this call returns, then spawn the
    /// settlement continuation; the fulfilled or rejected action re-enters
    /// the pipeline through the connected [`Dispatcher`].
    ///
    /// Must be called within a tokio runtime: the settlement continuation is
    /// spawned as a task so it outlives this call (and any dropped handle).
    pub fn handle<N, R>(&self, next: N, action: AsyncAction) -> DispatchOutcome<R>
    where
        N: FnOnce(Action) -> R,
    {
        let AsyncAction {
            kind,
            payload,
            meta,
            error,
        } = action;

        let (slot, optimistic_data) = match destructure(payload) {
            DestructuredPayload::Plain(payload) => {
                debug!(action = %kind, "no asynchronous payload, passing through");
                let action = Action {
                    kind,
                    payload,
                    meta,
                    error,
                };
                return DispatchOutcome::Forwarded(next(action));
            }
            DestructuredPayload::Async {
                promise_like,
                optimistic_data,
            } => (promise_like, optimistic_data),
        };

        // Consult the detector a second time, defensively, on the extracted
        // slot: a thunk may have handed back a plain value rather than an
        // awaitable. Such actions skip lifecycle expansion and go downstream
        // with the payload replaced by that value.
        let future = match (is_promise_like(&slot), slot) {
            (true, MaybePromise::Future(future)) => future,
            (_, slot) => {
                debug!(action = %kind, "extracted slot is not promise-like, passing through");
                let payload = match slot {
                    MaybePromise::Value(value) => Some(value),
                    MaybePromise::Future(_) => None,
                };
                let action = Action {
                    kind,
                    payload,
                    meta,
                    error,
                };
                return DispatchOutcome::Forwarded(next(action));
            }
        };

        // Pending goes downstream before the work gets a chance to settle.
        let pending = build_action(BuildAction {
            base: &kind,
            async_type: &self.config.types.pending,
            delimiter: &self.config.type_delimiter,
            payload: optimistic_data,
            meta: meta.clone(),
            error: false,
        });
        debug!(action = %pending.kind, "forwarding pending action");
        next(pending);

        let (tx, rx) = oneshot::channel();
        let dispatcher = self.dispatcher.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            match future.await {
                Ok(value) => {
                    let fulfilled = build_action(BuildAction {
                        base: &kind,
                        async_type: &config.types.fulfilled,
                        delimiter: &config.type_delimiter,
                        payload: Some(value.clone()),
                        meta,
                        error: false,
                    });
                    debug!(action = %fulfilled.kind, "redispatching fulfilled action");
                    dispatcher.dispatch(fulfilled.clone());
                    let _ = tx.send(Ok(Settlement {
                        value,
                        action: fulfilled,
                    }));
                }
                Err(error) => {
                    let rejected = build_action(BuildAction {
                        base: &kind,
                        async_type: &config.types.rejected,
                        delimiter: &config.type_delimiter,
                        payload: Some(error.to_payload()),
                        meta,
                        error: true,
                    });
                    debug!(action = %rejected.kind, error = %error, "redispatching rejected action");
                    dispatcher.dispatch(rejected);
                    // Re-raise the original error to the caller; the
                    // rejected action above is the pipeline's copy.
                    let _ = tx.send(Err(error));
                }
            }
        });

        DispatchOutcome::InFlight(SettlementHandle { rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AsyncTypeSet;
    use crate::payload::{MaybePromise, PromiseSource};
    use crate::testing::recording_dispatcher;
    use serde_json::json;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_scalar_payload_passes_through_unchanged() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("SET_COUNT").with_value(json!(7)),
        );

        assert!(matches!(outcome, DispatchOutcome::Forwarded(())));
        let forwarded = forwarded.into_inner();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0], Action::new("SET_COUNT").with_payload(json!(7)));
        assert!(log.drain().is_empty());
    }

    #[tokio::test]
    async fn test_absent_payload_passes_through() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("RESET"),
        );

        assert_eq!(forwarded.into_inner(), vec![Action::new("RESET")]);
        assert!(log.drain().is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_preserves_error_flag() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        // A rejected action re-entering the pipeline must come out as it
        // went in, error flag included.
        let rejected = Action {
            error: true,
            ..Action::new("FETCH_REJECTED").with_payload(json!({ "message": "x" }))
        };

        middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            rejected.clone().into(),
        );

        assert_eq!(forwarded.into_inner(), vec![rejected]);
        assert!(log.drain().is_empty());
    }

    #[tokio::test]
    async fn test_degenerate_passthrough_preserves_error_flag() {
        let (dispatcher, _log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let action = AsyncAction {
            error: true,
            ..AsyncAction::new("LOAD").with_thunk(|| MaybePromise::value(json!("oops")))
        };
        middleware.handle(|action| forwarded.borrow_mut().push(action), action);

        let forwarded = forwarded.into_inner();
        assert_eq!(forwarded[0].payload, Some(json!("oops")));
        assert!(forwarded[0].error);
    }

    #[tokio::test]
    async fn test_fulfilled_lifecycle() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("FETCH").with_promise(async { Ok(json!(42)) }),
        );

        // Pending is forwarded synchronously, before any settlement.
        assert_eq!(forwarded.into_inner(), vec![Action::new("FETCH_PENDING")]);

        let handle = outcome.in_flight().expect("lifecycle branch");
        let settlement = handle.await.expect("fulfilled");
        assert_eq!(settlement.value, json!(42));
        assert_eq!(
            settlement.action,
            Action::new("FETCH_FULFILLED").with_payload(json!(42))
        );

        // The fulfilled action re-entered the pipeline, exactly once.
        assert_eq!(log.drain(), vec![settlement.action]);
    }

    #[tokio::test]
    async fn test_rejected_lifecycle() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let failure = ActionError::new("x");
        let error_for_future = failure.clone();
        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("FETCH").with_promise(async move { Err(error_for_future) }),
        );

        assert_eq!(forwarded.into_inner(), vec![Action::new("FETCH_PENDING")]);

        let handle = outcome.in_flight().expect("lifecycle branch");
        let error = handle.await.expect_err("rejected");
        // The caller observes the original error.
        assert_eq!(error, failure);

        let redispatched = log.drain();
        assert_eq!(redispatched.len(), 1);
        assert_eq!(redispatched[0].kind, "FETCH_REJECTED");
        assert_eq!(redispatched[0].payload, Some(json!({ "message": "x" })));
        assert!(redispatched[0].error);
    }

    #[tokio::test]
    async fn test_optimistic_data_on_pending() {
        let (dispatcher, _log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("FETCH").with_resource(
                PromiseSource::future(async { Ok(json!(1)) }),
                Some(json!("optimistic")),
            ),
        );

        assert_eq!(
            forwarded.into_inner(),
            vec![Action::new("FETCH_PENDING").with_payload(json!("optimistic"))]
        );
        outcome.in_flight().expect("lifecycle branch").await.unwrap();
    }

    #[tokio::test]
    async fn test_meta_propagates_to_all_derived_actions() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("FETCH")
                .with_promise(async { Ok(json!(null)) })
                .with_meta(json!({ "request_id": 9 })),
        );

        let pending = forwarded.into_inner().remove(0);
        assert_eq!(pending.meta, Some(json!({ "request_id": 9 })));

        let settlement = outcome.in_flight().unwrap().await.unwrap();
        // Null settled value keeps the fulfilled action payload-free.
        assert_eq!(settlement.action.payload, None);
        assert_eq!(settlement.action.meta, Some(json!({ "request_id": 9 })));
        assert_eq!(log.drain(), vec![settlement.action]);
    }

    #[tokio::test]
    async fn test_custom_tokens_and_delimiter() {
        let (dispatcher, mut log) = recording_dispatcher();
        let config = Config::with_types(AsyncTypeSet::new("START", "OK", "FAIL"))
            .with_delimiter("/");
        let middleware = PromiseMiddleware::with_config(config).connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("FETCH").with_promise(async { Ok(json!(1)) }),
        );

        assert_eq!(forwarded.into_inner()[0].kind, "FETCH/START");
        let settlement = outcome.in_flight().unwrap().await.unwrap();
        assert_eq!(settlement.action.kind, "FETCH/OK");
        assert_eq!(log.drain()[0].kind, "FETCH/OK");
    }

    #[tokio::test]
    async fn test_thunk_payload_expands_lifecycle() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("LOAD")
                .with_thunk(|| MaybePromise::future(async { Ok(json!("ready")) })),
        );

        assert_eq!(forwarded.into_inner()[0].kind, "LOAD_PENDING");
        let settlement = outcome.in_flight().unwrap().await.unwrap();
        assert_eq!(settlement.value, json!("ready"));
        assert_eq!(log.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_thunk_returning_plain_value_passes_through() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);
        let forwarded: RefCell<Vec<Action>> = RefCell::new(Vec::new());

        let outcome = middleware.handle(
            |action| forwarded.borrow_mut().push(action),
            AsyncAction::new("LOAD").with_thunk(|| MaybePromise::value(json!(5))),
        );

        // No lifecycle: the payload is replaced by the thunk's value.
        assert!(matches!(outcome, DispatchOutcome::Forwarded(())));
        assert_eq!(
            forwarded.into_inner(),
            vec![Action::new("LOAD").with_payload(json!(5))]
        );
        assert!(log.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_poison_later_dispatches() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);

        let failing = middleware.handle(
            |_| (),
            AsyncAction::new("A").with_promise(async { Err(ActionError::new("down")) }),
        );
        failing.in_flight().unwrap().await.expect_err("rejected");

        let ok = middleware.handle(
            |_| (),
            AsyncAction::new("B").with_promise(async { Ok(json!(2)) }),
        );
        let settlement = ok.in_flight().unwrap().await.expect("fulfilled");
        assert_eq!(settlement.value, json!(2));

        let kinds: Vec<_> = log.drain().into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec!["A_REJECTED", "B_FULFILLED"]);
    }

    #[tokio::test]
    async fn test_independent_settlement_order() {
        let (dispatcher, mut log) = recording_dispatcher();
        let middleware = PromiseMiddleware::new().connect(dispatcher);

        let (first_tx, first_rx) = oneshot::channel::<()>();
        let (second_tx, second_rx) = oneshot::channel::<()>();

        let first = middleware.handle(
            |_| (),
            AsyncAction::new("FIRST").with_promise(async move {
                let _ = first_rx.await;
                Ok(json!(1))
            }),
        );
        let second = middleware.handle(
            |_| (),
            AsyncAction::new("SECOND").with_promise(async move {
                let _ = second_rx.await;
                Ok(json!(2))
            }),
        );

        // Settle in reverse dispatch order.
        second_tx.send(()).unwrap();
        second.in_flight().unwrap().await.unwrap();
        first_tx.send(()).unwrap();
        first.in_flight().unwrap().await.unwrap();

        let kinds: Vec<_> = log.drain().into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec!["SECOND_FULFILLED", "FIRST_FULFILLED"]);
    }
}
