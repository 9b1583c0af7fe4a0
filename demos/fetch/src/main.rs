//! Fetch demo - promise-dispatch example
//!
//! Drives a miniature dispatch pipeline by hand:
//! 1. An async-bearing action is handled by the middleware
//! 2. The pending action reaches the reducer synchronously
//! 3. The settlement action re-enters the pipeline over the channel
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=debug cargo run -p fetch-demo
//! ```

use std::cell::RefCell;
use std::time::Duration;

use promise_dispatch::prelude::*;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Default)]
struct UserState {
    loading: bool,
    user: Option<Value>,
    error: Option<String>,
}

fn reducer(state: &mut UserState, action: &Action) {
    match action.kind.as_str() {
        "FETCH_USER_PENDING" => {
            state.loading = true;
            state.user = action.payload.clone();
        }
        "FETCH_USER_FULFILLED" => {
            state.loading = false;
            state.user = action.payload.clone();
            state.error = None;
        }
        "FETCH_USER_REJECTED" => {
            state.loading = false;
            state.error = action
                .payload
                .as_ref()
                .and_then(|p| p["message"].as_str())
                .map(String::from);
        }
        _ => {}
    }
}

async fn fetch_user(id: u32) -> Result<Value, ActionError> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    if id == 0 {
        return Err(ActionError::new("user 0 does not exist")
            .with_details(json!({ "status": 404 })));
    }
    Ok(json!({ "id": id, "name": format!("user-{id}") }))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let middleware = PromiseMiddleware::new().connect(tx);
    let state = RefCell::new(UserState::default());

    let dispatch = |action: AsyncAction| {
        middleware.handle(
            |action| {
                info!(action = %action.kind, "reducing");
                reducer(&mut state.borrow_mut(), &action);
            },
            action,
        )
    };

    for id in [7, 0] {
        let outcome = dispatch(
            AsyncAction::new("FETCH_USER")
                .with_resource(
                    PromiseSource::future(fetch_user(id)),
                    Some(json!({ "id": id, "name": "..." })),
                )
                .with_meta(json!({ "request_id": id })),
        );
        info!(loading = state.borrow().loading, "pending applied");

        let handle = outcome.in_flight().expect("async payload");
        match handle.await {
            Ok(settlement) => info!(value = %settlement.value, "settled"),
            Err(error) => info!(error = %error, "failed"),
        }

        // The settlement action re-enters the pipeline.
        if let Some(action) = rx.recv().await {
            dispatch(action.into());
        }
        info!(state = ?state.borrow(), "after settlement");
    }
}
