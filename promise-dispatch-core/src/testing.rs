//! Test utilities for promise-dispatch pipelines
//!
//! [`recording_dispatcher`] produces a [`Dispatcher`] that records every
//! redispatched action in order, paired with a [`DispatchLog`] to read them
//! back:
//!
//! ```ignore
//! let (dispatcher, mut log) = recording_dispatcher();
//! let middleware = PromiseMiddleware::new().connect(dispatcher);
//!
//! let outcome = middleware.handle(|a| a, action);
//! outcome.in_flight().unwrap().await?;
//!
//! assert_eq!(log.drain()[0].kind, "FETCH_FULFILLED");
//! ```

use tokio::sync::mpsc;

use crate::action::Action;
use crate::middleware::Dispatcher;

/// A [`Dispatcher`] that records every action it receives.
#[derive(Debug, Clone)]
pub struct RecordingDispatcher {
    tx: mpsc::UnboundedSender<Action>,
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, action: Action) {
        let _ = self.tx.send(action);
    }
}

/// Reads back actions recorded by a [`RecordingDispatcher`], in dispatch
/// order.
#[derive(Debug)]
pub struct DispatchLog {
    rx: mpsc::UnboundedReceiver<Action>,
}

impl DispatchLog {
    /// Take every action recorded so far.
    pub fn drain(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Wait for the next recorded action.
    ///
    /// Returns `None` once every connected dispatcher has been dropped.
    pub async fn recv(&mut self) -> Option<Action> {
        self.rx.recv().await
    }
}

/// Create a connected recorder/reader pair.
pub fn recording_dispatcher() -> (RecordingDispatcher, DispatchLog) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecordingDispatcher { tx }, DispatchLog { rx })
}
