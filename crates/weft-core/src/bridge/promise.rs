//! Promise - single-assignment completion handle
//!
//! A [`Promise`] is what a bridged entry point hands back to the host. Its
//! [`Resolver`] travels with the background task and is consumed by the one
//! settlement it is allowed to make.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::watch;

use crate::value::Value;

/// Prefix marking a rejection that came from a recovered panic.
pub const FAULT_PREFIX: &str = "panic: ";

/// Lifecycle of a completion handle.
///
/// `Pending -> Settling -> Fulfilled | Rejected`, the last two terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    Pending,
    Settling,
    Fulfilled(Value),
    Rejected(Rejection),
}

impl PromiseState {
    pub fn is_settled(&self) -> bool {
        matches!(self, PromiseState::Fulfilled(_) | PromiseState::Rejected(_))
    }

    fn label(&self) -> &'static str {
        match self {
            PromiseState::Pending => "pending",
            PromiseState::Settling => "settling",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        }
    }
}

/// Reason a promise was rejected.
///
/// Only the text crosses the host boundary. Fault-origin rejections are told
/// apart by [`FAULT_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Rejection for a panic intercepted at the task boundary.
    pub fn fault(detail: impl fmt::Display) -> Self {
        Self::new(format!("{FAULT_PREFIX}{detail}"))
    }

    fn abandoned() -> Self {
        Self::new("completion handle dropped before settlement")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_recovered_fault(&self) -> bool {
        self.message.starts_with(FAULT_PREFIX)
    }
}

/// Host-visible handle on a pending operation. Clones observe the same
/// settlement.
#[derive(Clone)]
pub struct Promise {
    state: watch::Receiver<PromiseState>,
}

impl Promise {
    /// A fresh pending promise and the resolver that settles it.
    pub fn pending() -> (Promise, Resolver) {
        let (tx, rx) = watch::channel(PromiseState::Pending);
        (Promise { state: rx }, Resolver { state: Some(tx) })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.state.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }

    /// Waits for the settlement.
    pub async fn settled(&self) -> Result<Value, Rejection> {
        let mut state = self.state.clone();
        let outcome = state
            .wait_for(PromiseState::is_settled)
            .await
            .map(|settled| settled.clone())
            .unwrap_or_else(|_| PromiseState::Rejected(Rejection::abandoned()));
        match outcome {
            PromiseState::Fulfilled(value) => Ok(value),
            PromiseState::Rejected(rejection) => Err(rejection),
            PromiseState::Pending | PromiseState::Settling => Err(Rejection::abandoned()),
        }
    }

    pub(crate) fn same(&self, other: &Promise) -> bool {
        self.state.same_channel(&other.state)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.state.borrow().label();
        f.debug_struct("Promise").field("state", &label).finish()
    }
}

impl IntoFuture for Promise {
    type Output = Result<Value, Rejection>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.settled().await })
    }
}

/// Write side of a [`Promise`].
///
/// Settling consumes the resolver, so a second settlement cannot be
/// expressed. Dropping it unsettled rejects the promise.
pub struct Resolver {
    state: Option<watch::Sender<PromiseState>>,
}

impl Resolver {
    /// Pending -> Settling, once the work has actually started.
    pub fn start(&self) {
        if let Some(tx) = &self.state {
            tx.send_if_modified(|state| {
                if matches!(state, PromiseState::Pending) {
                    *state = PromiseState::Settling;
                    true
                } else {
                    false
                }
            });
        }
    }

    pub fn resolve(mut self, value: Value) {
        self.settle(PromiseState::Fulfilled(value));
    }

    pub fn reject(mut self, rejection: Rejection) {
        self.settle(PromiseState::Rejected(rejection));
    }

    fn settle(&mut self, state: PromiseState) {
        if let Some(tx) = self.state.take() {
            tx.send_replace(state);
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        self.settle(PromiseState::Rejected(Rejection::abandoned()));
    }
}
