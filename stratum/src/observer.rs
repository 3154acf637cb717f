//! Failure observers: diagnostics side channel for failed resolutions.
//!
//! An observer sees every failing `resolve_one` call. It cannot change the
//! outcome; a panicking observer is contained and logged.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::ResolveError;

type Callback = dyn Fn(&ResolveError) + Send + Sync;

/// Callback invoked with the failure condition.
#[derive(Clone)]
pub struct FailureObserver(Arc<Callback>);

static DEFAULT_OBSERVER: RwLock<Option<FailureObserver>> = RwLock::new(None);

impl FailureObserver {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ResolveError) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Invoke the callback, discarding any panic it raises.
    pub fn notify(&self, err: &ResolveError) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.0)(err)));
        if let Err(payload) = outcome {
            let failure = ObserverFailure::from_panic(payload.as_ref());
            warn!(%failure, condition = %err, "failure observer panicked");
        }
    }
}

impl Default for FailureObserver {
    /// The process-wide observer if one is installed, otherwise a no-op.
    fn default() -> Self {
        DEFAULT_OBSERVER.read().clone().unwrap_or_else(Self::noop)
    }
}

impl fmt::Debug for FailureObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FailureObserver")
    }
}

/// Set the observer used by resolvers built without an explicit one.
///
/// Resolvers capture the observer at construction; installing later does not
/// affect them.
pub fn install_default(observer: FailureObserver) {
    *DEFAULT_OBSERVER.write() = Some(observer);
}

/// Drop the installed process-wide observer.
pub fn clear_default() {
    *DEFAULT_OBSERVER.write() = None;
}

/// Panic raised inside an observer, reduced to its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub message: String,
}

impl ObserverFailure {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self { message }
    }
}

impl fmt::Display for ObserverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer failure: {}", self.message)
    }
}

impl std::error::Error for ObserverFailure {}
