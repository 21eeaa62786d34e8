//! Process-wide slot for the uncaught panic handler.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::captured::CapturedException;
use crate::hook;

/// The type of the uncaught exception handler.
pub type UncaughtExceptionHandler = Arc<dyn Fn(CapturedException) + Send + Sync + 'static>;

static HANDLER: RwLock<Option<UncaughtExceptionHandler>> = parking_lot::const_rwlock(None);

/// Install `handler` as the process-wide uncaught panic callback, replacing
/// any previous one.
///
/// The handler runs on the panicking thread, from the panic hook, whenever a
/// panic is raised outside every interception boundary. Unwinding (and, on the
/// main thread, process termination) continues once it returns. A handler that
/// panics itself aborts the process.
pub fn set_uncaught_exception_handler<F>(handler: F)
where
    F: Fn(CapturedException) + Send + Sync + 'static,
{
    hook::install();
    let previous = HANDLER.write().replace(Arc::new(handler));
    tracing::trace!(replaced = previous.is_some(), "uncaught exception handler set");
}

/// Remove the uncaught panic callback, if any.
pub fn clear_uncaught_exception_handler() {
    let previous = HANDLER.write().take();
    if previous.is_some() {
        tracing::trace!("uncaught exception handler cleared");
    }
}

pub fn has_uncaught_exception_handler() -> bool {
    HANDLER.read().is_some()
}

/// The installed handler, cloned out so the lock is not held while it runs.
pub(crate) fn current() -> Option<UncaughtExceptionHandler> {
    HANDLER.read().clone()
}
