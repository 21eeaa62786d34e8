//! Process-wide options for safe calls.

use std::sync::Arc;

use parking_lot::RwLock;
use safely_core::{CapturedException, UncaughtExceptionHandler};

use crate::error::SafelyError;
use crate::scenario::SafeScenario;
use crate::signal::{self, SignalCallback, SignalFault};

/// The type of the callback invoked for every failed safe call.
pub type ErrorCallback = Arc<dyn Fn(&SafelyError) + Send + Sync + 'static>;

struct Options {
    log_errors: bool,
    on_error: Option<ErrorCallback>,
}

static OPTIONS: RwLock<Options> = parking_lot::const_rwlock(Options {
    log_errors: false,
    on_error: None,
});

/// Controls what happens around [`safely`](crate::safely) calls, process-wide.
///
/// ```
/// use safely::SafelyOptions;
///
/// SafelyOptions::builder()
///     .log_errors(true)
///     .on_error(|error| eprintln!("safe call failed: {}", error))
///     .install();
/// # SafelyOptions::builder().install();
/// ```
pub struct SafelyOptions;

impl SafelyOptions {
    /// Create a new builder for replacing every option at once
    pub fn builder() -> SafelyOptionsBuilder {
        SafelyOptionsBuilder::default()
    }

    /// Log failed safe calls through `tracing` at `error` level.
    pub fn set_log_errors(enabled: bool) {
        OPTIONS.write().log_errors = enabled;
    }

    pub fn log_errors() -> bool {
        OPTIONS.read().log_errors
    }

    /// Called with every error a safe call returns.
    pub fn set_on_error<F>(callback: F)
    where
        F: Fn(&SafelyError) + Send + Sync + 'static,
    {
        OPTIONS.write().on_error = Some(Arc::new(callback));
    }

    pub fn clear_on_error() {
        OPTIONS.write().on_error = None;
    }

    pub fn has_on_error() -> bool {
        OPTIONS.read().on_error.is_some()
    }

    /// Observe panics that escape every interception boundary.
    ///
    /// Shares its slot with [`safely_core::set_uncaught_exception_handler`].
    pub fn set_on_uncaught_exception<F>(callback: F)
    where
        F: Fn(CapturedException) + Send + Sync + 'static,
    {
        safely_core::set_uncaught_exception_handler(callback);
    }

    pub fn clear_on_uncaught_exception() {
        safely_core::clear_uncaught_exception_handler();
    }

    /// Observe `SIGILL`, `SIGABRT` and `SIGTRAP` right before they terminate
    /// the process. Unix only; see [`signal`](crate::signal) for the
    /// restrictions on what the callback may do.
    ///
    /// A signal handler may still be running on the callback being replaced,
    /// so replaced and cleared callbacks are never freed: every call leaks one
    /// small allocation plus whatever `callback` captures. Set it once at
    /// startup rather than in a loop.
    pub fn set_on_signals<F>(callback: F)
    where
        F: Fn(SignalFault) + Send + Sync + 'static,
    {
        signal::set_on_signals(Arc::new(callback));
    }

    pub fn clear_on_signals() {
        signal::clear_on_signals();
    }

    pub fn has_on_signals() -> bool {
        signal::signals_installed()
    }
}

/// Builder for replacing all [`SafelyOptions`] at once.
///
/// Callbacks left unset are cleared by [`install`](Self::install).
#[derive(Default)]
pub struct SafelyOptionsBuilder {
    log_errors: bool,
    on_error: Option<ErrorCallback>,
    on_uncaught_exception: Option<UncaughtExceptionHandler>,
    on_signals: Option<SignalCallback>,
}

impl SafelyOptionsBuilder {
    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SafelyError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn on_uncaught_exception<F>(mut self, callback: F) -> Self
    where
        F: Fn(CapturedException) + Send + Sync + 'static,
    {
        self.on_uncaught_exception = Some(Arc::new(callback));
        self
    }

    pub fn on_signals<F>(mut self, callback: F) -> Self
    where
        F: Fn(SignalFault) + Send + Sync + 'static,
    {
        self.on_signals = Some(Arc::new(callback));
        self
    }

    pub fn install(self) {
        {
            let mut options = OPTIONS.write();
            options.log_errors = self.log_errors;
            options.on_error = self.on_error;
        }

        match self.on_uncaught_exception {
            Some(handler) => {
                safely_core::set_uncaught_exception_handler(move |captured| handler(captured))
            }
            None => safely_core::clear_uncaught_exception_handler(),
        }

        match self.on_signals {
            Some(callback) => signal::set_on_signals(callback),
            None => signal::clear_on_signals(),
        }
    }
}

/// Apply the options to a failed safe call.
pub(crate) fn report(scenario: &SafeScenario, error: &SafelyError) {
    let (log_errors, on_error) = {
        let options = OPTIONS.read();
        (options.log_errors, options.on_error.clone())
    };

    if let Some(on_error) = on_error {
        on_error(error);
    }
    if log_errors {
        tracing::error!(
            scenario = %scenario,
            "safe call failed: {:#}",
            error
        );
    }
}
