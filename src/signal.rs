//! Last-chance observation of fatal signals.
//!
//! Setting a callback installs a handler for `SIGILL`, `SIGABRT` and `SIGTRAP`.
//! When one arrives the callback sees a [`SignalFault`], then the default
//! disposition is restored and the signal raised again, so the process still
//! dies the way it would have.
//!
//! The callback runs in signal context. Keep it to async-signal-safe work:
//! no locks, no allocation, ideally a single `write(2)`.

use std::fmt;
use std::sync::Arc;

/// The type of the signal callback.
pub type SignalCallback = Arc<dyn Fn(SignalFault) + Send + Sync + 'static>;

/// A fatal signal delivered to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalFault {
    pub signal: i32,
}

impl SignalFault {
    pub fn new(signal: i32) -> Self {
        Self { signal }
    }

    /// Name of an observed signal (`SIGILL`, `SIGABRT`, `SIGTRAP`), `"unknown"`
    /// for anything else.
    pub fn name(&self) -> &'static str {
        #[cfg(all(unix, feature = "signals"))]
        {
            imp::signal_name(self.signal)
        }
        #[cfg(not(all(unix, feature = "signals")))]
        {
            "unknown"
        }
    }
}

impl fmt::Display for SignalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalError: {} ({})", self.signal, self.name())
    }
}

impl std::error::Error for SignalFault {}

#[cfg(all(unix, feature = "signals"))]
pub(crate) use imp::{clear_on_signals, set_on_signals, signals_installed};

#[cfg(not(all(unix, feature = "signals")))]
pub(crate) fn set_on_signals(_callback: SignalCallback) {
    tracing::warn!("signal observation is not available on this platform");
}

#[cfg(not(all(unix, feature = "signals")))]
pub(crate) fn clear_on_signals() {}

#[cfg(not(all(unix, feature = "signals")))]
pub(crate) fn signals_installed() -> bool {
    false
}

#[cfg(all(unix, feature = "signals"))]
mod imp {
    use std::ptr;
    use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

    use parking_lot::Mutex;

    use super::{SignalCallback, SignalFault};

    pub(super) const OBSERVED: [libc::c_int; 3] = [libc::SIGILL, libc::SIGABRT, libc::SIGTRAP];

    // Replaced callbacks are leaked, a handler may still be running on them.
    static CALLBACK: AtomicPtr<SignalCallback> = AtomicPtr::new(ptr::null_mut());
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    // Serialises set and clear. The handler itself only reads `CALLBACK`.
    static SET_LOCK: Mutex<()> = parking_lot::const_mutex(());

    pub(crate) fn set_on_signals(callback: SignalCallback) {
        let _lock = SET_LOCK.lock();
        let fresh = Box::into_raw(Box::new(callback));
        let _ = CALLBACK.swap(fresh, Ordering::AcqRel);
        let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        for signal in OBSERVED {
            // SAFETY: `on_signal` matches the handler ABI and only reads an
            // atomic before re-raising.
            unsafe {
                libc::signal(signal, handler);
            }
        }
        INSTALLED.store(true, Ordering::Release);
        tracing::trace!(signals = ?OBSERVED, "signal handlers installed");
    }

    pub(crate) fn clear_on_signals() {
        let _lock = SET_LOCK.lock();
        if !INSTALLED.swap(false, Ordering::AcqRel) {
            return;
        }
        for signal in OBSERVED {
            // SAFETY: restoring the default disposition has no preconditions.
            unsafe {
                libc::signal(signal, libc::SIG_DFL);
            }
        }
        let _ = CALLBACK.swap(ptr::null_mut(), Ordering::AcqRel);
        tracing::trace!("signal handlers cleared");
    }

    pub(crate) fn signals_installed() -> bool {
        INSTALLED.load(Ordering::Acquire)
    }

    extern "C" fn on_signal(signal: libc::c_int) {
        let callback = CALLBACK.load(Ordering::Acquire);
        if !callback.is_null() {
            // SAFETY: published callbacks are never freed.
            let callback = unsafe { &*callback };
            callback(SignalFault::new(signal));
        }
        // SAFETY: both calls are async-signal-safe.
        unsafe {
            libc::signal(signal, libc::SIG_DFL);
            libc::raise(signal);
        }
    }

    pub(super) fn signal_name(signal: i32) -> &'static str {
        match signal {
            libc::SIGILL => "SIGILL",
            libc::SIGABRT => "SIGABRT",
            libc::SIGTRAP => "SIGTRAP",
            _ => "unknown",
        }
    }

}
