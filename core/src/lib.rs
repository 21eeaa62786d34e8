//! # Panics as values
//!
//! `safely-core` is the small piece of `safely` that talks to the unwinding
//! machinery directly. It does two things:
//!
//! - [`try_intercept`] / [`intercept`] run a closure and hand back any panic it
//!   raised as a [`CapturedException`] instead of letting it unwind further.
//! - [`set_uncaught_exception_handler`] / [`clear_uncaught_exception_handler`]
//!   manage a single process-wide callback that observes panics escaping every
//!   interception boundary, right before the default hook runs and the thread
//!   (or process) goes down.
//!
//! Both rely on one panic hook installed by [`init`], which is called lazily by
//! the functions above. Installing another hook with [`std::panic::set_hook`]
//! afterwards disconnects the uncaught handler and the fault-site details.

#![allow(clippy::uninlined_format_args)]

mod captured;
mod hook;
mod intercept;
mod registry;
pub mod util;

pub use captured::{CapturedException, FaultSite};
pub use intercept::{intercept, try_intercept};
pub use registry::{
    clear_uncaught_exception_handler, has_uncaught_exception_handler,
    set_uncaught_exception_handler, UncaughtExceptionHandler,
};

/// Install the panic hook dispatcher now, instead of on first use.
///
/// Call it early in `main` so that panics raised before the first
/// interception are already routed through the dispatcher.
pub fn init() {
    hook::install();
}

/// Whether the dispatcher has been installed in this process.
pub fn is_initialized() -> bool {
    hook::is_installed()
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Serialises tests that install handlers or let panics escape.
    pub static GLOBAL: Mutex<()> = parking_lot::const_mutex(());

    /// Panic on a fresh thread, outside any interception boundary.
    pub fn spawn_panic(reason: &'static str) -> std::thread::Result<()> {
        std::thread::spawn(move || panic!("{}", reason)).join()
    }

    /// In-memory sink for `tracing-subscriber` output.
    #[derive(Clone, Default)]
    pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }

        pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            let sink = self.clone();
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_ansi(false)
                .with_writer(move || sink.clone())
                .finish()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
