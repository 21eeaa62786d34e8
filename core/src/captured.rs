//! The value a caught panic turns into.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::PanicHookInfo;
use std::thread;

use crate::util::{self, Payload};

/// Where a panic was raised.
///
/// Filled in by the panic hook the crate installs. If another hook replaced it,
/// captured exceptions come without a site.
#[derive(Debug)]
pub struct FaultSite {
    thread: String,
    location: Option<String>,
    backtrace: Backtrace,
    message: Option<String>,
}

impl FaultSite {
    pub(crate) fn capture(info: &PanicHookInfo<'_>) -> Self {
        let thread = thread::current()
            .name()
            .unwrap_or("<unnamed>")
            .to_string();
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
        Self {
            thread,
            location,
            backtrace: Backtrace::capture(),
            message: util::payload_message(info.payload()).map(str::to_string),
        }
    }

    /// Whether this site belongs to the panic that unwound with `payload`.
    ///
    /// A site recorded for a panic that was swallowed further down carries
    /// another message than the payload that finally reached the boundary.
    pub(crate) fn raised(&self, payload: &(dyn Any + Send)) -> bool {
        self.message.as_deref() == util::payload_message(payload)
    }

    /// Name of the thread that panicked.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// `file:line:column` of the `panic!` call.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Backtrace taken at the fault point.
    ///
    /// Only resolved when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// A panic that was intercepted instead of unwinding further.
///
/// The descriptive part (`name`, `reason`, `site`) is always available. The
/// native payload is kept when the panic was caught by an interception
/// boundary, so it can be downcast or re-raised with [`resume`](Self::resume).
/// Handlers for uncaught panics receive no payload; the runtime still owns it.
pub struct CapturedException {
    name: &'static str,
    reason: Option<String>,
    site: Option<FaultSite>,
    payload: Option<Payload>,
}

impl CapturedException {
    pub(crate) fn from_payload(payload: Payload, site: Option<FaultSite>) -> Self {
        let reason = util::payload_message(&*payload).map(str::to_string);
        Self {
            name: kind_name(reason.is_some()),
            reason,
            site,
            payload: Some(payload),
        }
    }

    pub(crate) fn from_hook(info: &PanicHookInfo<'_>, site: FaultSite) -> Self {
        let reason = util::payload_message(info.payload()).map(str::to_string);
        Self {
            name: kind_name(reason.is_some()),
            reason,
            site: Some(site),
            payload: None,
        }
    }

    /// Short kind of fault: `"panic"` for message panics, `"panic_any"` otherwise.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The panic message, if the payload was a string.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn site(&self) -> Option<&FaultSite> {
        self.site.as_ref()
    }

    /// The native panic payload.
    pub fn payload(&self) -> Option<&(dyn Any + Send)> {
        self.payload.as_deref()
    }

    /// Downcast the payload, e.g. one passed to [`std::panic::panic_any`].
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload()?.downcast_ref::<T>()
    }

    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }

    /// Continue unwinding with the original payload.
    ///
    /// Without a payload, the reason is raised as a new panic message.
    pub fn resume(self) -> ! {
        match self.payload {
            Some(payload) => util::resume_unwind(payload),
            None => util::resume_unwind(Box::new(
                self.reason.unwrap_or_else(|| self.name.to_string()),
            )),
        }
    }
}

fn kind_name(has_message: bool) -> &'static str {
    if has_message {
        "panic"
    } else {
        "panic_any"
    }
}

impl fmt::Debug for CapturedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedException")
            .field("name", &self.name)
            .field("reason", &self.reason)
            .field("site", &self.site)
            .field("payload", &self.payload.as_ref().map(|_| ".."))
            .finish()
    }
}

/// `name: reason`. The alternate form (`{:#}`) appends thread, location and,
/// when captured, the backtrace.
impl fmt::Display for CapturedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.name,
            self.reason.as_deref().unwrap_or("unknown")
        )?;
        if !f.alternate() {
            return Ok(());
        }
        if let Some(site) = &self.site {
            write!(f, "\n  thread: {}", site.thread)?;
            if let Some(location) = &site.location {
                write!(f, "\n  location: {}", location)?;
            }
            if site.backtrace.status() == BacktraceStatus::Captured {
                write!(f, "\n  call stack:\n{}", site.backtrace)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CapturedException {}
