//! The single panic hook this crate owns.
//!
//! Every panic in the process goes through [`dispatch`]. If the panicking
//! thread is inside an interception boundary, the fault site is stashed for
//! the interceptor and nothing is printed. Otherwise the panic is about to
//! escape: the registered uncaught handler (if any) sees it first, then the
//! hook that was installed before ours.

use std::cell::{Cell, RefCell};
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

use crate::captured::{CapturedException, FaultSite};
use crate::registry;

type PreviousHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

static INSTALL: Once = Once::new();

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING_SITE: RefCell<Option<FaultSite>> = const { RefCell::new(None) };
}

/// Install the dispatching hook. Idempotent.
///
/// Does nothing when called from a thread that is already panicking, since the
/// hook cannot be swapped there; a later call will install it.
pub fn install() {
    if INSTALL.is_completed() || std::thread::panicking() {
        return;
    }
    INSTALL.call_once(|| {
        let previous: PreviousHook = panic::take_hook();
        panic::set_hook(Box::new(move |info| dispatch(info, &previous)));
        tracing::debug!("panic hook dispatcher installed");
    });
}

pub fn is_installed() -> bool {
    INSTALL.is_completed()
}

fn dispatch(info: &PanicHookInfo<'_>, previous: &PreviousHook) {
    let site = FaultSite::capture(info);

    if is_intercepting() {
        tracing::debug!(
            thread = site.thread(),
            location = site.location().unwrap_or("unknown"),
            "panic raised inside an interception boundary"
        );
        put_site(Some(site));
        return;
    }

    if let Some(handler) = registry::current() {
        handler(CapturedException::from_hook(info, site));
    }
    previous(info);
}

fn is_intercepting() -> bool {
    DEPTH.try_with(|depth| depth.get() > 0).unwrap_or(false)
}

/// Take the site stashed by the last intercepted panic on this thread.
fn take_site() -> Option<FaultSite> {
    PENDING_SITE
        .try_with(|pending| pending.try_borrow_mut().ok()?.take())
        .ok()
        .flatten()
}

// Thread-locals may already be gone during thread teardown.
fn put_site(site: Option<FaultSite>) {
    let _ = PENDING_SITE.try_with(|pending| {
        if let Ok(mut pending) = pending.try_borrow_mut() {
            *pending = site;
        }
    });
}

/// Marks the current thread as inside an interception boundary until dropped.
///
/// Each boundary starts from an empty site slot and hands the enclosing
/// boundary's slot back on drop, so it only ever sees sites raised inside it.
pub(crate) struct Boundary {
    enclosing: Option<FaultSite>,
}

impl Boundary {
    pub(crate) fn enter() -> Self {
        let enclosing = take_site();
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Boundary { enclosing }
    }

    /// The site of the last panic hooked inside this boundary.
    pub(crate) fn take_site(&self) -> Option<FaultSite> {
        take_site()
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        let _ = DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
        put_site(self.enclosing.take());
    }
}
