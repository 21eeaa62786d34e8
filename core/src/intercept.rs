use crate::captured::CapturedException;
use crate::hook::{self, Boundary};
use crate::util;

/// Run `work` on the current thread and return its value, or the panic it
/// raised as a [`CapturedException`].
///
/// The interception boundary covers exactly the call to `work`: panics in
/// anything it calls are caught here, panics raised after it returns are not.
/// Calls nest, and the innermost boundary captures.
pub fn intercept<R>(work: impl FnOnce() -> R) -> Result<R, CapturedException> {
    hook::install();
    let (outcome, site) = {
        let boundary = Boundary::enter();
        let outcome = util::catch_unwind(work);
        (outcome, boundary.take_site())
    };
    outcome.map_err(|payload| {
        let site = site.filter(|site| site.raised(&*payload));
        let captured = CapturedException::from_payload(payload, site);
        tracing::debug!(fault = %captured, "intercepted panic");
        captured
    })
}

/// Run `work` and report whether it panicked.
///
/// ```
/// let captured = safely_core::try_intercept(|| panic!("boom"));
/// assert_eq!(captured.unwrap().reason(), Some("boom"));
///
/// assert!(safely_core::try_intercept(|| {}).is_none());
/// ```
pub fn try_intercept(work: impl FnOnce()) -> Option<CapturedException> {
    intercept(work).err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{spawn_panic, LogBuffer, GLOBAL};
    use crate::{clear_uncaught_exception_handler, set_uncaught_exception_handler};
    use parking_lot::Mutex;
    use std::panic::panic_any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn completes_without_fault() {
        let mut effects = 0;
        let captured = try_intercept(|| effects += 1);
        assert!(captured.is_none());
        assert_eq!(effects, 1);
    }

    #[test]
    fn captures_reason() {
        let captured = try_intercept(|| panic!("boom")).expect("panic should be captured");
        assert_eq!(captured.reason(), Some("boom"));
        assert_eq!(captured.name(), "panic");
    }

    #[test]
    fn captures_formatted_reason() {
        let code = 7;
        let captured = try_intercept(|| panic!("failed with {}", code)).unwrap();
        assert_eq!(captured.reason(), Some("failed with 7"));
    }

    #[test]
    fn short_circuits_after_fault() {
        let mut before = false;
        let mut after = false;
        let captured = try_intercept(|| {
            before = true;
            if before {
                panic!("midway");
            }
            after = true;
        });
        assert!(captured.is_some());
        assert!(before);
        assert!(!after);
    }

    #[test]
    fn captures_transitive_panics() {
        fn inner(values: &[u8]) -> u8 {
            values[3]
        }
        fn outer() {
            inner(&[1, 2]);
        }

        let captured = try_intercept(outer).unwrap();
        assert!(captured.reason().unwrap().contains("index out of bounds"));
    }

    #[test]
    fn records_fault_site() {
        let captured = try_intercept(|| panic!("here")).unwrap();
        let site = captured.site().expect("dispatcher records the site");
        assert!(site.location().unwrap().contains("intercept.rs"));
    }

    #[test]
    fn swallowed_panic_does_not_lend_its_site() {
        let captured = try_intercept(|| {
            let _ = std::panic::catch_unwind(|| panic!("swallowed"));
            std::panic::resume_unwind(Box::new("rethrown"));
        })
        .unwrap();
        assert_eq!(captured.reason(), Some("rethrown"));
        assert!(captured.site().is_none());
    }

    #[test]
    fn enclosing_site_survives_nested_boundary() {
        let captured = try_intercept(|| {
            let payload = std::panic::catch_unwind(|| panic!("first")).unwrap_err();
            assert!(try_intercept(|| {}).is_none());
            std::panic::resume_unwind(payload);
        })
        .unwrap();
        assert_eq!(captured.reason(), Some("first"));
        assert!(captured.site().is_some());
    }

    #[test]
    fn returns_value() {
        assert_eq!(intercept(|| 40 + 2).unwrap(), 42);

        let result: Result<u32, _> = intercept(|| panic!("no value"));
        assert_eq!(result.unwrap_err().reason(), Some("no value"));
    }

    #[test]
    fn keeps_opaque_payload() {
        struct Fault {
            code: i32,
        }

        let captured = try_intercept(|| panic_any(Fault { code: -3 })).unwrap();
        assert_eq!(captured.name(), "panic_any");
        assert_eq!(captured.downcast_ref::<Fault>().map(|f| f.code), Some(-3));
    }

    #[test]
    fn resume_rethrows_to_outer_boundary() {
        let outer = try_intercept(|| {
            let inner = try_intercept(|| panic!("again")).unwrap();
            inner.resume();
        })
        .unwrap();
        assert_eq!(outer.reason(), Some("again"));
    }

    #[test]
    fn nested_boundaries_capture_innermost() {
        let mut inner_reason = None;
        let outer = try_intercept(|| {
            inner_reason = try_intercept(|| panic!("inner"))
                .and_then(|c| c.reason().map(str::to_string));
        });
        assert!(outer.is_none());
        assert_eq!(inner_reason.as_deref(), Some("inner"));
    }

    #[test]
    fn fault_after_return_is_not_captured() {
        let _guard = GLOBAL.lock();
        let captured = try_intercept(|| {});
        let later = std::panic::catch_unwind(|| panic!("later"));
        assert!(later.is_err());
        assert!(captured.is_none());
    }

    #[test]
    fn concurrent_calls_are_independent() {
        let faults = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let faults = faults.clone();
                std::thread::spawn(move || {
                    let captured = try_intercept(|| {
                        if i % 2 == 0 {
                            panic!("even {}", i);
                        }
                    });
                    if let Some(captured) = captured {
                        assert_eq!(captured.reason(), Some(format!("even {}", i).as_str()));
                        faults.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(faults.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn intercepted_panic_skips_uncaught_handler() {
        let _guard = GLOBAL.lock();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        set_uncaught_exception_handler(move |captured: CapturedException| {
            sink.lock().push(captured.to_string());
        });

        assert!(try_intercept(|| panic!("caught")).is_some());
        assert!(calls.lock().is_empty());

        assert!(spawn_panic("escaped").is_err());
        clear_uncaught_exception_handler();

        assert_eq!(*calls.lock(), vec!["panic: escaped".to_string()]);
    }

    #[test]
    fn logs_intercepted_panic() {
        let logs = LogBuffer::default();
        tracing::subscriber::with_default(logs.subscriber(), || {
            assert!(try_intercept(|| panic!("quiet")).is_some());
        });
        let logs = logs.contents();
        assert!(logs.contains("panic raised inside an interception boundary"));
        assert!(logs.contains("intercepted panic"));
        assert!(logs.contains("panic: quiet"));
    }
}
