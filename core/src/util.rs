//! Thin wrappers around the unwinding primitives.

use std::any::Any;
use std::boxed::Box;
use std::panic::AssertUnwindSafe;

/// The payload a panic carries while it unwinds.
pub type Payload = Box<dyn Any + Send + 'static>;

/// Run `f`, turning a panic into `Err(payload)`.
///
/// Unlike [`std::panic::catch_unwind`] this accepts any `FnOnce`; callers that
/// keep using state touched by a panicking closure do so at their own risk.
pub fn catch_unwind<R>(f: impl FnOnce() -> R) -> Result<R, Payload> {
    std::panic::catch_unwind(AssertUnwindSafe(f))
}

#[cold]
pub fn resume_unwind(payload: Payload) -> ! {
    std::panic::resume_unwind(payload)
}

/// The panic message, when the payload is one of the two types `panic!` uses.
pub(crate) fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some(message)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_from_str_and_string() {
        let payload: Payload = Box::new("static");
        assert_eq!(payload_message(&*payload), Some("static"));

        let payload: Payload = Box::new(format!("formatted {}", 7));
        assert_eq!(payload_message(&*payload), Some("formatted 7"));

        let payload: Payload = Box::new(42u32);
        assert_eq!(payload_message(&*payload), None);
    }
}
