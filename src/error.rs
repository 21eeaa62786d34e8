//! Error types for safe calls

use std::error::Error as StdError;

use safely_core::CapturedException;

/// Boxed error returned by a guarded closure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why a safe call failed.
#[derive(Debug, thiserror::Error)]
pub enum SafelyError {
    /// The closure panicked and the panic was intercepted.
    #[error(transparent)]
    Exception(#[from] CapturedException),
    /// The closure returned an error.
    #[error("{0}")]
    Failed(BoxError),
    /// The closure bailed out through [`safe_assert!`](crate::safe_assert).
    #[error(transparent)]
    Assertion(#[from] AssertionFault),
}

impl SafelyError {
    /// Sort a closure's error into `Assertion` or `Failed`.
    pub(crate) fn from_returned(error: BoxError) -> Self {
        match error.downcast::<AssertionFault>() {
            Ok(assertion) => SafelyError::Assertion(*assertion),
            Err(error) => SafelyError::Failed(error),
        }
    }

    pub fn as_exception(&self) -> Option<&CapturedException> {
        match self {
            SafelyError::Exception(captured) => Some(captured),
            _ => None,
        }
    }
}

/// A failed check inside a guarded closure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("AssertionError: {message} - Occurred at line {line} in {file}")]
pub struct AssertionFault {
    /// The checked condition, as written.
    pub prefix: String,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}

impl AssertionFault {
    pub fn new(
        prefix: impl Into<String>,
        message: impl Into<String>,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            message: message.into(),
            file,
            line,
        }
    }
}

/// Return an [`AssertionFault`] from the enclosing closure when `cond` is false.
///
/// The closure's error type must accept an `AssertionFault` through `From`,
/// as [`BoxError`] does.
///
/// ```
/// use safely::{protect, safe_assert, BoxError, SafelyError};
///
/// let result = protect(|| -> Result<(), BoxError> {
///     let retries = 0;
///     safe_assert!(retries > 0, "expected at least one retry, got {}", retries);
///     Ok(())
/// });
/// assert!(matches!(result, Err(SafelyError::Assertion(_))));
/// ```
#[macro_export]
macro_rules! safe_assert {
    ($cond:expr $(,)?) => {
        $crate::safe_assert!($cond, "condition failed")
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return ::core::result::Result::Err(
                $crate::AssertionFault::new(
                    stringify!($cond),
                    format!($($arg)+),
                    file!(),
                    line!(),
                )
                .into(),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_assertion_is_recognised() {
        let error: BoxError = Box::new(AssertionFault::new("x > 0", "x was 0", "lib.rs", 3));
        match SafelyError::from_returned(error) {
            SafelyError::Assertion(fault) => {
                assert_eq!(fault.prefix, "x > 0");
                assert_eq!(
                    fault.to_string(),
                    "AssertionError: x was 0 - Occurred at line 3 in lib.rs"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn other_errors_stay_failed() {
        let error: BoxError = "disk full".into();
        let error = SafelyError::from_returned(error);
        assert!(matches!(error, SafelyError::Failed(_)));
        assert_eq!(error.to_string(), "disk full");
        assert!(error.as_exception().is_none());
    }
}
