//! # safely
//!
//! Guard risky calls and get their failures back as values.
//!
//! [`safely`] runs a closure under a named [`SafeScenario`] and returns
//! whatever went wrong: an error it returned, a panic it raised, or a failed
//! [`safe_assert!`]. Process-wide [`SafelyOptions`] decide what else happens on
//! failure (a callback, a `tracing` event) and let the process observe panics
//! and fatal signals that nothing caught.
//!
//! The panic plumbing lives in [`safely_core`] and is re-exported here.
//!
//! ```
//! use safely::{try_intercept, SafeScenario, safely, BoxError};
//!
//! let captured = try_intercept(|| panic!("boom")).unwrap();
//! assert_eq!(captured.reason(), Some("boom"));
//!
//! let scenario = SafeScenario::new("Vendor SDK throws on empty input", "@mobile");
//! let error = safely(&scenario, Vec::<u8>::new(), |input| -> Result<(), BoxError> {
//!     let _first = input[0];
//!     Ok(())
//! });
//! assert!(error.is_some());
//! ```

#![allow(clippy::uninlined_format_args)]

mod call;
mod error;
mod options;
mod scenario;
pub mod signal;

pub use call::{protect, safely};
pub use error::{AssertionFault, BoxError, SafelyError};
pub use options::{ErrorCallback, SafelyOptions, SafelyOptionsBuilder};
pub use scenario::SafeScenario;
pub use signal::{SignalCallback, SignalFault};

pub use safely_core::{
    clear_uncaught_exception_handler, has_uncaught_exception_handler, init, intercept,
    set_uncaught_exception_handler, try_intercept, CapturedException, FaultSite,
    UncaughtExceptionHandler,
};

pub mod prelude {
    //! A group of often used items.
    pub use crate::{
        protect, safe_assert, safely, try_intercept, BoxError, SafeScenario, SafelyError,
        SafelyOptions,
    };
}
