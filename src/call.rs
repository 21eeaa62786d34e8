use safely_core::intercept;

use crate::error::{BoxError, SafelyError};
use crate::options;
use crate::scenario::SafeScenario;

/// Call `closure` with `context`, capturing both the errors it returns and the
/// panics it raises.
///
/// Returns `None` on success. On failure the error is passed to the
/// [`on_error`](crate::SafelyOptions::set_on_error) callback, logged if
/// [`log_errors`](crate::SafelyOptions::set_log_errors) is on, and returned.
/// The closure runs on the calling thread.
///
/// ```
/// use safely::{safely, SafeScenario, SafelyError};
///
/// const PARSE_PORT: SafeScenario =
///     SafeScenario::from_static("Guard against a malformed port override", "@infra");
///
/// let error = safely(&PARSE_PORT, "80a", |raw| {
///     let _port: u16 = raw.parse()?;
///     Ok::<_, std::num::ParseIntError>(())
/// });
/// assert!(matches!(error, Some(SafelyError::Failed(_))));
///
/// let error = safely(&PARSE_PORT, (), |_| -> Result<(), std::io::Error> {
///     panic!("config store vanished")
/// });
/// assert_eq!(
///     error.unwrap().as_exception().and_then(|e| e.reason()),
///     Some("config store vanished")
/// );
/// ```
pub fn safely<T, E, F>(scenario: &SafeScenario, context: T, closure: F) -> Option<SafelyError>
where
    F: FnOnce(T) -> Result<(), E>,
    E: Into<BoxError>,
{
    let error = protect(|| closure(context)).err()?;
    options::report(scenario, &error);
    Some(error)
}

/// Run `closure` inside an interception boundary and fold a panic into the
/// error path, so callers can keep using `?`.
///
/// Unlike [`safely`], no options are applied.
pub fn protect<R, E, F>(closure: F) -> Result<R, SafelyError>
where
    F: FnOnce() -> Result<R, E>,
    E: Into<BoxError>,
{
    match intercept(closure) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(SafelyError::from_returned(error.into())),
        Err(captured) => Err(SafelyError::Exception(captured)),
    }
}
