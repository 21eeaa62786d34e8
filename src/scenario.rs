use std::borrow::Cow;
use std::fmt;

/// Why a piece of code runs under [`safely`](crate::safely), and who decided
/// it had to.
///
/// Scenarios are meant to be declared once and reused, so every guarded call
/// site points at a documented reason:
///
/// ```
/// use safely::SafeScenario;
///
/// struct Scenarios;
///
/// impl Scenarios {
///     const NULL_SETTINGS: SafeScenario = SafeScenario::from_static(
///         "Guard against null values written to the settings store",
///         "@settings-team",
///     );
/// }
///
/// assert_eq!(
///     Scenarios::NULL_SETTINGS.to_string(),
///     "Guard against null values written to the settings store implemented by @settings-team"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeScenario {
    description: Cow<'static, str>,
    implementor: Cow<'static, str>,
}

impl SafeScenario {
    pub fn new(
        description: impl Into<Cow<'static, str>>,
        implementor: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            description: description.into(),
            implementor: implementor.into(),
        }
    }

    pub const fn from_static(description: &'static str, implementor: &'static str) -> Self {
        Self {
            description: Cow::Borrowed(description),
            implementor: Cow::Borrowed(implementor),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn implementor(&self) -> &str {
        &self.implementor
    }
}

impl fmt::Display for SafeScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} implemented by {}", self.description, self.implementor)
    }
}
