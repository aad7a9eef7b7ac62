//! Placeholder credential shown after a simulated password reset.

use std::fmt;

/// Simulated credential value revealed when the password-reset task
/// completes.
///
/// The value is static display data. `Debug` output is redacted so that it
/// does not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaceholderCredential(String);

impl PlaceholderCredential {
    /// Default value used when no credential is configured.
    pub const DEFAULT_VALUE: &'static str = "TempPass123!";

    /// Wraps a credential value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value for explicit display.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns a mask of the same length as the value.
    #[must_use]
    pub fn masked(&self) -> String {
        "*".repeat(self.0.chars().count())
    }
}

impl Default for PlaceholderCredential {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VALUE)
    }
}

impl fmt::Debug for PlaceholderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaceholderCredential(<redacted>)")
    }
}
