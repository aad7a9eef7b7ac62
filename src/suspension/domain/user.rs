//! User records as seen by the suspension core.

use super::{ParseUserStatusError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status shown for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    /// Account is in normal use.
    Active,
    /// Account has been offboarded.
    Suspended,
}

impl UserStatus {
    /// Returns the display and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UserStatus {
    type Error = ParseUserStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseUserStatusError(value.to_owned())),
        }
    }
}

/// User record owned by the user directory.
///
/// The suspension core reads `id`, `name` and `status`, and only ever
/// computes a new `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    id: UserId,
    name: String,
    email: String,
    department: String,
    status: UserStatus,
}

impl UserRecord {
    /// Creates a user record.
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        status: UserStatus,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            department: department.into(),
            status,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the department.
    #[must_use]
    pub fn department(&self) -> &str {
        &self.department
    }

    /// Returns the account status.
    #[must_use]
    pub const fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns a copy of this record with `status` replaced.
    #[must_use]
    pub fn with_status(&self, status: UserStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Returns whether the name, email or department contains `term`,
    /// ignoring case. An empty term matches every user.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        [&self.name, &self.email, &self.department]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
