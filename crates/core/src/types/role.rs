//! Account roles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of the signed-in account.
///
/// Roles are stored and compared in lowercase; parsing is case-insensitive so
/// `"Recruiter"` and `"recruiter"` are the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses jobs, bookmarks them, and applies.
    Student,
    /// Posts jobs and manages applications and the company profile.
    Recruiter,
    /// Reviews reports.
    Admin,
}

impl Role {
    /// Lowercase name used for storage and for the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Recruiter => "recruiter",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role: {0}. Valid roles: student, recruiter, admin")]
pub struct RoleError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "recruiter" => Ok(Self::Recruiter),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleError(s.to_owned())),
        }
    }
}
