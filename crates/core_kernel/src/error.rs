//! Error taxonomy shared across the system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classes every domain error maps onto
///
/// Boundaries (the HTTP layer, application services) translate errors by kind
/// rather than by concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist
    NotFound,
    /// Input failed validation
    InvalidArgument,
    /// The operation is not allowed in the current state
    InvalidOperation,
    /// A concurrent modification was detected
    Conflict,
    /// A collaborator could not be reached
    Unavailable,
    /// Anything else
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidOperation => "invalid_operation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
