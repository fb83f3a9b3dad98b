//! Email addresses

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use validator::ValidateEmail;

use crate::error::PartyError;

/// A syntactically valid email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Parses an address, trimming surrounding whitespace
    pub fn parse(value: &str) -> Result<Self, PartyError> {
        let trimmed = value.trim();
        if !trimmed.validate_email() {
            return Err(PartyError::InvalidEmail(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Email {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Email::parse(&s).map_err(serde::de::Error::custom)
    }
}
