//! Tax jurisdictions
//!
//! Province codes are parsed explicitly; there is no implicit conversion from
//! strings so a malformed code is caught where it enters the system.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors related to jurisdiction codes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid province code: '{0}'")]
    InvalidProvinceCode(String),
}

const PROVINCE_CODES: [&str; 13] = [
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

/// A Canadian province or territory code (e.g. "ON")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProvinceCode([u8; 2]);

impl ProvinceCode {
    /// Parses a province code, case-insensitive and ignoring surrounding whitespace
    pub fn parse(code: &str) -> Result<Self, RegionError> {
        let normalized = code.trim().to_ascii_uppercase();
        if !PROVINCE_CODES.contains(&normalized.as_str()) {
            return Err(RegionError::InvalidProvinceCode(code.to_string()));
        }
        let bytes = normalized.as_bytes();
        Ok(Self([bytes[0], bytes[1]]))
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        // Only ASCII codes from PROVINCE_CODES are ever stored
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// All known province and territory codes
    pub fn all() -> Vec<ProvinceCode> {
        PROVINCE_CODES
            .iter()
            .filter_map(|c| ProvinceCode::parse(c).ok())
            .collect()
    }
}

impl fmt::Display for ProvinceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProvinceCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProvinceCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ProvinceCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let code = ProvinceCode::parse(" on ").unwrap();
        assert_eq!(code.as_str(), "ON");
        assert_eq!(code.to_string(), "ON");
    }

    #[test]
    fn test_parse_rejects_unknown_codes() {
        assert!(ProvinceCode::parse("XX").is_err());
        assert!(ProvinceCode::parse("ONT").is_err());
        assert!(ProvinceCode::parse("").is_err());
    }

    #[test]
    fn test_all_codes() {
        assert_eq!(ProvinceCode::all().len(), 13);
    }
}
