//! Provinces and territories

use serde::{Deserialize, Serialize};

use core_kernel::ProvinceCode;

/// A tax jurisdiction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub code: ProvinceCode,
    pub name: String,
    /// Whether federal and provincial tax are collected as a single HST
    pub is_hst: bool,
}

impl Province {
    pub fn new(code: ProvinceCode, name: impl Into<String>, is_hst: bool) -> Self {
        Self {
            code,
            name: name.into(),
            is_hst,
        }
    }
}
