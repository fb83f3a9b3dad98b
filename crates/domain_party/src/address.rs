//! Address types

use serde::{Deserialize, Serialize};

use core_kernel::{AddressId, ProvinceCode};

/// Address type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Billing,
    Shipping,
    Business,
    Mailing,
}

/// A Canadian postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub address_type: AddressType,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: ProvinceCode,
    pub postal_code: String,
    pub country: String,
    pub is_primary: bool,
}

impl Address {
    /// Creates a new, non-primary address in Canada
    pub fn new(
        address_type: AddressType,
        line1: impl Into<String>,
        city: impl Into<String>,
        province: ProvinceCode,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            id: AddressId::new(),
            address_type,
            line1: line1.into(),
            line2: None,
            city: city.into(),
            province,
            postal_code: postal_code.into(),
            country: "CA".to_string(),
            is_primary: false,
        }
    }

    /// Marks the address as primary
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Sets the second address line
    pub fn with_line2(mut self, line2: impl Into<String>) -> Self {
        self.line2 = Some(line2.into());
        self
    }

    /// Formats address for display
    pub fn format(&self) -> String {
        let mut lines = vec![self.line1.clone()];
        if let Some(l2) = &self.line2 {
            lines.push(l2.clone());
        }
        lines.push(format!("{}, {} {}", self.city, self.province, self.postal_code));
        lines.push(self.country.clone());
        lines.join("\n")
    }
}
