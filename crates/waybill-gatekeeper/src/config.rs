//! Gatekeeper configuration

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};

/// Couriers recognized without a flag
pub const DEFAULT_COURIERS: &[&str] = &[
    "Amazon Shipping",
    "Aramex",
    "Blue Dart",
    "DHL",
    "DPD",
    "DTDC",
    "Delhivery",
    "Ecom Express",
    "Ekart",
    "FedEx",
    "GLS",
    "India Post",
    "Royal Mail",
    "Shadowfax",
    "TNT",
    "UPS",
    "USPS",
    "XpressBees",
];

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Known couriers (case-insensitive)
    pub courier_allow_list: Vec<String>,

    /// Flag couriers that are not on the allow-list
    pub check_courier_allow_list: bool,

    /// Maximum length of order ids and tracking numbers
    pub max_code_length: usize,

    /// Also accept `-`, `_`, `/` and `.` inside codes (off: letters and digits only)
    pub allow_code_separators: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            courier_allow_list: DEFAULT_COURIERS.iter().map(|c| c.to_string()).collect(),
            check_courier_allow_list: true,
            max_code_length: 64,
            allow_code_separators: false,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (no courier flagging)
    pub fn permissive() -> Self {
        Self {
            check_courier_allow_list: false,
            ..Self::default()
        }
    }

    /// Create a strict configuration (shorter codes)
    pub fn strict() -> Self {
        Self {
            max_code_length: 40,
            ..Self::default()
        }
    }

    /// Create a configuration that accepts separated codes like `AWB/2024/001`
    pub fn with_code_separators() -> Self {
        Self {
            allow_code_separators: true,
            ..Self::default()
        }
    }

    /// Check the configuration for values no record could satisfy
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        if self.max_code_length == 0 {
            return Err(GatekeeperError::Config(
                "max_code_length must be > 0".to_string(),
            ));
        }
        if self.courier_allow_list.iter().any(|c| c.trim().is_empty()) {
            return Err(GatekeeperError::Config(
                "courier_allow_list contains an empty entry".to_string(),
            ));
        }
        Ok(())
    }
}
