//! Configuration options for dispensing export imports.

use his_model::DEFAULT_CHRONIC_DAYS_THRESHOLD;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling how exports are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Days supply at or above which a prescription without other chronic
    /// markers counts as the first refill.
    pub chronic_days_threshold: u32,

    /// Add a warning for every numeric field that could not be parsed and was
    /// replaced by zero.
    ///
    /// Default: false (coercion is silent apart from debug logs).
    pub report_coerced_fields: bool,

    /// Aggregate drug usage for NHI exports.
    pub drug_usage: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            chronic_days_threshold: DEFAULT_CHRONIC_DAYS_THRESHOLD,
            report_coerced_fields: false,
            drug_usage: true,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that surface every coerced field as a warning.
    pub fn strict() -> Self {
        Self {
            report_coerced_fields: true,
            ..Self::default()
        }
    }

    /// Reads options from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_chronic_days_threshold(mut self, days: u32) -> Self {
        self.chronic_days_threshold = days;
        self
    }

    #[must_use]
    pub fn with_report_coerced_fields(mut self, enable: bool) -> Self {
        self.report_coerced_fields = enable;
        self
    }

    #[must_use]
    pub fn with_drug_usage(mut self, enable: bool) -> Self {
        self.drug_usage = enable;
        self
    }
}
