//! Canonical prescription and line item records.

use serde::{Deserialize, Serialize};

/// Visit type marking a chronic prescription refill (慢性病連續處方箋).
pub const CHRONIC_VISIT_TYPE: &str = "08";

/// Visit sequence prefix followed by a two-digit refill ordinal, e.g. `IC02`.
pub const CHRONIC_SEQUENCE_PREFIX: &str = "IC";

/// Days supply at or above which a prescription is treated as a refill.
pub const DEFAULT_CHRONIC_DAYS_THRESHOLD: u32 = 28;

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

/// One dispensed line of a prescription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    /// `1` drug, `9` pharmacy service fee.
    pub order_type: String,
    pub drug_code: String,
    pub drug_name: String,
    pub frequency: String,
    pub route: String,
    pub quantity: f64,
    pub days_supply: u32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub cost_price: f64,
    /// Single dose as written by the source system.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dose: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub refill_count: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub refill_total: u32,
}

impl PrescriptionItem {
    pub fn new(drug_code: impl Into<String>, drug_name: impl Into<String>) -> Self {
        Self {
            drug_code: drug_code.into(),
            drug_name: drug_name.into(),
            ..Self::default()
        }
    }
}

/// A dispensing event for one patient, with its ordered items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub patient_id: String,
    pub prescription_no: String,
    pub dispense_date: String,
    pub dispense_time: String,
    pub visit_type: String,
    /// Visit sequence, `IC01`, `IC02`... for chronic refills.
    pub visit_sequence: String,
    pub chronic_refill_no: u32,
    pub provider_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub diagnosis_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pharmacist_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pharmacist_name: String,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub total_points: f64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub copay: f64,
    /// `1` normal submission, `3` correction.
    pub data_format: String,
    pub items: Vec<PrescriptionItem>,
}

impl Prescription {
    pub fn new(patient_id: impl Into<String>, prescription_no: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            prescription_no: prescription_no.into(),
            ..Self::default()
        }
    }

    /// Refill ordinal carried in an `ICnn` visit sequence, if any.
    fn sequence_refill_no(&self) -> Option<u32> {
        let rest = self.visit_sequence.trim().strip_prefix(CHRONIC_SEQUENCE_PREFIX)?;
        let ordinal = rest.get(..2)?;
        if !ordinal.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        ordinal.parse().ok().filter(|n| *n > 0)
    }

    /// Infers the chronic refill counter from the merged prescription.
    ///
    /// Visit type `08` wins, then an `ICnn` visit sequence. When neither
    /// applies, any item supplying at least `days_threshold` days marks the
    /// first refill.
    pub fn infer_chronic_refill(&self, days_threshold: u32) -> u32 {
        if self.visit_type.trim() == CHRONIC_VISIT_TYPE {
            return 1;
        }
        if let Some(ordinal) = self.sequence_refill_no() {
            return ordinal;
        }
        let long_supply = self
            .items
            .iter()
            .any(|item| item.days_supply >= days_threshold);
        u32::from(long_supply)
    }
}
