//! Import result envelope returned for every parse call.

use serde::{Deserialize, Serialize};

use crate::patient::Patient;
use crate::prescription::Prescription;
use crate::vendor::{SourceFormat, Vendor};

/// Aggregate consumption of one drug across an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugUsage {
    pub drug_code: String,
    pub drug_name: String,
    pub total_qty: f64,
    pub dispense_count: u32,
    /// Total quantity divided by the number of distinct dispense months.
    pub avg_monthly_qty: f64,
}

/// Outcome of one import: counters, diagnostics and canonical records.
///
/// `success` is true exactly when no record failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub source_type: SourceFormat,
    pub source_vendor: Vendor,
    /// Records seen.
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patients: Vec<Patient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prescriptions: Vec<Prescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drug_usages: Vec<DrugUsage>,
}

impl ImportResult {
    /// An empty, successful result for the given source.
    pub fn empty(source_type: SourceFormat, source_vendor: Vendor) -> Self {
        Self {
            success: true,
            source_type,
            source_vendor,
            total: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            patients: Vec::new(),
            prescriptions: Vec::new(),
            drug_usages: Vec::new(),
        }
    }

    /// Looks up a patient by national ID.
    pub fn patient(&self, national_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.national_id == national_id)
    }

    /// Total number of prescription items across all prescriptions.
    pub fn item_count(&self) -> usize {
        self.prescriptions.iter().map(|rx| rx.items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_serialization() {
        let result = ImportResult::empty(SourceFormat::Csv, Vendor::Generic);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["source_type"], "csv");
        assert_eq!(json["source_vendor"], "generic");
        assert!(json.get("errors").is_none());
        assert!(json.get("patients").is_none());
        assert!(json.get("drug_usages").is_none());
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let mut result = ImportResult::empty(SourceFormat::Xml, Vendor::Nhi);
        result.total = 1;
        result.imported = 1;
        result.patients.push(Patient::new("A123456789", "王小明"));
        let json = serde_json::to_string(&result).unwrap();
        let back: ImportResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert!(back.patient("A123456789").is_some());
    }
}
