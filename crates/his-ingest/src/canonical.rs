//! Canonicalization: decoded rows to deduplicated patients and correlated
//! prescriptions.
//!
//! All state lives in a [`Canonicalizer`] created for one import call.
//! Patients and prescriptions keep first-seen order.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use his_model::{
    DrugUsage, Patient, Prescription, PrescriptionItem, normalize_date, split_era_datetime,
};

use crate::assemble::{Position, ResultAssembler};
use crate::logging::redact_value;
use crate::profile::{FieldKey, FieldRow};

/// Order type of drug items; other order types are fees and services.
const DRUG_ORDER_TYPE: &str = "1";

/// Separator for composite correlation keys; never appears in source data.
const KEY_SEPARATOR: char = '\u{1f}';

/// Canonical collections produced by one import.
#[derive(Debug, Default)]
pub(crate) struct CanonicalRecords {
    pub patients: Vec<Patient>,
    pub prescriptions: Vec<Prescription>,
    pub drug_usages: Vec<DrugUsage>,
}

/// Builds a correlation key from its parts.
pub(crate) fn correlation_key(parts: &[&str]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part);
    }
    key
}

/// Builds a derived prescription number such as `YS-A123456789-1140315`.
pub(crate) fn prescription_number(prefix: &str, parts: &[&str]) -> String {
    std::iter::once(prefix)
        .chain(parts.iter().copied())
        .collect::<Vec<_>>()
        .join("-")
}

/// Patient described by a row, if it carries a national ID.
pub(crate) fn patient_from_row(row: &FieldRow) -> Option<Patient> {
    let national_id = row.get(FieldKey::NationalId);
    if national_id.is_empty() {
        return None;
    }
    Some(
        Patient::new(national_id, row.get(FieldKey::Name))
            .with_birthday(normalize_date(row.get(FieldKey::Birthday)))
            .with_phone(row.get(FieldKey::Phone))
            .with_card_number(row.get(FieldKey::CardNumber))
            .with_address(row.get(FieldKey::Address)),
    )
}

/// Prescription header fields described by a row.
///
/// A visit date-time (`YYYMMDDHHMMSS`) wins over a plain visit date.
pub(crate) fn prescription_from_row(
    row: &FieldRow,
    prescription_no: String,
    asm: &mut ResultAssembler,
    position: Position,
) -> Prescription {
    let (dispense_date, dispense_time) = if row.has(FieldKey::VisitDateTime) {
        split_era_datetime(row.get(FieldKey::VisitDateTime))
    } else {
        (normalize_date(row.get(FieldKey::VisitDate)), String::new())
    };
    Prescription {
        patient_id: row.get(FieldKey::NationalId).to_string(),
        prescription_no,
        dispense_date,
        dispense_time,
        visit_type: row.get(FieldKey::VisitType).to_string(),
        visit_sequence: row.get(FieldKey::VisitSequence).to_string(),
        chronic_refill_no: 0,
        provider_code: row.get(FieldKey::ProviderCode).to_string(),
        provider_name: row.get(FieldKey::ProviderName).to_string(),
        diagnosis_code: row.get(FieldKey::Diagnosis).to_string(),
        pharmacist_id: row.get(FieldKey::PharmacistId).to_string(),
        pharmacist_name: row.get(FieldKey::PharmacistName).to_string(),
        total_points: asm.decimal(row, FieldKey::TotalPoints, position),
        copay: asm.decimal(row, FieldKey::Copay, position),
        data_format: row.get(FieldKey::DataFormat).to_string(),
        items: Vec::new(),
    }
}

/// Line item described by a row.
pub(crate) fn item_from_row(
    row: &FieldRow,
    default_order_type: &str,
    asm: &mut ResultAssembler,
    position: Position,
) -> PrescriptionItem {
    let order_type = match row.get(FieldKey::OrderType) {
        "" => default_order_type,
        given => given,
    };
    PrescriptionItem {
        order_type: order_type.to_string(),
        drug_code: row.get(FieldKey::DrugCode).to_string(),
        drug_name: row.get(FieldKey::DrugName).to_string(),
        frequency: row.get(FieldKey::Frequency).to_string(),
        route: row.get(FieldKey::Route).to_string(),
        quantity: asm.decimal(row, FieldKey::Quantity, position),
        days_supply: asm.count(row, FieldKey::Days, position),
        unit_price: asm.decimal(row, FieldKey::UnitPrice, position),
        cost_price: asm.decimal(row, FieldKey::CostPrice, position),
        dose: row.get(FieldKey::Dose).to_string(),
        unit: row.get(FieldKey::Unit).to_string(),
        refill_count: asm.count(row, FieldKey::RefillCount, position),
        refill_total: asm.count(row, FieldKey::RefillTotal, position),
    }
}

/// Per-call accumulator of canonical records.
#[derive(Debug, Default)]
pub(crate) struct Canonicalizer {
    patients: Vec<Patient>,
    patient_index: HashMap<String, usize>,
    prescriptions: Vec<Prescription>,
    prescription_index: HashMap<String, usize>,
}

impl Canonicalizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a patient unless the national ID was already seen.
    ///
    /// Returns true when the patient was new. Later duplicates are dropped,
    /// never merged.
    pub(crate) fn add_patient(&mut self, patient: Patient) -> bool {
        if !patient.has_identity() || self.patient_index.contains_key(&patient.national_id) {
            return false;
        }
        tracing::trace!(national_id = redact_value(&patient.national_id), "new patient");
        self.patient_index
            .insert(patient.national_id.clone(), self.patients.len());
        self.patients.push(patient);
        true
    }

    /// Returns the prescription index for `key`, creating it with `build`
    /// when the key is new.
    pub(crate) fn open_prescription(
        &mut self,
        key: String,
        build: impl FnOnce() -> Prescription,
    ) -> usize {
        if let Some(index) = self.prescription_index.get(&key) {
            return *index;
        }
        let index = self.prescriptions.len();
        self.prescriptions.push(build());
        self.prescription_index.insert(key, index);
        index
    }

    pub(crate) fn push_item(&mut self, prescription: usize, item: PrescriptionItem) {
        if let Some(rx) = self.prescriptions.get_mut(prescription) {
            rx.items.push(item);
        }
    }

    /// Infers chronic refills and, when asked, aggregates drug usage.
    pub(crate) fn finish(
        mut self,
        chronic_days_threshold: u32,
        aggregate_drug_usage: bool,
    ) -> CanonicalRecords {
        for rx in &mut self.prescriptions {
            rx.chronic_refill_no = rx.infer_chronic_refill(chronic_days_threshold);
        }
        let drug_usages = if aggregate_drug_usage {
            drug_usage(&self.prescriptions)
        } else {
            Vec::new()
        };
        CanonicalRecords {
            patients: self.patients,
            prescriptions: self.prescriptions,
            drug_usages,
        }
    }
}

fn dispense_month(date: &str) -> Option<(i32, u32)> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date.year(), date.month()))
}

/// Totals drug items per drug code, in first-seen order.
///
/// The monthly average divides the total by the number of distinct dispense
/// months the drug appears in; it stays 0 when no dispense date is known.
pub(crate) fn drug_usage(prescriptions: &[Prescription]) -> Vec<DrugUsage> {
    let mut usages: Vec<DrugUsage> = Vec::new();
    let mut months: Vec<Vec<(i32, u32)>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for rx in prescriptions {
        let month = dispense_month(&rx.dispense_date);
        for item in rx.items.iter().filter(|i| i.order_type == DRUG_ORDER_TYPE) {
            let slot = *index.entry(item.drug_code.as_str()).or_insert_with(|| {
                usages.push(DrugUsage {
                    drug_code: item.drug_code.clone(),
                    drug_name: item.drug_name.clone(),
                    ..DrugUsage::default()
                });
                months.push(Vec::new());
                usages.len() - 1
            });
            usages[slot].total_qty += item.quantity;
            usages[slot].dispense_count += 1;
            if let Some(month) = month
                && !months[slot].contains(&month)
            {
                months[slot].push(month);
            }
        }
    }

    for (usage, seen) in usages.iter_mut().zip(&months) {
        if !seen.is_empty() {
            usage.avg_monthly_qty = usage.total_qty / seen.len() as f64;
        }
    }
    usages
}
