//! Declarative vendor profiles driving the decode engine.
//!
//! A [`VendorProfile`] says everything the engine needs to know about one
//! source system: how to recognize it, which physical layouts it exports and
//! where each canonical field lives in those layouts. The concrete tables
//! live in [`crate::vendors`].

use std::collections::BTreeMap;
use std::ops::Range;

use his_model::{SourceFormat, Vendor};

/// Canonical field a source column, offset or tag maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    // === Patient ===
    NationalId,
    Name,
    Birthday,
    Phone,
    CardNumber,
    Address,

    // === Visit ===
    VisitDate,
    VisitDateTime,
    VisitType,
    VisitSequence,
    PrescriptionNo,
    ProviderCode,
    ProviderName,
    Diagnosis,
    PharmacistId,
    PharmacistName,
    DataFormat,
    TotalPoints,
    Copay,

    // === Item ===
    OrderType,
    DrugCode,
    DrugName,
    Frequency,
    Route,
    Quantity,
    Days,
    UnitPrice,
    CostPrice,
    Dose,
    Unit,
    RefillCount,
    RefillTotal,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::NationalId => "national_id",
            FieldKey::Name => "name",
            FieldKey::Birthday => "birthday",
            FieldKey::Phone => "phone",
            FieldKey::CardNumber => "card_number",
            FieldKey::Address => "address",
            FieldKey::VisitDate => "visit_date",
            FieldKey::VisitDateTime => "visit_datetime",
            FieldKey::VisitType => "visit_type",
            FieldKey::VisitSequence => "visit_sequence",
            FieldKey::PrescriptionNo => "prescription_no",
            FieldKey::ProviderCode => "provider_code",
            FieldKey::ProviderName => "provider_name",
            FieldKey::Diagnosis => "diagnosis_code",
            FieldKey::PharmacistId => "pharmacist_id",
            FieldKey::PharmacistName => "pharmacist_name",
            FieldKey::DataFormat => "data_format",
            FieldKey::TotalPoints => "total_points",
            FieldKey::Copay => "copay",
            FieldKey::OrderType => "order_type",
            FieldKey::DrugCode => "drug_code",
            FieldKey::DrugName => "drug_name",
            FieldKey::Frequency => "frequency",
            FieldKey::Route => "route",
            FieldKey::Quantity => "quantity",
            FieldKey::Days => "days",
            FieldKey::UnitPrice => "unit_price",
            FieldKey::CostPrice => "cost_price",
            FieldKey::Dose => "dose",
            FieldKey::Unit => "unit",
            FieldKey::RefillCount => "refill_count",
            FieldKey::RefillTotal => "refill_total",
        }
    }
}

/// Trimmed field values of one decoded row, keyed by canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRow {
    values: BTreeMap<FieldKey, String>,
}

impl FieldRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a trimmed value; empty values are ignored.
    pub fn set(&mut self, key: FieldKey, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.insert(key, value.to_string());
        }
    }

    pub fn get(&self, key: FieldKey) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    pub fn has(&self, key: FieldKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Header synonyms per canonical field, in claiming priority.
pub type SynonymTable = &'static [(FieldKey, &'static [&'static str])];

/// Byte layout of a fixed-width export line.
#[derive(Debug)]
pub struct FixedWidthLayout {
    pub record_type: Range<usize>,
    /// Record type value of detail lines; other record types are ignored.
    pub detail_type: &'static str,
    /// Shorter lines are skipped.
    pub min_width: usize,
    pub fields: &'static [(FieldKey, Range<usize>)],
}

/// How rows of a record-typed export are correlated into prescriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// Patient plus claim serial; numbered `PREFIX-serial`.
    VisitSequence,
    /// Patient plus visit date; numbered `PREFIX-patient-date`.
    VisitDate,
}

/// When a vendor's non-markup content is record-typed.
#[derive(Debug, Clone, Copy)]
pub enum RecordTrigger {
    Always,
    /// Trimmed content starts with one of these prefixes.
    StartsWith(&'static [&'static str]),
    Contains(char),
}

impl RecordTrigger {
    pub fn matches(self, content: &str) -> bool {
        match self {
            RecordTrigger::Always => true,
            RecordTrigger::StartsWith(prefixes) => {
                let trimmed = content.trim_start();
                prefixes.iter().any(|prefix| trimmed.starts_with(prefix))
            }
            RecordTrigger::Contains(marker) => content.contains(marker),
        }
    }
}

/// Layout of a record-typed export (detail rows followed by item rows).
#[derive(Debug)]
pub struct RecordLayout {
    pub trigger: RecordTrigger,
    pub format: SourceFormat,
    pub separator: char,
    pub detail_marker: &'static str,
    pub item_marker: &'static str,
    pub detail_min_fields: usize,
    pub item_min_fields: usize,
    pub detail_columns: &'static [(FieldKey, usize)],
    pub item_columns: &'static [(FieldKey, usize)],
    pub correlation: Correlation,
    /// Order type assigned when the item row carries none.
    pub default_order_type: &'static str,
}

/// Header-mapped delimited layout.
#[derive(Debug)]
pub struct DelimitedLayout {
    /// Vendor reported for results decoded with this layout.
    pub vendor: Vendor,
    pub prefix: &'static str,
    pub header_keywords: &'static [&'static str],
    pub synonyms: SynonymTable,
    /// Column order for header-less files; `None` means the first line is
    /// always a header.
    pub default_columns: Option<&'static [FieldKey]>,
}

/// Vendor-specific reading of the shared markup tags.
#[derive(Debug)]
pub struct MarkupProfile {
    /// Phone tags in preference order.
    pub phone_tags: &'static [&'static str],
    pub address_tag: Option<&'static str>,
    /// Tags only this vendor emits, used for detection.
    pub signature_tags: &'static [&'static str],
}

/// Everything the engine knows about one vendor.
#[derive(Debug)]
pub struct VendorProfile {
    pub vendor: Vendor,
    /// Prefix of derived prescription numbers.
    pub prefix: &'static str,
    pub description: &'static str,
    pub formats: &'static [SourceFormat],
    /// Lowercase filename fragments that identify the vendor.
    pub filename_aliases: &'static [&'static str],
    /// File extensions only this vendor produces.
    pub exclusive_extensions: &'static [&'static str],
    /// Vendor name tokens that may appear in a delimited header line.
    pub name_tokens: &'static [&'static str],
    pub markup: Option<MarkupProfile>,
    pub fixed_width: Option<&'static FixedWidthLayout>,
    pub records: Option<&'static RecordLayout>,
    pub delimited: Option<&'static DelimitedLayout>,
    pub aggregates_drug_usage: bool,
}
