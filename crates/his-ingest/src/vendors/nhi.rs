//! National health insurance standard formats (健保署標準).
//!
//! Two exports exist: the daily upload markup (`RECS`/`REC` with `MSH`, `MB1`
//! and `MB2` sections) and the monthly claim file, a comma-separated
//! record-typed layout:
//!
//! ```text
//! T,<institution>,<fee month>,...            header, ignored
//! D,<case type>,<serial>,<visit date>,<national id>,<name>,...,<points @39>,<copay @40>
//! P,<order type>,<drug code>,<drug name>,...,<quantity @7>,<unit price @8>
//! ```
//!
//! Vision exports the same claim layout, so the column tables are shared.

use his_model::{SourceFormat, Vendor};

use crate::profile::{
    Correlation, FieldKey, MarkupProfile, RecordLayout, RecordTrigger, VendorProfile,
};

use super::generic;

pub(crate) const CLAIM_DETAIL_COLUMNS: &[(FieldKey, usize)] = &[
    (FieldKey::VisitType, 1),
    (FieldKey::VisitSequence, 2),
    (FieldKey::VisitDate, 3),
    (FieldKey::NationalId, 4),
    (FieldKey::Name, 5),
    (FieldKey::TotalPoints, 39),
    (FieldKey::Copay, 40),
];

pub(crate) const CLAIM_ITEM_COLUMNS: &[(FieldKey, usize)] = &[
    (FieldKey::OrderType, 1),
    (FieldKey::DrugCode, 2),
    (FieldKey::DrugName, 3),
    (FieldKey::Quantity, 7),
    (FieldKey::UnitPrice, 8),
];

static CLAIM_RECORDS: RecordLayout = RecordLayout {
    trigger: RecordTrigger::StartsWith(&["t,", "T,", "30,"]),
    format: SourceFormat::Csv,
    separator: ',',
    detail_marker: "D",
    item_marker: "P",
    detail_min_fields: 10,
    item_min_fields: 8,
    detail_columns: CLAIM_DETAIL_COLUMNS,
    item_columns: CLAIM_ITEM_COLUMNS,
    correlation: Correlation::VisitSequence,
    default_order_type: "",
};

pub(crate) static PROFILE: VendorProfile = VendorProfile {
    vendor: Vendor::Nhi,
    prefix: "NHI",
    description: "健保署每日上傳 XML / 月申報 CSV",
    formats: &[SourceFormat::Xml, SourceFormat::Csv],
    filename_aliases: &[],
    exclusive_extensions: &[],
    name_tokens: &[],
    markup: Some(MarkupProfile {
        phone_tags: &["d21"],
        address_tag: None,
        signature_tags: &[],
    }),
    fixed_width: None,
    records: Some(&CLAIM_RECORDS),
    delimited: Some(&generic::DELIMITED),
    aggregates_drug_usage: true,
};
