//! Vision pharmacy system (展望).
//!
//! Markup exports add `d22` (patient address). Delimited exports always use
//! the claim `T/D/P` layout shared with the NHI monthly file.

use his_model::{SourceFormat, Vendor};

use crate::profile::{Correlation, MarkupProfile, RecordLayout, RecordTrigger, VendorProfile};

use super::nhi::{CLAIM_DETAIL_COLUMNS, CLAIM_ITEM_COLUMNS};

static RECORDS: RecordLayout = RecordLayout {
    trigger: RecordTrigger::Always,
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
    vendor: Vendor::Vision,
    prefix: "VS",
    description: "展望亞洲 HIS 系統匯出檔案",
    formats: &[SourceFormat::Xml, SourceFormat::Csv],
    filename_aliases: &["vision", "展望", "vs_"],
    exclusive_extensions: &[],
    name_tokens: &["vision", "展望"],
    markup: Some(MarkupProfile {
        phone_tags: &["d21"],
        address_tag: Some("d22"),
        signature_tags: &["d22"],
    }),
    fixed_width: None,
    records: Some(&RECORDS),
    delimited: None,
    aggregates_drug_usage: false,
};
