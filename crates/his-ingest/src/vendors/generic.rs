//! Generic header-driven CSV.
//!
//! No vendor layout is assumed: the first non-empty line is always the
//! header and columns are resolved purely through synonyms.

use his_model::{SourceFormat, Vendor};

use crate::profile::{DelimitedLayout, FieldKey, SynonymTable, VendorProfile};

pub(crate) const SYNONYMS: SynonymTable = &[
    (
        FieldKey::NationalId,
        &["身分證", "身份證", "national_id", "病患id", "idno", "pid", "id"],
    ),
    (
        FieldKey::PrescriptionNo,
        &["處方箋號", "處方號", "處方箋", "prescription_no", "rx_no", "rxno"],
    ),
    (FieldKey::ProviderName, &["來源醫院", "醫院", "hospital", "provider"]),
    (FieldKey::DrugCode, &["藥品代碼", "健保碼", "drug_code", "nhi_code", "code"]),
    (FieldKey::DrugName, &["藥品名稱", "藥名", "drug_name"]),
    (FieldKey::Name, &["姓名", "patient_name", "name"]),
    (FieldKey::Birthday, &["生日", "出生日期", "birthday", "dob", "birth"]),
    (FieldKey::Phone, &["電話", "手機", "phone", "tel", "mobile"]),
    (
        FieldKey::VisitDate,
        &["就診日", "調劑日期", "visit_date", "dispense_date", "date"],
    ),
    (FieldKey::Days, &["給藥天數", "給藥日數", "天數", "日份", "days", "day"]),
    (FieldKey::Quantity, &["數量", "總量", "quantity", "qty"]),
    (FieldKey::UnitPrice, &["單價", "unit_price", "price"]),
    (FieldKey::VisitType, &["就醫類別", "visit_type", "type"]),
    (FieldKey::Frequency, &["使用頻率", "頻率", "frequency", "freq"]),
];

pub(crate) static DELIMITED: DelimitedLayout = DelimitedLayout {
    vendor: Vendor::Generic,
    prefix: "GEN",
    header_keywords: &[],
    synonyms: SYNONYMS,
    default_columns: None,
};

pub(crate) static PROFILE: VendorProfile = VendorProfile {
    vendor: Vendor::Generic,
    prefix: "GEN",
    description: "標準 CSV 格式（自動欄位對應）",
    formats: &[SourceFormat::Csv, SourceFormat::Txt],
    filename_aliases: &[],
    exclusive_extensions: &[],
    name_tokens: &[],
    markup: None,
    fixed_width: None,
    records: None,
    delimited: Some(&DELIMITED),
    aggregates_drug_usage: false,
};
