//! DrMaster clinic system (看診大師).
//!
//! Markup exports extend the standard tags with `h4` (system version), `d23`
//! (mobile, preferred over `d21`), `d24` (emergency contact), `p9` (cost
//! price), `d28` (single dose), `d29` (unit) and `d37` (total refills).
//!
//! Text reports are pipe-separated and record-typed:
//!
//! ```text
//! H|<institution>|...
//! D|<national id>|<name>|<birthday>|<phone>|<visit date>|<visit type>
//! M|<drug code>|<drug name>|<quantity>|<days>|<frequency>
//! ```

use his_model::{SourceFormat, Vendor};

use crate::profile::{
    Correlation, DelimitedLayout, FieldKey, MarkupProfile, RecordLayout, RecordTrigger,
    SynonymTable, VendorProfile,
};

static RECORDS: RecordLayout = RecordLayout {
    trigger: RecordTrigger::Contains('|'),
    format: SourceFormat::Txt,
    separator: '|',
    detail_marker: "D",
    item_marker: "M",
    detail_min_fields: 7,
    item_min_fields: 5,
    detail_columns: &[
        (FieldKey::NationalId, 1),
        (FieldKey::Name, 2),
        (FieldKey::Birthday, 3),
        (FieldKey::Phone, 4),
        (FieldKey::VisitDate, 5),
        (FieldKey::VisitType, 6),
    ],
    item_columns: &[
        (FieldKey::DrugCode, 1),
        (FieldKey::DrugName, 2),
        (FieldKey::Quantity, 3),
        (FieldKey::Days, 4),
        (FieldKey::Frequency, 5),
    ],
    correlation: Correlation::VisitDate,
    default_order_type: "1",
};

const SYNONYMS: SynonymTable = &[
    (FieldKey::NationalId, &["身分證", "身份證", "pid", "id"]),
    (FieldKey::DrugCode, &["藥品代碼", "藥碼", "健保碼", "code"]),
    (FieldKey::DrugName, &["藥品名稱", "藥名", "drug"]),
    (FieldKey::Name, &["姓名", "name", "patient"]),
    (FieldKey::Birthday, &["生日", "出生", "birthday"]),
    (FieldKey::Phone, &["電話", "手機", "phone", "mobile"]),
    (FieldKey::VisitDate, &["就診日", "調劑日", "日期", "date"]),
    (FieldKey::Days, &["天數", "日份", "days"]),
    (FieldKey::Quantity, &["數量", "總量", "qty"]),
    (FieldKey::VisitType, &["就醫類別", "案件", "type"]),
    (FieldKey::Frequency, &["使用頻率", "頻率", "freq"]),
];

static DELIMITED: DelimitedLayout = DelimitedLayout {
    vendor: Vendor::DrMaster,
    prefix: "DM",
    header_keywords: &["身分證", "姓名", "藥品", "日期", "代碼", "處方"],
    synonyms: SYNONYMS,
    default_columns: Some(&[
        FieldKey::NationalId,
        FieldKey::Name,
        FieldKey::Birthday,
        FieldKey::Phone,
        FieldKey::VisitDate,
        FieldKey::DrugCode,
        FieldKey::DrugName,
        FieldKey::Quantity,
        FieldKey::Days,
        FieldKey::VisitType,
        FieldKey::Frequency,
    ]),
};

pub(crate) static PROFILE: VendorProfile = VendorProfile {
    vendor: Vendor::DrMaster,
    prefix: "DM",
    description: "看診大師 HIS 系統匯出檔案",
    formats: &[SourceFormat::Xml, SourceFormat::Csv, SourceFormat::Txt],
    filename_aliases: &["drmaster", "看診大師", "dm_"],
    exclusive_extensions: &[],
    name_tokens: &["drmaster", "看診大師"],
    markup: Some(MarkupProfile {
        phone_tags: &["d23", "d21"],
        address_tag: None,
        signature_tags: &["d23", "d24", "d29", "d37"],
    }),
    fixed_width: None,
    records: Some(&RECORDS),
    delimited: Some(&DELIMITED),
    aggregates_drug_usage: false,
};
