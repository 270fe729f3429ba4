//! Yaosheng pharmacy system (耀聖).
//!
//! Markup exports are flat: visit tags sit directly under `REC` and only the
//! items are nested in `MB2`. The `.dat` export is fixed-width, measured in
//! source (Big5) bytes:
//!
//! | Bytes   | Field        |
//! |---------|--------------|
//! | 0-1     | record type (`1` header, `2` detail, `9` trailer) |
//! | 1-11    | provider     |
//! | 11-21   | national ID  |
//! | 21-41   | name         |
//! | 41-48   | birthday     |
//! | 48-55   | visit date   |
//! | 55-65   | drug code    |
//! | 65-105  | drug name    |
//! | 105-115 | quantity     |
//! | 115-118 | days         |

use his_model::{SourceFormat, Vendor};

use crate::profile::{
    DelimitedLayout, FieldKey, FixedWidthLayout, MarkupProfile, SynonymTable, VendorProfile,
};

static FIXED_WIDTH: FixedWidthLayout = FixedWidthLayout {
    record_type: 0..1,
    detail_type: "2",
    min_width: 21,
    fields: &[
        (FieldKey::ProviderCode, 1..11),
        (FieldKey::NationalId, 11..21),
        (FieldKey::Name, 21..41),
        (FieldKey::Birthday, 41..48),
        (FieldKey::VisitDate, 48..55),
        (FieldKey::DrugCode, 55..65),
        (FieldKey::DrugName, 65..105),
        (FieldKey::Quantity, 105..115),
        (FieldKey::Days, 115..118),
    ],
};

const SYNONYMS: SynonymTable = &[
    (FieldKey::NationalId, &["身分證", "身份證", "idno", "pid", "id"]),
    (FieldKey::DrugCode, &["藥品代碼", "藥碼", "健保碼", "code"]),
    (FieldKey::DrugName, &["藥品名稱", "藥名", "drug"]),
    (FieldKey::Name, &["姓名", "name", "patient"]),
    (FieldKey::Birthday, &["生日", "出生", "birthday", "dob"]),
    (FieldKey::VisitDate, &["就診日", "調劑日", "日期", "date"]),
    (FieldKey::Days, &["天數", "日份", "days"]),
    (FieldKey::Quantity, &["數量", "總量", "qty", "quantity"]),
    (FieldKey::VisitType, &["就醫類別", "案件", "type"]),
];

static DELIMITED: DelimitedLayout = DelimitedLayout {
    vendor: Vendor::Yaosheng,
    prefix: "YS",
    header_keywords: &["身分證", "姓名", "藥品", "日期", "代碼", "id", "name", "drug"],
    synonyms: SYNONYMS,
    default_columns: Some(&[
        FieldKey::NationalId,
        FieldKey::Name,
        FieldKey::Birthday,
        FieldKey::VisitDate,
        FieldKey::DrugCode,
        FieldKey::DrugName,
        FieldKey::Quantity,
        FieldKey::Days,
        FieldKey::VisitType,
    ]),
};

pub(crate) static PROFILE: VendorProfile = VendorProfile {
    vendor: Vendor::Yaosheng,
    prefix: "YS",
    description: "耀聖資訊 HIS 系統匯出檔案",
    formats: &[
        SourceFormat::Xml,
        SourceFormat::Csv,
        SourceFormat::Dat,
        SourceFormat::Txt,
    ],
    filename_aliases: &["yaosheng", "耀聖", "ys_"],
    exclusive_extensions: &["dat"],
    name_tokens: &["yaosheng", "耀聖"],
    markup: Some(MarkupProfile {
        phone_tags: &["d21"],
        address_tag: None,
        signature_tags: &[],
    }),
    fixed_width: Some(&FIXED_WIDTH),
    records: None,
    delimited: Some(&DELIMITED),
    aggregates_drug_usage: false,
};
