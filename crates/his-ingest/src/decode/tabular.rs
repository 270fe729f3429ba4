//! Header-mapped delimited decoding.

use super::DecodeContext;
use crate::assemble::Position;
use crate::delimited::{detect_separator, is_header_line, split_line};
use crate::mapping::ColumnMapping;
use crate::profile::DelimitedLayout;

pub(crate) fn decode(text: &str, layout: &DelimitedLayout, ctx: &mut DecodeContext) {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((first_index, first_line)) = lines.next() else {
        return;
    };
    let separator = detect_separator(first_line);
    let first_fields = split_line(first_line, separator);

    let (mapping, first_is_data) = match layout.default_columns {
        None => (ColumnMapping::from_header(&first_fields, layout.synonyms), false),
        Some(_) if is_header_line(&first_fields, layout.header_keywords) => {
            (ColumnMapping::from_header(&first_fields, layout.synonyms), false)
        }
        Some(order) => (ColumnMapping::from_order(order), true),
    };
    tracing::debug!(
        separator = ?separator,
        header = !first_is_data,
        columns = mapping.len(),
        "delimited columns resolved"
    );

    if first_is_data {
        let row = mapping.extract(&first_fields);
        ctx.absorb_flat_row(&row, Position::Line(first_index + 1));
    }
    for (index, line) in lines {
        let row = mapping.extract(&split_line(line, separator));
        ctx.absorb_flat_row(&row, Position::Line(index + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use his_model::{ImportResult, SourceFormat, Vendor};

    use crate::options::ImportOptions;
    use crate::profile::FieldKey;

    static GENERIC: DelimitedLayout = DelimitedLayout {
        vendor: Vendor::Generic,
        prefix: "GEN",
        header_keywords: &[],
        synonyms: &[
            (FieldKey::NationalId, &["身分證", "national_id"]),
            (FieldKey::PrescriptionNo, &["處方箋號", "prescription_no"]),
            (FieldKey::DrugCode, &["藥品代碼", "drug_code"]),
            (FieldKey::DrugName, &["藥品名稱", "drug_name"]),
            (FieldKey::Name, &["姓名", "name"]),
            (FieldKey::VisitDate, &["就診日", "visit_date"]),
            (FieldKey::Days, &["天數", "days"]),
        ],
        default_columns: None,
    };

    static ORDERED: DelimitedLayout = DelimitedLayout {
        vendor: Vendor::Yaosheng,
        prefix: "YS",
        header_keywords: &["身分證", "姓名", "藥品"],
        synonyms: &[
            (FieldKey::NationalId, &["身分證"]),
            (FieldKey::Name, &["姓名"]),
            (FieldKey::VisitDate, &["日期"]),
            (FieldKey::DrugCode, &["藥品代碼"]),
        ],
        default_columns: Some(&[
            FieldKey::NationalId,
            FieldKey::Name,
            FieldKey::VisitDate,
            FieldKey::DrugCode,
        ]),
    };

    fn run(text: &str, layout: &DelimitedLayout) -> ImportResult {
        let mut ctx = DecodeContext::new(
            SourceFormat::Csv,
            layout.vendor,
            layout.prefix,
            &ImportOptions::default(),
        );
        decode(text, layout, &mut ctx);
        ctx.finish(28, false)
    }

    #[test]
    fn test_rows_merge_by_patient_and_visit_date() {
        let text = "身分證,姓名,就診日,藥品代碼,藥品名稱,天數\n\
                    A123456789,王小明,1140315,AC1,降壓錠,28\n\
                    \n\
                    A123456789,王大明,1140315,AC2,胃藥,7\n\
                    B223456789,李小華,1140316,AC1,降壓錠,14";
        let result = run(text, &GENERIC);
        assert_eq!((result.total, result.imported), (3, 3));
        assert_eq!(result.patients.len(), 2);
        assert_eq!(result.patients[0].name, "王小明");
        assert_eq!(result.prescriptions.len(), 2);
        assert_eq!(result.prescriptions[0].prescription_no, "GEN-A123456789-1140315");
        assert_eq!(result.prescriptions[0].items.len(), 2);
        assert_eq!(result.prescriptions[0].chronic_refill_no, 1);
        assert_eq!(result.prescriptions[1].chronic_refill_no, 0);
    }

    #[test]
    fn test_tab_separated_with_prescription_number() {
        let text = "national_id\tprescription_no\tdrug_code\n\
                    A123456789\tRX1\tAC1\n\
                    A123456789\tRX2\tAC2\n\
                    \tRX3\tAC3";
        let result = run(text, &GENERIC);
        assert_eq!((result.imported, result.failed), (2, 1));
        let numbers: Vec<&str> = result
            .prescriptions
            .iter()
            .map(|rx| rx.prescription_no.as_str())
            .collect();
        assert_eq!(numbers, vec!["RX1", "RX2"]);
        assert_eq!(result.errors, vec!["line 4: row has no national ID and no drug item"]);
    }

    #[test]
    fn test_headerless_uses_default_order() {
        let text = "A123456789,王小明,1140315,AC1\nA123456789,王小明,1140315,AC2";
        let result = run(text, &ORDERED);
        assert_eq!(result.imported, 2);
        assert_eq!(result.prescriptions.len(), 1);
        assert_eq!(result.prescriptions[0].prescription_no, "YS-A123456789-1140315");
        assert_eq!(result.prescriptions[0].items.len(), 2);
    }

    #[test]
    fn test_keyword_header_detected() {
        let text = "\"身分證\",\"姓名\",\"日期\",\"藥品代碼\"\nA123456789,王小明,20250315,AC1";
        let result = run(text, &ORDERED);
        assert_eq!(result.imported, 1);
        assert_eq!(result.prescriptions[0].dispense_date, "2025-03-15");
    }

    #[test]
    fn test_empty_input() {
        let result = run("\n\n", &GENERIC);
        assert_eq!(result.total, 0);
        assert!(result.success);
    }
}
