#![allow(missing_docs)]

use encoding_rs::BIG5;
use his_ingest::{
    ImportOptions, IngestError, SourceFormat, Vendor, detect_and_parse,
    detect_and_parse_with_options, parse_by_vendor, parse_by_vendor_code,
};

const MINIMAL_MARKUP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RECS>
  <REC>
    <MSH><h1>3501200000</h1></MSH>
    <MB1>
      <A12>A123456789</A12>
      <d20>王小明</d20>
      <A13>0650101</A13>
      <A17>1140315093000</A17>
      <A18>0001</A18>
      <A23>04</A23>
    </MB1>
    <MB2><p1>1</p1><p2>AC12345100</p2><p3>降壓錠</p3><p7>28</p7><d27>28</d27></MB2>
  </REC>
</RECS>"#;

#[test]
fn test_minimal_markup_record() {
    let result = detect_and_parse(MINIMAL_MARKUP.as_bytes(), "upload.xml").unwrap();

    assert!(result.success);
    assert_eq!(result.source_type, SourceFormat::Xml);
    assert_eq!(result.source_vendor, Vendor::Nhi);
    assert_eq!((result.total, result.imported, result.failed), (1, 1, 0));
    assert_eq!(result.patients.len(), 1);
    assert_eq!(result.prescriptions.len(), 1);
    assert_eq!(result.prescriptions[0].items.len(), 1);

    let rx = &result.prescriptions[0];
    assert_eq!(rx.dispense_date, "2025-03-15");
    assert_eq!(rx.dispense_time, "09:30:00");
    assert_eq!(rx.prescription_no, "NHI-3501200000-2025-03-15-0001");
    assert_eq!(rx.chronic_refill_no, 1);

    assert_eq!(result.drug_usages.len(), 1);
    assert_eq!(result.drug_usages[0].total_qty, 28.0);
}

#[test]
fn test_drug_usage_can_be_disabled() {
    let options = ImportOptions::new().with_drug_usage(false);
    let result =
        detect_and_parse_with_options(MINIMAL_MARKUP.as_bytes(), "upload.xml", &options).unwrap();
    assert!(result.drug_usages.is_empty());
}

#[test]
fn test_vision_markup_address() {
    let text = MINIMAL_MARKUP.replace("<A23>04</A23>", "<A23>04</A23><d22>台北市中正區</d22>");
    let result = detect_and_parse(text.as_bytes(), "upload.xml").unwrap();
    assert_eq!(result.source_vendor, Vendor::Vision);
    assert_eq!(result.patients[0].address, "台北市中正區");
    assert!(result.drug_usages.is_empty());
}

#[test]
fn test_malformed_markup_returns_partial_result() {
    let text = "<?xml version=\"1.0\"?><RECS><REC><MB1><A12>A1</A12></MB1></REC><REC><MB1>";
    let err = detect_and_parse(text.as_bytes(), "upload.xml").unwrap_err();

    let IngestError::MalformedMarkup { record, .. } = &err else {
        panic!("expected malformed markup, got {err:?}");
    };
    assert_eq!(*record, 2);

    let partial = err.into_partial_result().unwrap();
    assert!(!partial.success);
    assert_eq!(partial.source_type, SourceFormat::Xml);
    assert_eq!(partial.source_vendor, Vendor::Nhi);
    assert_eq!(partial.failed, 1);
    assert!(partial.patients.is_empty());
    assert_eq!(partial.errors.len(), 1);
}

#[test]
fn test_delimited_rows_merge_into_one_prescription() {
    let text = "national_id,name,visit_date,drug_code,drug_name,days\n\
                A123456789,王小明,1140315,AC1,降壓錠,28\n\
                A123456789,王小明,1140315,AC2,胃藥,7\n";
    let result = detect_and_parse(text.as_bytes(), "export.csv").unwrap();

    assert_eq!(result.source_vendor, Vendor::Generic);
    assert_eq!(result.source_type, SourceFormat::Csv);
    assert_eq!(result.patients.len(), 1);
    assert_eq!(result.prescriptions.len(), 1);
    assert_eq!(result.prescriptions[0].items.len(), 2);
    assert_eq!(result.prescriptions[0].prescription_no, "GEN-A123456789-1140315");
}

#[test]
fn test_big5_yaosheng_csv() {
    let text = "身分證,姓名,生日,就診日,藥品代碼,藥品名稱,數量,天數\n\
                A123456789,王小明,0650101,1140315,AC12345100,降壓錠,28,28\n\
                B223456789,李小華,0700202,1140316,BC22222100,胃藥,14,7\n";
    let bytes = BIG5.encode(text).0.into_owned();
    let result = detect_and_parse(&bytes, "ys_export.csv").unwrap();

    assert_eq!(result.source_vendor, Vendor::Yaosheng);
    assert_eq!(result.imported, 2);
    assert_eq!(result.patients[0].name, "王小明");
    assert_eq!(result.patients[1].birthday, "1981-02-02");
    assert_eq!(result.prescriptions[0].items[0].drug_name, "降壓錠");
    assert_eq!(result.prescriptions[0].prescription_no, "YS-A123456789-1140315");
}

#[test]
fn test_yaosheng_fixed_width() {
    let detail = format!(
        "2{:<10}{:<10}{:<20}{}{}{:<10}{:<40}{:<10}{:<3}",
        "3501200000", "A123456789", "WANG", "0650101", "1140315", "AC12345100", "TABLET", "28", "28"
    );
    let text = format!("1HEADER\n{detail}\n2SHORT\n9TRAILER\n");
    let result = detect_and_parse(text.as_bytes(), "export.dat").unwrap();

    assert_eq!(result.source_vendor, Vendor::Yaosheng);
    assert_eq!(result.source_type, SourceFormat::Dat);
    assert_eq!((result.total, result.imported, result.skipped), (1, 1, 1));
    assert_eq!(result.prescriptions[0].items[0].drug_name, "TABLET");
    assert_eq!(result.prescriptions[0].chronic_refill_no, 1);
}

fn push_padded(line: &mut Vec<u8>, value: &[u8], width: usize) {
    line.extend_from_slice(value);
    line.resize(line.len() + width - value.len(), b' ');
}

/// A Yaosheng detail record with raw name and drug-name bytes.
fn dat_detail(name: &[u8], drug_name: &[u8]) -> Vec<u8> {
    let mut line = b"2".to_vec();
    line.extend_from_slice(b"3501200000A123456789");
    push_padded(&mut line, name, 20);
    line.extend_from_slice(b"06501011140315");
    push_padded(&mut line, b"AC12345100", 10);
    push_padded(&mut line, drug_name, 40);
    push_padded(&mut line, b"28", 10);
    push_padded(&mut line, b"28", 3);
    line
}

fn assert_dat_item(result: &his_ingest::ImportResult) {
    assert_eq!(result.source_vendor, Vendor::Yaosheng);
    assert_eq!((result.imported, result.failed), (1, 0));
    assert!(result.warnings.is_empty());
    let rx = &result.prescriptions[0];
    assert_eq!(rx.dispense_date, "2025-03-15");
    assert_eq!(rx.chronic_refill_no, 1);
    let item = &rx.items[0];
    assert_eq!(item.drug_code, "AC12345100");
    assert_eq!(item.quantity, 28.0);
    assert_eq!(item.days_supply, 28);
}

#[test]
fn test_fixed_width_with_few_big5_characters() {
    // Two Big5 characters are too few for a Big5 verdict.
    let name = BIG5.encode("王明").0;
    let bytes = dat_detail(&name, b"TABLET");
    let result =
        detect_and_parse_with_options(&bytes, "export.dat", &ImportOptions::strict()).unwrap();

    assert_dat_item(&result);
    assert_eq!(result.patients[0].name, "王明");
    assert_eq!(result.prescriptions[0].items[0].drug_name, "TABLET");
}

#[test]
fn test_fixed_width_with_hkscs_character() {
    let mut name = BIG5.encode("王").0.into_owned();
    name.extend_from_slice(&[0x88, 0x40]);
    name.extend_from_slice(&BIG5.encode("明").0);
    let drug_name = BIG5.encode("降壓錠").0;

    let mut bytes = b"1HEADER\r\n".to_vec();
    bytes.extend_from_slice(&dat_detail(&name, &drug_name));
    bytes.extend_from_slice(b"\r\n9TRAILER\r\n");
    let result =
        detect_and_parse_with_options(&bytes, "export.dat", &ImportOptions::strict()).unwrap();

    assert_dat_item(&result);
    assert_eq!(result.patients[0].name, "王\u{31c0}明");
    assert_eq!(result.prescriptions[0].items[0].drug_name, "降壓錠");
}

#[test]
fn test_drmaster_pipe_report() {
    let text = "H|3501200000|看診大師\n\
                D|A123456789|王小明|0650101|0912345678|1140315|04\n\
                M|AC12345100|降壓錠|28|28|QD\n\
                M|BC22222100|胃藥|14|7|TID\n";
    let result = detect_and_parse(text.as_bytes(), "report.txt").unwrap();

    assert_eq!(result.source_vendor, Vendor::DrMaster);
    assert_eq!(result.source_type, SourceFormat::Txt);
    assert_eq!(result.imported, 1);
    let rx = &result.prescriptions[0];
    assert_eq!(rx.prescription_no, "DM-A123456789-1140315");
    assert_eq!(rx.items.len(), 2);
    assert_eq!(rx.items[1].frequency, "TID");
}

#[test]
fn test_vision_claim_file() {
    let text = "T,3501200000,11403\n\
                D,04,0001,1140315,A123456789,王小明,,,,\n\
                P,1,AC12345100,降壓錠,,,,28,2.5\n";
    let result = parse_by_vendor(text.as_bytes(), "claim.csv", Vendor::Vision).unwrap();

    assert_eq!(result.source_vendor, Vendor::Vision);
    assert_eq!(
        result.prescriptions[0].prescription_no,
        "VS-A123456789-1140315-0001"
    );
    assert_eq!(result.prescriptions[0].items[0].unit_price, 2.5);
}

#[test]
fn test_nhi_claim_file_with_points_and_drug_usage() {
    let mut detail: Vec<String> = vec![String::new(); 41];
    for (index, value) in [
        (0, "D"),
        (1, "08"),
        (2, "0001"),
        (3, "1140315"),
        (4, "A123456789"),
        (5, "王小明"),
        (39, "1250"),
        (40, "50"),
    ] {
        detail[index] = value.to_string();
    }
    let text = format!(
        "T,3501200000,11403\n{}\nP,1,AC12345100,降壓錠,,,,28,2.5\nP,1,AC12345100,降壓錠,,,,28,2.5\n",
        detail.join(",")
    );
    let result = detect_and_parse(text.as_bytes(), "claim.csv").unwrap();

    assert_eq!(result.source_vendor, Vendor::Nhi);
    let rx = &result.prescriptions[0];
    assert_eq!(rx.prescription_no, "NHI-A123456789-1140315-0001");
    assert_eq!(rx.total_points, 1250.0);
    assert_eq!(rx.copay, 50.0);
    assert_eq!(rx.chronic_refill_no, 1);
    assert_eq!(result.drug_usages.len(), 1);
    assert_eq!(result.drug_usages[0].total_qty, 56.0);
    assert_eq!(result.drug_usages[0].dispense_count, 2);
    assert_eq!(result.drug_usages[0].avg_monthly_qty, 56.0);
}

#[test]
fn test_auto_vendor_matches_detection() {
    let text = "D|A123456789|王小明|0650101|0912345678|1140315|04\n";
    let auto = parse_by_vendor(text.as_bytes(), "report.txt", Vendor::Auto).unwrap();
    let detected = detect_and_parse(text.as_bytes(), "report.txt").unwrap();
    assert_eq!(auto, detected);
}

#[test]
fn test_coercion_warnings() {
    let text = "national_id,visit_date,drug_code,quantity\nA123456789,1140315,AC1,abc\n";
    let quiet = detect_and_parse(text.as_bytes(), "export.csv").unwrap();
    assert!(quiet.warnings.is_empty());
    assert_eq!(quiet.prescriptions[0].items[0].quantity, 0.0);

    let strict =
        detect_and_parse_with_options(text.as_bytes(), "export.csv", &ImportOptions::strict())
            .unwrap();
    assert_eq!(strict.warnings, vec!["line 2: quantity value 'abc' is not a number, using 0"]);
    assert!(strict.success);
}

#[test]
fn test_empty_input() {
    let result = detect_and_parse(b"", "").unwrap();
    assert!(result.success);
    assert_eq!(result.source_vendor, Vendor::Generic);
    assert_eq!(result.total, 0);
}

#[test]
fn test_parse_by_vendor_code() {
    let text = "D|A123456789|王小明|0650101|0912345678|1140315|04\n";
    let result = parse_by_vendor_code(text.as_bytes(), "report.txt", "DrMaster").unwrap();
    assert_eq!(result.source_vendor, Vendor::DrMaster);

    let err = parse_by_vendor_code(text.as_bytes(), "report.txt", "medisys").unwrap_err();
    assert!(matches!(err, IngestError::Model(_)));
    assert!(err.partial_result().is_none());
}
