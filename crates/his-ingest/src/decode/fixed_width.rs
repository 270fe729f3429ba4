//! Fixed-width decoding.
//!
//! Offsets are byte offsets in the source encoding, so slicing works on the
//! raw input lines and every slice is decoded on its own.

use std::ops::Range;

use super::DecodeContext;
use crate::assemble::Position;
use crate::encoding::DecodedText;
use crate::profile::{FieldRow, FixedWidthLayout};

/// Slices `bytes`, clamping the range to the line length.
fn slice<'a>(bytes: &'a [u8], range: &Range<usize>) -> &'a [u8] {
    let end = range.end.min(bytes.len());
    let start = range.start.min(end);
    &bytes[start..end]
}

pub(crate) fn decode(decoded: &DecodedText, layout: &FixedWidthLayout, ctx: &mut DecodeContext) {
    for (index, bytes) in decoded.source_lines().enumerate() {
        if bytes.trim_ascii().is_empty() {
            continue;
        }
        let position = Position::Line(index + 1);

        let record_type = decoded.decode_slice(slice(bytes, &layout.record_type));
        if record_type.trim() != layout.detail_type {
            continue;
        }
        if bytes.len() < layout.min_width {
            ctx.asm.skipped(position);
            continue;
        }

        let mut row = FieldRow::new();
        for (key, range) in layout.fields {
            row.set(*key, &decoded.decode_slice(slice(bytes, range)));
        }
        ctx.absorb_flat_row(&row, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::BIG5;
    use his_model::{SourceFormat, Vendor};

    use crate::encoding::TextEncoding;
    use crate::options::ImportOptions;
    use crate::profile::FieldKey;

    static LAYOUT: FixedWidthLayout = FixedWidthLayout {
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

    fn pad(value: &str, width: usize) -> String {
        format!("{value:<width$}")
    }

    /// Builds a detail line, padding Big5 text to its byte width.
    fn detail_line(name_bytes: usize, name: &str, drug: &str, qty: &str, days: &str) -> String {
        let mut line = String::from("2");
        line.push_str(&pad("3501200000", 10));
        line.push_str(&pad("A123456789", 10));
        line.push_str(name);
        line.push_str(&" ".repeat(20 - name_bytes));
        line.push_str("0650101");
        line.push_str("1140315");
        line.push_str(&pad(drug, 10));
        line.push_str(&pad("降壓錠", 37));
        line.push_str(&pad(qty, 10));
        line.push_str(&pad(days, 3));
        line
    }

    fn big5_text(text: &str) -> DecodedText {
        let source = BIG5.encode(text).0.into_owned();
        DecodedText {
            text: text.to_string(),
            encoding: TextEncoding::Big5,
            source,
        }
    }

    fn utf8_text(text: String) -> DecodedText {
        DecodedText {
            source: text.clone().into_bytes(),
            text,
            encoding: TextEncoding::Utf8,
        }
    }

    fn context() -> DecodeContext {
        DecodeContext::new(SourceFormat::Dat, Vendor::Yaosheng, "YS", &ImportOptions::default())
    }

    #[test]
    fn test_big5_offsets() {
        // 王小明 is 6 bytes in Big5, 降壓錠 too.
        let text = format!(
            "1HEADER\n{}\n{}\n9TRAILER",
            detail_line(6, "王小明", "AC12345100", "28", "28"),
            detail_line(6, "王小明", "BC22222100", "14", "7"),
        );
        let mut ctx = context();
        decode(&big5_text(&text), &LAYOUT, &mut ctx);
        let result = ctx.finish(28, false);

        assert_eq!((result.total, result.imported, result.skipped), (2, 2, 0));
        assert_eq!(result.patients.len(), 1);
        assert_eq!(result.patients[0].name, "王小明");
        assert_eq!(result.patients[0].birthday, "1976-01-01");

        let rx = &result.prescriptions[0];
        assert_eq!(rx.prescription_no, "YS-A123456789-1140315");
        assert_eq!(rx.provider_code, "3501200000");
        assert_eq!(rx.items.len(), 2);
        assert_eq!(rx.items[0].drug_name, "降壓錠");
        assert_eq!(rx.items[0].quantity, 28.0);
        assert_eq!(rx.items[1].days_supply, 7);
        assert_eq!(rx.items[1].order_type, "1");
        assert_eq!(rx.chronic_refill_no, 1);
    }

    #[test]
    fn test_short_detail_line_skipped() {
        let decoded = utf8_text("2short\n1header".to_string());
        let mut ctx = context();
        decode(&decoded, &LAYOUT, &mut ctx);
        let result = ctx.finish(28, false);
        assert_eq!((result.total, result.skipped), (0, 1));
        assert!(result.success);
    }

    #[test]
    fn test_truncated_line_keeps_leading_fields() {
        let decoded = utf8_text(format!("2{}A123456789", pad("3501200000", 10)));
        let mut ctx = context();
        decode(&decoded, &LAYOUT, &mut ctx);
        let result = ctx.finish(28, false);
        assert_eq!(result.imported, 1);
        assert_eq!(result.patients[0].national_id, "A123456789");
        assert!(result.prescriptions.is_empty());
    }
}
