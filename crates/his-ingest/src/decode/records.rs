//! Record-typed delimited decoding (`T/D/P` claim files, `H/D/M` reports).
//!
//! Each line starts with a marker. A detail row opens a prescription and the
//! item rows that follow belong to it until the next detail row or the end of
//! input. Other markers (file headers, trailers) are ignored.

use super::DecodeContext;
use crate::assemble::Position;
use crate::canonical::{correlation_key, prescription_number};
use crate::delimited::{field, split_line};
use crate::profile::{Correlation, FieldKey, FieldRow, RecordLayout};

/// Lines with fewer fields carry no marker worth reading.
const MIN_RECORD_FIELDS: usize = 2;

/// A detail row waiting for its items.
///
/// The prescription is materialized at once when the row names a patient,
/// otherwise only when the first item arrives.
#[derive(Debug)]
struct OpenDetail {
    key: String,
    prescription_no: String,
    row: FieldRow,
    position: Position,
    prescription: Option<usize>,
    items: usize,
}

#[derive(Debug)]
enum State {
    NoOpenPrescription,
    PrescriptionOpen(OpenDetail),
}

fn columns(fields: &[String], columns: &[(FieldKey, usize)]) -> FieldRow {
    let mut row = FieldRow::new();
    for (key, index) in columns {
        row.set(*key, field(fields, *index));
    }
    row
}

fn materialize(detail: &mut OpenDetail, ctx: &mut DecodeContext) -> usize {
    match detail.prescription {
        Some(index) => index,
        None => {
            let index = ctx.open_prescription(
                &detail.row,
                detail.key.clone(),
                detail.prescription_no.clone(),
                detail.position,
            );
            detail.prescription = Some(index);
            index
        }
    }
}

fn close(state: State, ctx: &mut DecodeContext) {
    if let State::PrescriptionOpen(detail) = state {
        if detail.row.has(FieldKey::NationalId) || detail.items > 0 {
            ctx.asm.imported();
        } else {
            ctx.asm
                .failed(detail.position, "detail row has no national ID and no items");
        }
    }
}

fn open_detail(
    fields: &[String],
    layout: &RecordLayout,
    position: Position,
    ctx: &mut DecodeContext,
) -> OpenDetail {
    let row = columns(fields, layout.detail_columns);
    let national_id = row.get(FieldKey::NationalId);
    let (key, prescription_no) = match layout.correlation {
        Correlation::VisitSequence => {
            // Serials restart per visit day, so the number carries patient and date.
            let serial = row.get(FieldKey::VisitSequence);
            let date = row.get(FieldKey::VisitDate);
            (
                correlation_key(&[national_id, serial]),
                prescription_number(ctx.prefix, &[national_id, date, serial]),
            )
        }
        Correlation::VisitDate => {
            let date = row.get(FieldKey::VisitDate);
            (
                correlation_key(&[national_id, date]),
                prescription_number(ctx.prefix, &[national_id, date]),
            )
        }
    };
    let mut detail = OpenDetail {
        key,
        prescription_no,
        row,
        position,
        prescription: None,
        items: 0,
    };
    if detail.row.has(FieldKey::NationalId) {
        materialize(&mut detail, ctx);
    }
    detail
}

pub(crate) fn decode(text: &str, layout: &RecordLayout, ctx: &mut DecodeContext) {
    let mut state = State::NoOpenPrescription;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line, layout.separator);
        if fields.len() < MIN_RECORD_FIELDS {
            continue;
        }
        let position = Position::Line(index + 1);
        let marker = field(&fields, 0);

        if marker.eq_ignore_ascii_case(layout.detail_marker) {
            close(std::mem::replace(&mut state, State::NoOpenPrescription), ctx);
            if fields.len() < layout.detail_min_fields {
                ctx.asm.failed(position, "detail row has too few fields");
                continue;
            }
            state = State::PrescriptionOpen(open_detail(&fields, layout, position, ctx));
        } else if marker.eq_ignore_ascii_case(layout.item_marker) {
            let State::PrescriptionOpen(detail) = &mut state else {
                ctx.asm.skipped(position);
                continue;
            };
            if fields.len() < layout.item_min_fields {
                ctx.asm.skipped(position);
                ctx.asm.note(position, "item row has too few fields");
                continue;
            }
            let row = columns(&fields, layout.item_columns);
            let prescription = materialize(detail, ctx);
            ctx.push_item(prescription, &row, layout.default_order_type, position);
            detail.items += 1;
        }
    }

    close(state, ctx);
}
