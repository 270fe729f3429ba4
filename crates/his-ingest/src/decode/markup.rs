//! Markup (`RECS`/`REC`) decoding.
//!
//! Documents are streamed with `quick-xml` into format-preserving
//! [`VendorRecord`]s first; only a well-formed document is canonicalized.

use std::collections::BTreeMap;

use his_model::split_era_datetime;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use thiserror::Error;

use super::DecodeContext;
use crate::assemble::Position;
use crate::canonical::{correlation_key, prescription_number};
use crate::profile::{FieldKey, FieldRow, MarkupProfile};

const RECORD: &str = "REC";
const HEADER_SECTION: &str = "MSH";
const VISIT_SECTION: &str = "MB1";
const ITEM_SECTION: &str = "MB2";

/// Header tags.
const HEADER_TAGS: &[(&str, FieldKey)] = &[("h1", FieldKey::ProviderCode)];

/// Visit tags shared by every vendor. `A14` follows `h1` so the origin
/// provider overrides the institution code when present.
const VISIT_TAGS: &[(&str, FieldKey)] = &[
    ("A01", FieldKey::DataFormat),
    ("A11", FieldKey::CardNumber),
    ("A12", FieldKey::NationalId),
    ("A13", FieldKey::Birthday),
    ("A14", FieldKey::ProviderCode),
    ("A17", FieldKey::VisitDateTime),
    ("A18", FieldKey::VisitSequence),
    ("A23", FieldKey::VisitType),
    ("d19", FieldKey::Diagnosis),
    ("d20", FieldKey::Name),
    ("d31", FieldKey::PharmacistId),
    ("d32", FieldKey::PharmacistName),
];

const ITEM_TAGS: &[(&str, FieldKey)] = &[
    ("p1", FieldKey::OrderType),
    ("p2", FieldKey::DrugCode),
    ("p3", FieldKey::DrugName),
    ("p5", FieldKey::Frequency),
    ("p6", FieldKey::Route),
    ("p7", FieldKey::Quantity),
    ("p8", FieldKey::UnitPrice),
    ("p9", FieldKey::CostPrice),
    ("d27", FieldKey::Days),
    ("d28", FieldKey::Dose),
    ("d29", FieldKey::Unit),
    ("d36", FieldKey::RefillCount),
    ("d37", FieldKey::RefillTotal),
];

/// Tag values of one `REC` element, keyed by the vendor's own tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VendorRecord {
    pub header: BTreeMap<String, String>,
    pub visit: BTreeMap<String, String>,
    pub items: Vec<BTreeMap<String, String>>,
}

impl VendorRecord {
    fn visit_row(&self, markup: &MarkupProfile) -> FieldRow {
        let mut row = FieldRow::new();
        fill(&mut row, &self.header, HEADER_TAGS);
        fill(&mut row, &self.visit, VISIT_TAGS);
        let phone = markup
            .phone_tags
            .iter()
            .filter_map(|tag| self.visit.get(*tag))
            .find(|value| !value.is_empty());
        if let Some(phone) = phone {
            row.set(FieldKey::Phone, phone);
        }
        if let Some(address) = markup.address_tag.and_then(|tag| self.visit.get(tag)) {
            row.set(FieldKey::Address, address);
        }
        row
    }
}

fn fill(row: &mut FieldRow, values: &BTreeMap<String, String>, tags: &[(&str, FieldKey)]) {
    for (tag, key) in tags {
        if let Some(value) = values.get(*tag) {
            row.set(*key, value);
        }
    }
}

/// A document that is not well formed.
#[derive(Debug, Error)]
#[error("record {record}: {message}")]
pub(crate) struct MarkupError {
    /// 1-based record the reader was in when it failed.
    pub record: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Visit,
    Item,
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

/// Reads every `REC` element of a document.
pub(crate) fn read_records(text: &str) -> Result<Vec<VendorRecord>, MarkupError> {
    let mut reader = Reader::from_str(text);
    let mut records: Vec<VendorRecord> = Vec::new();
    let mut current: Option<VendorRecord> = None;
    let mut section: Option<Section> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut value = String::new();

    loop {
        let record = records.len() + 1;
        let fail = |message: String| MarkupError { record, message };
        let event = reader.read_event().map_err(|err| fail(err.to_string()))?;
        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match name.as_str() {
                    RECORD => current = Some(VendorRecord::default()),
                    HEADER_SECTION => section = Some(Section::Header),
                    VISIT_SECTION => section = Some(Section::Visit),
                    ITEM_SECTION => {
                        section = Some(Section::Item);
                        if let Some(record) = current.as_mut() {
                            record.items.push(BTreeMap::new());
                        }
                    }
                    _ => {}
                }
                stack.push(name);
                value.clear();
            }
            Event::Empty(empty) => {
                if empty.name().as_ref() == RECORD.as_bytes() {
                    records.push(VendorRecord::default());
                }
            }
            Event::Text(chunk) => value.push_str(&String::from_utf8_lossy(&chunk)),
            Event::CData(data) => value.push_str(&String::from_utf8_lossy(&data)),
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                let resolved = resolve_reference(&name)
                    .ok_or_else(|| fail(format!("unknown entity &{name};")))?;
                value.push_str(&resolved);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                stack.pop();
                match name.as_str() {
                    RECORD => {
                        if let Some(record) = current.take() {
                            records.push(record);
                        }
                        section = None;
                    }
                    HEADER_SECTION | VISIT_SECTION | ITEM_SECTION => section = None,
                    _ => {
                        if let Some(record) = current.as_mut() {
                            store(record, section, name, value.trim());
                        }
                    }
                }
                value.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(MarkupError {
            record: records.len() + 1,
            message: "unexpected end of document".to_string(),
        });
    }
    Ok(records)
}

fn store(record: &mut VendorRecord, section: Option<Section>, tag: String, value: &str) {
    let value = value.to_string();
    match section {
        Some(Section::Header) => {
            record.header.insert(tag, value);
        }
        Some(Section::Visit) => {
            record.visit.insert(tag, value);
        }
        Some(Section::Item) => {
            if let Some(item) = record.items.last_mut() {
                item.insert(tag, value);
            }
        }
        // Flat layout: tags directly under REC.
        None if tag.starts_with('h') => {
            record.header.insert(tag, value);
        }
        None => {
            record.visit.insert(tag, value);
        }
    }
}

fn item_row(item: &BTreeMap<String, String>) -> FieldRow {
    let mut row = FieldRow::new();
    fill(&mut row, item, ITEM_TAGS);
    row
}

/// Decodes a markup document into the context.
pub(crate) fn decode(
    text: &str,
    markup: &MarkupProfile,
    ctx: &mut DecodeContext,
) -> Result<(), MarkupError> {
    let records = read_records(text)?;
    tracing::debug!(records = records.len(), "markup document read");

    for (index, record) in records.iter().enumerate() {
        let position = Position::Record(index + 1);
        let row = record.visit_row(markup);
        let national_id = row.get(FieldKey::NationalId);
        if national_id.is_empty() && record.items.is_empty() {
            ctx.asm.failed(position, "no usable patient or item data");
            continue;
        }

        let key = if national_id.is_empty() {
            format!("#record-{}", index + 1)
        } else {
            correlation_key(&[
                national_id,
                row.get(FieldKey::VisitDateTime),
                row.get(FieldKey::VisitSequence),
            ])
        };
        let (dispense_date, _) = split_era_datetime(row.get(FieldKey::VisitDateTime));
        let prescription_no = prescription_number(
            ctx.prefix,
            &[
                row.get(FieldKey::ProviderCode),
                &dispense_date,
                row.get(FieldKey::VisitSequence),
            ],
        );
        let prescription = ctx.open_prescription(&row, key, prescription_no, position);
        for item in &record.items {
            ctx.push_item(prescription, &item_row(item), "", position);
        }
        ctx.asm.imported();
    }
    Ok(())
}
