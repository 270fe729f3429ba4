//! The decode engine.
//!
//! One engine serves every vendor: the [`VendorProfile`] picks a physical
//! layout for the content at hand and the matching sub-decoder feeds rows
//! into a per-call [`DecodeContext`].

mod fixed_width;
mod markup;
mod records;
mod tabular;

use his_model::{ImportResult, SourceFormat, Vendor};

use crate::assemble::{Position, ResultAssembler};
use crate::canonical::{
    Canonicalizer, correlation_key, item_from_row, patient_from_row, prescription_from_row,
    prescription_number,
};
use crate::encoding::DecodedText;
use crate::error::{IngestError, Result};
use crate::options::ImportOptions;
use crate::profile::{
    DelimitedLayout, FieldKey, FieldRow, FixedWidthLayout, MarkupProfile, RecordLayout,
    VendorProfile,
};
use crate::vendors::{self, GENERIC_DELIMITED};

/// Order type given to items of layouts that carry none.
const DRUG_ORDER_TYPE: &str = "1";

/// Physical layout chosen for one import.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Layout {
    Markup(&'static MarkupProfile),
    FixedWidth(&'static FixedWidthLayout),
    Records(&'static RecordLayout),
    Delimited(&'static DelimitedLayout),
}

impl Layout {
    fn source_format(self) -> SourceFormat {
        match self {
            Layout::Markup(_) => SourceFormat::Xml,
            Layout::FixedWidth(_) => SourceFormat::Dat,
            Layout::Records(layout) => layout.format,
            Layout::Delimited(_) => SourceFormat::Csv,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Layout::Markup(_) => "markup",
            Layout::FixedWidth(_) => "fixed_width",
            Layout::Records(_) => "records",
            Layout::Delimited(_) => "delimited",
        }
    }
}

fn looks_like_markup(text: &str, filename: &str) -> bool {
    filename.ends_with(".xml")
        || text.contains("<?xml")
        || text.contains("<RECS>")
        || text.contains("<REC>")
}

/// Picks the layout a profile uses for this content.
pub(crate) fn select_layout(profile: &'static VendorProfile, text: &str, filename: &str) -> Layout {
    let filename = filename.to_lowercase();
    if let Some(markup) = &profile.markup
        && looks_like_markup(text, &filename)
    {
        return Layout::Markup(markup);
    }
    if let Some(layout) = profile.fixed_width
        && filename.ends_with(".dat")
    {
        return Layout::FixedWidth(layout);
    }
    if let Some(layout) = profile.records
        && layout.trigger.matches(text)
    {
        return Layout::Records(layout);
    }
    profile
        .delimited
        .map(Layout::Delimited)
        .or(profile.records.map(Layout::Records))
        .unwrap_or(Layout::Delimited(&GENERIC_DELIMITED))
}

/// Per-call decode state shared by the sub-decoders.
#[derive(Debug)]
pub(crate) struct DecodeContext {
    /// Prefix of derived prescription numbers.
    pub prefix: &'static str,
    pub asm: ResultAssembler,
    pub canon: Canonicalizer,
}

impl DecodeContext {
    pub(crate) fn new(
        source_type: SourceFormat,
        vendor: Vendor,
        prefix: &'static str,
        options: &ImportOptions,
    ) -> Self {
        Self {
            prefix,
            asm: ResultAssembler::new(source_type, vendor, options),
            canon: Canonicalizer::new(),
        }
    }

    /// Registers the row's patient and opens (or reuses) the prescription
    /// stored under `key`.
    pub(crate) fn open_prescription(
        &mut self,
        row: &FieldRow,
        key: String,
        prescription_no: String,
        position: Position,
    ) -> usize {
        if let Some(patient) = patient_from_row(row) {
            self.canon.add_patient(patient);
        }
        let asm = &mut self.asm;
        self.canon.open_prescription(key, || {
            prescription_from_row(row, prescription_no, asm, position)
        })
    }

    pub(crate) fn push_item(
        &mut self,
        prescription: usize,
        row: &FieldRow,
        default_order_type: &str,
        position: Position,
    ) {
        let item = item_from_row(row, default_order_type, &mut self.asm, position);
        self.canon.push_item(prescription, item);
    }

    /// Absorbs one flat row holding patient, visit and item fields together.
    ///
    /// Rows are correlated by patient plus explicit prescription number when
    /// the layout has one, otherwise by patient plus visit date. A row that
    /// neither names a patient nor attaches an item fails.
    pub(crate) fn absorb_flat_row(&mut self, row: &FieldRow, position: Position) {
        let national_id = row.get(FieldKey::NationalId);
        let explicit_no = row.get(FieldKey::PrescriptionNo);
        let discriminator = if explicit_no.is_empty() {
            row.get(FieldKey::VisitDate)
        } else {
            explicit_no
        };

        let mut attached = false;
        if national_id.is_empty() {
            tracing::trace!(%position, "row without national id");
        } else if !discriminator.is_empty() {
            let prescription_no = if explicit_no.is_empty() {
                prescription_number(self.prefix, &[national_id, discriminator])
            } else {
                explicit_no.to_string()
            };
            let key = correlation_key(&[national_id, discriminator]);
            let index = self.open_prescription(row, key, prescription_no, position);
            if row.has(FieldKey::DrugCode) {
                self.push_item(index, row, DRUG_ORDER_TYPE, position);
                attached = true;
            }
        } else if let Some(patient) = patient_from_row(row) {
            self.canon.add_patient(patient);
        }

        if national_id.is_empty() && !attached {
            self.asm
                .failed(position, "row has no national ID and no drug item");
        } else {
            self.asm.imported();
        }
    }

    fn finish(self, chronic_days_threshold: u32, aggregate_drug_usage: bool) -> ImportResult {
        let records = self
            .canon
            .finish(chronic_days_threshold, aggregate_drug_usage);
        self.asm.finish(records)
    }
}

/// Decodes text with one vendor profile.
pub(crate) fn decode(
    decoded: &DecodedText,
    filename: &str,
    profile: &'static VendorProfile,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let layout = select_layout(profile, &decoded.text, filename);
    let (vendor, prefix) = match layout {
        Layout::Delimited(delimited) => (delimited.vendor, delimited.prefix),
        _ => (profile.vendor, profile.prefix),
    };
    let source_type = layout.source_format();
    tracing::debug!(%vendor, layout = layout.name(), format = %source_type, "layout selected");

    let mut ctx = DecodeContext::new(source_type, vendor, prefix, options);
    match layout {
        Layout::Markup(markup) => {
            if let Err(err) = markup::decode(&decoded.text, markup, &mut ctx) {
                let partial = ctx.asm.abort(Position::Record(err.record), &err.message);
                return Err(IngestError::MalformedMarkup {
                    record: err.record,
                    message: err.message,
                    partial: Box::new(partial),
                });
            }
        }
        Layout::FixedWidth(layout) => fixed_width::decode(decoded, layout, &mut ctx),
        Layout::Records(layout) => records::decode(&decoded.text, layout, &mut ctx),
        Layout::Delimited(layout) => tabular::decode(&decoded.text, layout, &mut ctx),
    }

    let aggregate = options.drug_usage
        && vendors::profile(vendor).is_some_and(|profile| profile.aggregates_drug_usage);
    Ok(ctx.finish(options.chronic_days_threshold, aggregate))
}
