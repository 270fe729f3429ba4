//! Counters and diagnostics for one import call.

use std::fmt;
use std::str::FromStr;

use his_model::{ImportResult, SourceFormat, Vendor};

use crate::canonical::CanonicalRecords;
use crate::options::ImportOptions;
use crate::profile::{FieldKey, FieldRow};

/// Where a record sits in the source, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// 1-based physical line.
    Line(usize),
    /// 1-based markup `REC` element.
    Record(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(n) => write!(f, "line {n}"),
            Position::Record(n) => write!(f, "record {n}"),
        }
    }
}

/// Accumulates totals, errors and warnings until the result is built.
///
/// `total` counts imported plus failed records. Deliberately passed-over
/// lines only move `skipped`.
#[derive(Debug)]
pub(crate) struct ResultAssembler {
    source_type: SourceFormat,
    vendor: Vendor,
    total: usize,
    imported: usize,
    skipped: usize,
    failed: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
    report_coerced_fields: bool,
}

impl ResultAssembler {
    pub(crate) fn new(source_type: SourceFormat, vendor: Vendor, options: &ImportOptions) -> Self {
        Self {
            source_type,
            vendor,
            total: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            report_coerced_fields: options.report_coerced_fields,
        }
    }

    pub(crate) fn imported(&mut self) {
        self.total += 1;
        self.imported += 1;
    }

    pub(crate) fn failed(&mut self, position: Position, reason: &str) {
        self.total += 1;
        self.failed += 1;
        tracing::trace!(%position, reason, "record failed");
        self.errors.push(format!("{position}: {reason}"));
    }

    pub(crate) fn skipped(&mut self, position: Position) {
        tracing::trace!(%position, "line skipped");
        self.skipped += 1;
    }

    /// Records a diagnostic that does not fail the record.
    pub(crate) fn note(&mut self, position: Position, message: &str) {
        self.errors.push(format!("{position}: {message}"));
    }

    fn coerce<T>(
        &mut self,
        row: &FieldRow,
        key: FieldKey,
        position: Position,
        accept: fn(&T) -> bool,
    ) -> T
    where
        T: FromStr + Default,
    {
        let raw = row.get(key);
        if raw.is_empty() {
            return T::default();
        }
        match raw.parse() {
            Ok(value) if accept(&value) => value,
            _ => {
                tracing::debug!(%position, field = key.as_str(), "unparsable number coerced to 0");
                if self.report_coerced_fields {
                    self.warnings.push(format!(
                        "{position}: {} value '{raw}' is not a number, using 0",
                        key.as_str()
                    ));
                }
                T::default()
            }
        }
    }

    /// `NaN` and infinities count as unparsable.
    pub(crate) fn decimal(&mut self, row: &FieldRow, key: FieldKey, position: Position) -> f64 {
        self.coerce(row, key, position, |value: &f64| value.is_finite())
    }

    pub(crate) fn count(&mut self, row: &FieldRow, key: FieldKey, position: Position) -> u32 {
        self.coerce(row, key, position, |_| true)
    }

    /// Builds the final envelope; `success` mirrors `failed == 0`.
    pub(crate) fn finish(self, records: CanonicalRecords) -> ImportResult {
        tracing::info!(
            vendor = %self.vendor,
            format = %self.source_type,
            total = self.total,
            imported = self.imported,
            skipped = self.skipped,
            failed = self.failed,
            patients = records.patients.len(),
            prescriptions = records.prescriptions.len(),
            "import finished"
        );
        ImportResult {
            success: self.failed == 0,
            source_type: self.source_type,
            source_vendor: self.vendor,
            total: self.total,
            imported: self.imported,
            skipped: self.skipped,
            failed: self.failed,
            errors: self.errors,
            warnings: self.warnings,
            patients: records.patients,
            prescriptions: records.prescriptions,
            drug_usages: records.drug_usages,
        }
    }

    /// Result returned alongside a fatal error.
    ///
    /// The unreadable document counts as one failed record and no canonical
    /// records are kept.
    pub(crate) fn abort(mut self, position: Position, message: &str) -> ImportResult {
        tracing::warn!(vendor = %self.vendor, format = %self.source_type, %position, error = message, "import aborted");
        self.failed(position, message);
        ImportResult {
            success: false,
            total: self.total,
            imported: self.imported,
            skipped: self.skipped,
            failed: self.failed,
            errors: self.errors,
            warnings: self.warnings,
            ..ImportResult::empty(self.source_type, self.vendor)
        }
    }
}
