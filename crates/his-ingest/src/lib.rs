//! HIS dispensing export ingestion.
//!
//! This crate turns the export files of Taiwanese pharmacy and clinic systems
//! into the canonical records of [`his_model`].
//!
//! # Features
//!
//! - **Encoding Detection**: Big5 or UTF-8, decided from byte statistics
//! - **Vendor Detection**: NHI, Yaosheng, Vision, DrMaster or generic CSV
//! - **Decoding**: markup, fixed-width, record-typed and header-mapped delimited layouts
//! - **Canonicalization**: patient deduplication, prescription correlation, chronic refill inference
//!
//! # Example
//!
//! ```ignore
//! use his_ingest::{Vendor, detect_and_parse, parse_by_vendor};
//!
//! let bytes = std::fs::read("exports/ys_20250315.dat")?;
//! let result = detect_and_parse(&bytes, "ys_20250315.dat")?;
//! println!("{} patients, {} prescriptions", result.patients.len(), result.prescriptions.len());
//!
//! // Force a vendor when the filename carries no hint
//! let result = parse_by_vendor(&bytes, "export.csv", Vendor::DrMaster)?;
//! ```

mod assemble;
mod canonical;
mod decode;
mod delimited;
mod detect;
mod encoding;
mod error;
pub mod logging;
mod mapping;
mod options;
mod profile;
mod vendors;

// === Error Types ===
pub use error::{IngestError, Result};

// === Configuration ===
pub use options::ImportOptions;

// === Detection ===
pub use detect::detect_vendor;
pub use encoding::{DecodedText, TextEncoding, decode_bytes, detect_encoding};

// === Vendors ===
pub use vendors::list_supported_vendors;

// === Field Mapping ===
pub use delimited::{detect_separator, is_header_line, split_line};
pub use mapping::ColumnMapping;
pub use profile::{FieldKey, FieldRow, SynonymTable};

// === Model Re-exports ===
pub use his_model::{
    DrugUsage, ImportResult, Patient, Prescription, PrescriptionItem, SourceFormat, Vendor,
    VendorInfo, convert_era_date,
};

/// Detects encoding and vendor, then decodes the export.
///
/// # Errors
///
/// Returns [`IngestError::MalformedMarkup`] when a markup export is not well
/// formed. Every other problem is reported inside the returned result.
pub fn detect_and_parse(bytes: &[u8], filename: &str) -> Result<ImportResult> {
    detect_and_parse_with_options(bytes, filename, &ImportOptions::default())
}

/// [`detect_and_parse`] with explicit options.
pub fn detect_and_parse_with_options(
    bytes: &[u8],
    filename: &str,
    options: &ImportOptions,
) -> Result<ImportResult> {
    parse_by_vendor_with_options(bytes, filename, Vendor::Auto, options)
}

/// Decodes the export as coming from `vendor`; [`Vendor::Auto`] detects it.
///
/// # Errors
///
/// Returns [`IngestError::MalformedMarkup`] when a markup export is not well
/// formed.
pub fn parse_by_vendor(bytes: &[u8], filename: &str, vendor: Vendor) -> Result<ImportResult> {
    parse_by_vendor_with_options(bytes, filename, vendor, &ImportOptions::default())
}

/// [`parse_by_vendor`] for a vendor code such as `"drmaster"` or `"auto"`.
///
/// # Errors
///
/// Returns [`IngestError::Model`] for an unknown vendor code.
pub fn parse_by_vendor_code(bytes: &[u8], filename: &str, code: &str) -> Result<ImportResult> {
    let vendor: Vendor = code.parse()?;
    parse_by_vendor(bytes, filename, vendor)
}

/// [`parse_by_vendor`] with explicit options.
pub fn parse_by_vendor_with_options(
    bytes: &[u8],
    filename: &str,
    vendor: Vendor,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let span = tracing::info_span!("parse", filename, requested = %vendor, bytes = bytes.len());
    let _guard = span.enter();

    let decoded = decode_bytes(bytes);
    let vendor = match vendor {
        Vendor::Auto => detect::detect_vendor_in(&decoded.text, filename),
        vendor => vendor,
    };
    let profile = vendors::profile(vendor).unwrap_or(&vendors::GENERIC_PROFILE);
    decode::decode(&decoded, filename, profile, options)
}
