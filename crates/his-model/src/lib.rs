//! Canonical data model for HIS dispensing exports.
//!
//! Every vendor export is normalized into the same small set of types:
//! - [`Patient`]: deduplicated by national ID
//! - [`Prescription`] and [`PrescriptionItem`]: one dispensing event and its lines
//! - [`DrugUsage`]: per-drug consumption aggregate
//! - [`ImportResult`]: counters, diagnostics and the records above
//!
//! # Module Organization
//!
//! - [`dates`]: legacy-era (民國) date conversion
//! - [`vendor`]: vendor identities, source formats and the vendor table entry

pub mod dates;
pub mod error;
mod patient;
mod prescription;
mod result;
pub mod vendor;

// === Error Types ===
pub use error::{ModelError, Result};

// === Records ===
pub use patient::Patient;
pub use prescription::{
    CHRONIC_SEQUENCE_PREFIX, CHRONIC_VISIT_TYPE, DEFAULT_CHRONIC_DAYS_THRESHOLD, Prescription,
    PrescriptionItem,
};
pub use result::{DrugUsage, ImportResult};

// === Vendors ===
pub use vendor::{SourceFormat, Vendor, VendorInfo};

// === Dates ===
pub use dates::{convert_era_date, convert_era_datetime, normalize_date, split_era_datetime};
