//! Vendor identities and source format labels.
//!
//! Every export handled by the normalizer comes from one of five sources.
//! [`Vendor::Auto`] is a pseudo-vendor that asks the ingest layer to run
//! detection first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Source system that produced an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Detect the vendor from content and filename.
    Auto,
    /// National health insurance standard upload format (健保署標準).
    Nhi,
    /// Yaosheng pharmacy system (耀聖).
    Yaosheng,
    /// Vision pharmacy system (展望).
    Vision,
    /// DrMaster clinic system (看診大師).
    DrMaster,
    /// Header-driven CSV with no vendor-specific layout.
    Generic,
}

impl Vendor {
    /// Every vendor in display order, `Auto` first.
    pub const ALL: [Vendor; 6] = [
        Vendor::Auto,
        Vendor::Nhi,
        Vendor::Yaosheng,
        Vendor::Vision,
        Vendor::DrMaster,
        Vendor::Generic,
    ];

    /// Stable lowercase code used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Auto => "auto",
            Vendor::Nhi => "nhi",
            Vendor::Yaosheng => "yaosheng",
            Vendor::Vision => "vision",
            Vendor::DrMaster => "drmaster",
            Vendor::Generic => "generic",
        }
    }

    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Vendor::Auto => "自動偵測",
            Vendor::Nhi => "健保署標準",
            Vendor::Yaosheng => "耀聖 HIS",
            Vendor::Vision => "展望 HIS",
            Vendor::DrMaster => "看診大師",
            Vendor::Generic => "通用格式",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|vendor| vendor.as_str() == code)
            .ok_or(ModelError::UnknownVendor {
                code: s.to_string(),
            })
    }
}

/// Physical layout the records were decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `RECS`/`REC` markup.
    Xml,
    /// Comma or tab separated rows.
    Csv,
    /// Fixed-width records.
    Dat,
    /// Pipe separated record-typed text.
    Txt,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Csv => "csv",
            SourceFormat::Dat => "dat",
            SourceFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(SourceFormat::Xml),
            "csv" => Ok(SourceFormat::Csv),
            "dat" => Ok(SourceFormat::Dat),
            "txt" => Ok(SourceFormat::Txt),
            _ => Err(ModelError::UnknownSourceFormat {
                label: s.to_string(),
            }),
        }
    }
}

/// Entry of the supported vendor table shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub code: Vendor,
    pub name: String,
    pub description: String,
    pub formats: Vec<SourceFormat>,
}

impl VendorInfo {
    pub fn new(code: Vendor, description: &str, formats: &[SourceFormat]) -> Self {
        Self {
            code,
            name: code.display_name().to_string(),
            description: description.to_string(),
            formats: formats.to_vec(),
        }
    }
}
