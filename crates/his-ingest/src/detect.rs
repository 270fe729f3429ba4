//! Vendor detection.
//!
//! Detection is a fixed, ordered list of rules evaluated against the decoded
//! text and the filename hint. The first rule with a verdict wins; when none
//! fires the export is treated as generic CSV.

use his_model::Vendor;

use crate::encoding::decode_bytes;
use crate::profile::VendorProfile;
use crate::vendors::{PROFILES, profile};

/// Markup signature priority; DrMaster extensions win over Vision's.
const SIGNATURE_PRIORITY: [Vendor; 2] = [Vendor::DrMaster, Vendor::Vision];

/// Record marker that opens an NHI monthly claim file.
const CLAIM_HEADER_MARKER: &str = "t";

/// Inputs shared by every detection rule.
#[derive(Debug)]
pub(crate) struct DetectionInput<'a> {
    pub text: &'a str,
    /// Lowercased filename hint.
    pub filename: String,
    /// Lowercased first non-empty line.
    pub first_line: String,
}

impl<'a> DetectionInput<'a> {
    pub(crate) fn new(text: &'a str, filename: &str) -> Self {
        let first_line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_lowercase();
        Self {
            text,
            filename: filename.to_lowercase(),
            first_line,
        }
    }

    fn has_extension(&self, extension: &str) -> bool {
        self.filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == extension)
    }
}

/// One step of vendor detection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DetectionRule {
    pub name: &'static str,
    pub apply: fn(&DetectionInput<'_>) -> Option<Vendor>,
}

/// Detection rules in evaluation order.
pub(crate) const RULES: &[DetectionRule] = &[
    DetectionRule {
        name: "filename_alias",
        apply: filename_alias,
    },
    DetectionRule {
        name: "exclusive_extension",
        apply: exclusive_extension,
    },
    DetectionRule {
        name: "pipe_without_comma",
        apply: pipe_without_comma,
    },
    DetectionRule {
        name: "markup_signature",
        apply: markup_signature,
    },
    DetectionRule {
        name: "delimited_first_line",
        apply: delimited_first_line,
    },
];

fn find_profile(predicate: impl Fn(&VendorProfile) -> bool) -> Option<Vendor> {
    PROFILES
        .iter()
        .find(|profile| predicate(profile))
        .map(|profile| profile.vendor)
}

fn filename_alias(input: &DetectionInput<'_>) -> Option<Vendor> {
    find_profile(|profile| {
        profile
            .filename_aliases
            .iter()
            .any(|alias| input.filename.contains(alias))
    })
}

fn exclusive_extension(input: &DetectionInput<'_>) -> Option<Vendor> {
    find_profile(|profile| {
        profile
            .exclusive_extensions
            .iter()
            .any(|ext| input.has_extension(ext))
    })
}

fn pipe_without_comma(input: &DetectionInput<'_>) -> Option<Vendor> {
    (input.text.contains('|') && !input.text.contains(',')).then_some(Vendor::DrMaster)
}

fn markup_signature(input: &DetectionInput<'_>) -> Option<Vendor> {
    if !input.text.contains("<?xml") && !input.text.contains("<RECS>") {
        return None;
    }
    let signed = SIGNATURE_PRIORITY.into_iter().find(|vendor| {
        profile(*vendor)
            .and_then(|profile| profile.markup.as_ref())
            .is_some_and(|markup| {
                markup
                    .signature_tags
                    .iter()
                    .any(|tag| input.text.contains(&format!("<{tag}>")))
            })
    });
    Some(signed.unwrap_or(Vendor::Nhi))
}

fn delimited_first_line(input: &DetectionInput<'_>) -> Option<Vendor> {
    if !input.text.contains(',') {
        return None;
    }
    let leading = input.first_line.split(',').next().unwrap_or_default().trim();
    if leading == CLAIM_HEADER_MARKER {
        return Some(Vendor::Nhi);
    }
    find_profile(|profile| {
        profile
            .name_tokens
            .iter()
            .any(|token| input.first_line.contains(token))
    })
}

/// Detects the vendor of already decoded text.
pub(crate) fn detect_vendor_in(text: &str, filename: &str) -> Vendor {
    let input = DetectionInput::new(text, filename);
    for rule in RULES {
        if let Some(vendor) = (rule.apply)(&input) {
            tracing::debug!(rule = rule.name, %vendor, "vendor detected");
            return vendor;
        }
    }
    tracing::debug!("no detection rule matched, using generic");
    Vendor::Generic
}

/// Detects which system produced an export.
///
/// The buffer is decoded first, so Big5 filenames and content match the same
/// aliases as UTF-8 ones.
pub fn detect_vendor(bytes: &[u8], filename: &str) -> Vendor {
    detect_vendor_in(&decode_bytes(bytes).text, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> DetectionRule {
        *RULES
            .iter()
            .find(|rule| rule.name == name)
            .expect("rule exists")
    }

    fn apply(name: &str, text: &str, filename: &str) -> Option<Vendor> {
        (rule(name).apply)(&DetectionInput::new(text, filename))
    }

    #[test]
    fn test_filename_alias() {
        assert_eq!(apply("filename_alias", "", "YS_20250315.csv"), Some(Vendor::Yaosheng));
        assert_eq!(apply("filename_alias", "", "耀聖匯出.xml"), Some(Vendor::Yaosheng));
        assert_eq!(apply("filename_alias", "", "Vision-export.xml"), Some(Vendor::Vision));
        assert_eq!(apply("filename_alias", "", "看診大師.txt"), Some(Vendor::DrMaster));
        assert_eq!(apply("filename_alias", "", "export.csv"), None);
    }

    #[test]
    fn test_alias_vendor_order() {
        assert_eq!(apply("filename_alias", "", "ys_vs_dm.csv"), Some(Vendor::Yaosheng));
        assert_eq!(apply("filename_alias", "", "dm_vision.csv"), Some(Vendor::Vision));
    }

    #[test]
    fn test_exclusive_extension() {
        assert_eq!(apply("exclusive_extension", "", "EXPORT.DAT"), Some(Vendor::Yaosheng));
        assert_eq!(apply("exclusive_extension", "", "data.csv"), None);
        assert_eq!(apply("exclusive_extension", "", "dat"), None);
    }

    #[test]
    fn test_pipe_without_comma() {
        assert_eq!(apply("pipe_without_comma", "D|A1|王", ""), Some(Vendor::DrMaster));
        assert_eq!(apply("pipe_without_comma", "D|A1,王", ""), None);
    }

    #[test]
    fn test_markup_signature() {
        let nhi = "<?xml version=\"1.0\"?><RECS><REC><MB1><A12>A1</A12></MB1></REC></RECS>";
        assert_eq!(apply("markup_signature", nhi, ""), Some(Vendor::Nhi));
        let vision = "<RECS><REC><MB1><d22>台北市</d22></MB1></REC></RECS>";
        assert_eq!(apply("markup_signature", vision, ""), Some(Vendor::Vision));
        let both = "<RECS><REC><MB1><d22>台北市</d22><d23>0912</d23></MB1></REC></RECS>";
        assert_eq!(apply("markup_signature", both, ""), Some(Vendor::DrMaster));
        assert_eq!(apply("markup_signature", "a,b,c", ""), None);
    }

    #[test]
    fn test_delimited_first_line() {
        assert_eq!(apply("delimited_first_line", "T,3501200000,11403\nD,1", ""), Some(Vendor::Nhi));
        assert_eq!(apply("delimited_first_line", "t ,x\n", ""), Some(Vendor::Nhi));
        assert_eq!(
            apply("delimited_first_line", "展望匯出,2025\nD,1", ""),
            Some(Vendor::Vision)
        );
        assert_eq!(apply("delimited_first_line", "national_id,name", ""), None);
        assert_eq!(apply("delimited_first_line", "no separators", ""), None);
    }

    #[test]
    fn test_detect_vendor_order() {
        // Filename alias beats content.
        let nhi_xml = b"<?xml version=\"1.0\"?><RECS></RECS>";
        assert_eq!(detect_vendor(nhi_xml, "vs_upload.xml"), Vendor::Vision);
        assert_eq!(detect_vendor(nhi_xml, "upload.xml"), Vendor::Nhi);
        assert_eq!(detect_vendor(b"anything", "export.dat"), Vendor::Yaosheng);
        assert_eq!(detect_vendor(b"H|1\nD|A1", "report.txt"), Vendor::DrMaster);
        assert_eq!(detect_vendor(b"national_id,name\nA1,X", "x.csv"), Vendor::Generic);
        assert_eq!(detect_vendor(b"", ""), Vendor::Generic);
    }
}
