//! Concrete vendor profiles and the supported vendor table.

mod drmaster;
mod generic;
mod nhi;
mod vision;
mod yaosheng;

use his_model::{SourceFormat, Vendor, VendorInfo};

use crate::profile::VendorProfile;

pub(crate) use generic::{DELIMITED as GENERIC_DELIMITED, PROFILE as GENERIC_PROFILE};

/// Profiles in detection priority order.
pub(crate) static PROFILES: [&VendorProfile; 5] = [
    &nhi::PROFILE,
    &yaosheng::PROFILE,
    &vision::PROFILE,
    &drmaster::PROFILE,
    &generic::PROFILE,
];

const AUTO_DESCRIPTION: &str = "系統自動判斷檔案格式與來源";

const AUTO_FORMATS: &[SourceFormat] = &[
    SourceFormat::Xml,
    SourceFormat::Csv,
    SourceFormat::Txt,
    SourceFormat::Dat,
];

/// Returns the profile for a concrete vendor; `Auto` has none.
pub(crate) fn profile(vendor: Vendor) -> Option<&'static VendorProfile> {
    PROFILES
        .iter()
        .copied()
        .find(|profile| profile.vendor == vendor)
}

/// Lists every selectable vendor, `auto` first.
pub fn list_supported_vendors() -> Vec<VendorInfo> {
    let auto = VendorInfo::new(Vendor::Auto, AUTO_DESCRIPTION, AUTO_FORMATS);
    std::iter::once(auto)
        .chain(
            PROFILES
                .iter()
                .map(|profile| VendorInfo::new(profile.vendor, profile.description, profile.formats)),
        )
        .collect()
}
