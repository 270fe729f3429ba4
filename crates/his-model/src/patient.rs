//! Canonical patient record.

use serde::{Deserialize, Serialize};

/// A patient identified by national ID.
///
/// Within one import the national ID is unique; the first record that
/// introduces a patient supplies every other field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// National identification number (身分證字號).
    pub national_id: String,
    pub name: String,
    /// ISO `YYYY-MM-DD`, or the raw value when it was not an era date.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub birthday: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    /// Health insurance card number (健保卡號).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub card_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
}

impl Patient {
    pub fn new(national_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            national_id: national_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_birthday(mut self, birthday: impl Into<String>) -> Self {
        self.birthday = birthday.into();
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    #[must_use]
    pub fn with_card_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = card_number.into();
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// A patient is only usable when it carries a national ID.
    pub fn has_identity(&self) -> bool {
        !self.national_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let patient = Patient::new("A123456789", "王小明");
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["national_id"], "A123456789");
        assert!(json.get("birthday").is_none());
        assert!(json.get("card_number").is_none());
    }

    #[test]
    fn test_has_identity() {
        assert!(Patient::new("A123456789", "").has_identity());
        assert!(!Patient::new("  ", "王小明").has_identity());
    }
}
