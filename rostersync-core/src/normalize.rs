//! Field normalization applied to both rosters before any comparison.
//!
//! - phone → digits only ([`Phone::parse`])
//! - email → lower case
//! - blank (absent, empty, whitespace-only) ≡ absent
//!
//! Non-blank names and offices are kept byte-for-byte; comparisons on them
//! are exact.

use crate::types::{Phone, RawSourceRecord, Record};

/// `true` for `None`, `""` and whitespace-only strings.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Collapse blank values to `None`; non-blank values are returned unchanged.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    if is_blank(value) {
        None
    } else {
        value.map(str::to_owned)
    }
}

/// Digits-only phone key, or `None` when the value has no digits.
pub fn normalize_phone(value: Option<&str>) -> Option<Phone> {
    value.and_then(Phone::parse)
}

/// Lower-cased email, or `None` when blank.
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    non_blank(value).map(|v| v.to_lowercase())
}

impl RawSourceRecord {
    /// Normalize a directory entry into a [`Record`].
    ///
    /// Returns `None` when the mobile number normalizes to blank: such users
    /// cannot be matched and never participate in a sync.
    pub fn normalize(&self) -> Option<Record> {
        let phone = normalize_phone(self.mobile.as_deref())?;
        let mut record = Record::new(phone);
        record.first_name = non_blank(self.given_name.as_deref());
        record.last_name = non_blank(self.surname.as_deref());
        record.email = normalize_email(self.mail.as_deref());
        record.office = non_blank(self.office.as_deref());
        Some(record)
    }
}
