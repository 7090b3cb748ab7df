//! Domain types shared by the directory collaborator and the sync engine.
//!
//! A [`Record`] is one person, whichever side it came from. Records only
//! exist in normalized form: the [`Phone`] key is digits-only and can never be
//! empty, so any two records with the same key are the same person.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A normalized phone number: ASCII digits only, never empty.
///
/// Construct with [`Phone::parse`]; there is no way to build one that still
/// carries punctuation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Strip every non-digit character. Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            None
        } else {
            Some(Self(digits))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A strongly-typed remote group (contact list) identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Directory output
// ---------------------------------------------------------------------------

/// One user as returned by the directory, before any normalization.
///
/// Field aliases accept the raw LDAP attribute names so a JSON export of a
/// directory search can be read back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSourceRecord {
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default, alias = "givenName")]
    pub given_name: Option<String>,
    #[serde(default, alias = "sn")]
    pub surname: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default, alias = "physicalDeliveryOfficeName")]
    pub office: Option<String>,
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A person, keyed by phone.
///
/// Source records carry `office` and, once resolved, the target `group_ids`.
/// Remote records carry the `group_ids` and `group_names` the contact
/// currently belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub phone: Phone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub group_ids: BTreeSet<GroupId>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub group_names: BTreeSet<String>,
}

impl Record {
    /// A record with only its key set.
    pub fn new(phone: Phone) -> Self {
        Self {
            phone,
            first_name: None,
            last_name: None,
            email: None,
            office: None,
            group_ids: BTreeSet::new(),
            group_names: BTreeSet::new(),
        }
    }

    /// `"First Last"`, skipping whichever half is absent.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the record belongs to `group`, matched by id or by name.
    pub fn is_member_of(&self, group: &Group) -> bool {
        group
            .id
            .as_ref()
            .is_some_and(|id| self.group_ids.contains(id))
            || self.group_names.contains(&group.name)
    }
}

/// A remote contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Remote-assigned identifier; absent for groups that do not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GroupId>,
    pub name: String,
}

impl Group {
    /// The identifier to send when assigning membership.
    ///
    /// Precedence: the explicit remote id if present, else the group name
    /// (the contacts API accepts list names wherever it accepts list ids).
    pub fn effective_id(&self) -> GroupId {
        self.id
            .clone()
            .unwrap_or_else(|| GroupId(self.name.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_parse_strips_punctuation() {
        let phone = Phone::parse("+1 (555) 123-4567").expect("digits");
        assert_eq!(phone.as_str(), "15551234567");
    }

    #[test]
    fn phone_parse_rejects_digitless_input() {
        assert!(Phone::parse("").is_none());
        assert!(Phone::parse("  ").is_none());
        assert!(Phone::parse("ext. -").is_none());
    }

    #[test]
    fn effective_id_prefers_explicit_id() {
        let with_id = Group {
            id: Some(GroupId::from("g-1")),
            name: "HQ".to_string(),
        };
        let without_id = Group {
            id: None,
            name: "HQ".to_string(),
        };
        assert_eq!(with_id.effective_id(), GroupId::from("g-1"));
        assert_eq!(without_id.effective_id(), GroupId::from("HQ"));
    }

    #[test]
    fn display_name_skips_missing_parts() {
        let mut record = Record::new(Phone::parse("1").expect("phone"));
        assert_eq!(record.display_name(), "");
        record.last_name = Some("Doe".to_string());
        assert_eq!(record.display_name(), "Doe");
        record.first_name = Some("Jane".to_string());
        assert_eq!(record.display_name(), "Jane Doe");
    }

    #[test]
    fn membership_matches_by_id_or_name() {
        let group = Group {
            id: Some(GroupId::from("g-hq")),
            name: "HQ".to_string(),
        };
        let mut record = Record::new(Phone::parse("1").expect("phone"));
        assert!(!record.is_member_of(&group));

        record.group_names.insert("HQ".to_string());
        assert!(record.is_member_of(&group));

        record.group_names.clear();
        record.group_ids.insert(GroupId::from("g-hq"));
        assert!(record.is_member_of(&group));
    }

    #[test]
    fn raw_record_accepts_ldap_attribute_names() {
        let raw: RawSourceRecord = serde_yaml::from_str(
            "mobile: '555'\ngivenName: Jane\nsn: Doe\nmail: J@X.COM\nphysicalDeliveryOfficeName: HQ\n",
        )
        .expect("parse");
        assert_eq!(raw.given_name.as_deref(), Some("Jane"));
        assert_eq!(raw.surname.as_deref(), Some("Doe"));
        assert_eq!(raw.office.as_deref(), Some("HQ"));
    }
}
