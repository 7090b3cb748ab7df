//! File-backed directory source, read through `from_config` and normalized
//! the way the sync engine does it.
//!
//! Each `#[case]` gets an isolated `TempDir`.

use std::fs;

use rostersync_core::DirectoryConfig;
use rostersync_directory::{from_config, DirectoryError};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn export(contents: &str) -> (TempDir, DirectoryConfig) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("users.json");
    fs::write(&path, contents).expect("write fixture");
    (dir, DirectoryConfig::File { path })
}

// ---------------------------------------------------------------------------
// Normalization of exported entries
// ---------------------------------------------------------------------------

#[rstest]
#[case(r#"{"mobile": "(555) 123-4567"}"#, Some("5551234567"))]
#[case(r#"{"mobile": "+1 555 123 4567"}"#, Some("15551234567"))]
#[case(r#"{"mobile": "   "}"#, None)]
#[case(r#"{"mobile": null}"#, None)]
#[case(r#"{"givenName": "Only"}"#, None)]
fn exported_mobile_becomes_phone_key(#[case] entry: &str, #[case] expected: Option<&str>) {
    let (_dir, config) = export(&format!("[{entry}]"));
    let raw = from_config(&config).fetch_records().expect("fetch");
    assert_eq!(raw.len(), 1);
    let phone = raw[0].normalize().map(|r| r.phone.as_str().to_string());
    assert_eq!(phone.as_deref(), expected);
}

#[test]
fn exported_entry_normalizes_all_fields() {
    let (_dir, config) = export(
        r#"[{"mobile": "555-123-4567", "givenName": "Jane", "sn": " ",
             "mail": "Jane.Doe@Corp.COM", "physicalDeliveryOfficeName": "HQ"}]"#,
    );
    let raw = from_config(&config).fetch_records().expect("fetch");
    let record = raw[0].normalize().expect("record");

    assert_eq!(record.first_name.as_deref(), Some("Jane"));
    assert_eq!(record.last_name, None);
    assert_eq!(record.email.as_deref(), Some("jane.doe@corp.com"));
    assert_eq!(record.office.as_deref(), Some("HQ"));
    assert!(record.group_ids.is_empty());
}

#[test]
fn empty_export_is_not_an_error() {
    let (_dir, config) = export("[]");
    let raw = from_config(&config).fetch_records().expect("fetch");
    assert!(raw.is_empty());
}

#[test]
fn malformed_export_is_a_parse_error() {
    let (_dir, config) = export("[{\"mobile\": ");
    let err = from_config(&config).fetch_records().unwrap_err();
    assert!(matches!(err, DirectoryError::Parse { .. }), "{err}");
}
