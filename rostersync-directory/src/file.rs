//! JSON export source.
//!
//! The file holds an array of entries using either snake_case field names or
//! the raw LDAP attribute names:
//!
//! ```json
//! [{ "mobile": "(555) 123-4567", "givenName": "Jane", "sn": "Doe",
//!    "mail": "jane@corp.com", "physicalDeliveryOfficeName": "HQ" }]
//! ```

use std::path::PathBuf;

use rostersync_core::RawSourceRecord;

use crate::{DirectoryError, DirectorySource};

/// Reads source users from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectorySource for FileDirectory {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn fetch_records(&self) -> Result<Vec<RawSourceRecord>, DirectoryError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| DirectoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<RawSourceRecord> =
            serde_json::from_str(&contents).map_err(|source| DirectoryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!("read {} entries from {}", records.len(), self.path.display());
        Ok(records)
    }
}
