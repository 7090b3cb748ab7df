//! # rostersync-directory
//!
//! The source side of a sync: reads enabled users from the enterprise
//! directory and hands them over as raw attribute bags
//! ([`RawSourceRecord`]). Normalization happens in the sync engine, not here.
//!
//! Two sources are provided:
//! - [`LdapDirectory`]: live LDAP / Active Directory search
//! - [`FileDirectory`]: a JSON export of such a search, for offline runs

pub mod error;
pub mod file;
pub mod ldap;

use rostersync_core::{DirectoryConfig, RawSourceRecord};

pub use error::DirectoryError;
pub use file::FileDirectory;
pub use ldap::LdapDirectory;

/// Anything that can produce the full list of source users in one call.
pub trait DirectorySource {
    /// Short human label for logs and reports (e.g. `ldap://dc01`).
    fn describe(&self) -> String;

    /// Fetch every user the source currently considers active.
    fn fetch_records(&self) -> Result<Vec<RawSourceRecord>, DirectoryError>;
}

/// Build the source selected by the config's `directory` section.
pub fn from_config(config: &DirectoryConfig) -> Box<dyn DirectorySource> {
    match config {
        DirectoryConfig::Ldap(ldap) => Box::new(LdapDirectory::new(ldap.clone())),
        DirectoryConfig::File { path } => Box::new(FileDirectory::new(path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rostersync_core::LdapConfig;

    use super::*;

    #[test]
    fn from_config_selects_source_kind() {
        let file = from_config(&DirectoryConfig::File {
            path: PathBuf::from("/tmp/users.json"),
        });
        assert!(file.describe().contains("users.json"));

        let ldap = from_config(&DirectoryConfig::Ldap(LdapConfig {
            domain: Some("corp".to_string()),
            ..LdapConfig::default()
        }));
        assert!(ldap.describe().starts_with("ldap://corp"));
    }
}
