//! Error types for rostersync-directory.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading the source directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Connection, bind, or search failure reported by the LDAP client.
    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export file is not a JSON array of directory entries.
    #[error("failed to parse directory export at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
