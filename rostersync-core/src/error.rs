//! Error types for rostersync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or validating configuration.
///
/// Every variant is fatal: a run that hits one aborts before any directory
/// search or remote request is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (template write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.rostersync/`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `rostersync init` first")]
    ConfigNotFound { path: PathBuf },

    /// `init` refused to overwrite an existing config.
    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    #[error("must supply an API key (config `api_key` or $ROSTERSYNC_API_KEY)")]
    MissingApiKey,

    #[error("API base URL must start with http:// or https://, got '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("must specify at least one list id in `list_ids`")]
    NoListIds,

    /// A zero page size would never satisfy the short-page stop rule.
    #[error("`page_size` must be greater than zero")]
    InvalidPageSize,

    #[error("must specify an AD `domain` or an explicit `ou` base DN")]
    MissingDomain,

    /// Username and password must be supplied together.
    #[error("directory credentials are incomplete: must supply a {missing}")]
    IncompleteCredentials { missing: &'static str },

    #[error("file directory source requires a non-empty `path`")]
    MissingDirectoryFile,
}
