//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.rostersync/
//!   config.yaml   (mode 0600: holds the API key and directory password)
//! ```
//!
//! # API pattern
//!
//! Every function that touches the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! [`load_from`] takes the config file path directly for `--config`.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::normalize::is_blank;

pub const DEFAULT_API_BASE_URL: &str = "https://api-app2.simpletexting.com/v2/api";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Overrides `api_key` from the file when set and non-blank.
pub const API_KEY_ENV: &str = "ROSTERSYNC_API_KEY";

/// Enabled user objects only (ADS_UF_ACCOUNTDISABLE bit clear).
pub const DEFAULT_LDAP_FILTER: &str =
    "(&(objectClass=user)(!(userAccountControl:1.2.840.113556.1.4.803:=2)))";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bearer credential for the contacts API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Lists every synced contact belongs to, whatever its office.
    #[serde(default)]
    pub list_ids: Vec<String>,
    /// Compute and report, but never write. On unless explicitly disabled.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Treat an email difference as drift.
    #[serde(default)]
    pub compare_email: bool,
    /// Keep a contact's existing lists when it is updated.
    #[serde(default)]
    pub preserve_remote_groups: bool,
    /// Create a list for every office that has none before reconciling.
    #[serde(default)]
    pub create_missing_lists: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Minimum spacing between consecutive API requests.
    #[serde(default)]
    pub request_interval_ms: u64,
    pub directory: DirectoryConfig,
}

/// Where source users come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectoryConfig {
    /// Live LDAP / Active Directory search.
    Ldap(LdapConfig),
    /// JSON array of directory entries exported ahead of time.
    File { path: PathBuf },
}

/// Connection parameters for an LDAP search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapConfig {
    /// AD domain label, e.g. `corp` for `DC=corp,DC=com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Specific domain controller host; any DC of `domain` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Search base DN; defaults to `OU=Users,DC=<domain>,DC=com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ou: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Check every required setting. Called before any network access.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_key()?;
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
            });
        }
        self.page_size()?;
        if self.list_ids.iter().all(|id| is_blank(Some(id.as_str()))) {
            return Err(ConfigError::NoListIds);
        }
        match &self.directory {
            DirectoryConfig::Ldap(ldap) => ldap.validate(),
            DirectoryConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    Err(ConfigError::MissingDirectoryFile)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The API key, or [`ConfigError::MissingApiKey`] when blank.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !is_blank(Some(key)) => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn page_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.page_size).ok_or(ConfigError::InvalidPageSize)
    }

    /// Configured base list ids with blank entries removed.
    pub fn base_list_ids(&self) -> impl Iterator<Item = &str> {
        self.list_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !is_blank(Some(*id)))
    }

    /// Replace the file's API key with `key` when it is non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if !is_blank(key.as_deref()) {
            self.api_key = key;
        }
        self
    }
}

impl LdapConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(self.domain.as_deref()) && is_blank(self.ou.as_deref()) {
            return Err(ConfigError::MissingDomain);
        }
        match (
            is_blank(self.username.as_deref()),
            is_blank(self.password.as_deref()),
        ) {
            (false, true) => Err(ConfigError::IncompleteCredentials {
                missing: "password",
            }),
            (true, false) => Err(ConfigError::IncompleteCredentials {
                missing: "username",
            }),
            _ => Ok(()),
        }
    }

    /// `ldap://<domain_controller>` when set, else `ldap://<domain>`.
    pub fn url(&self) -> String {
        let host = self
            .domain_controller
            .as_deref()
            .filter(|dc| !is_blank(Some(*dc)))
            .or(self.domain.as_deref())
            .unwrap_or_default();
        if host.contains("://") {
            host.to_string()
        } else {
            format!("ldap://{host}")
        }
    }

    pub fn base_dn(&self) -> String {
        match self.ou.as_deref() {
            Some(ou) if !is_blank(Some(ou)) => ou.to_string(),
            _ => format!(
                "OU=Users,DC={},DC=com",
                self.domain.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn filter(&self) -> &str {
        self.filter
            .as_deref()
            .filter(|f| !is_blank(Some(*f)))
            .unwrap_or(DEFAULT_LDAP_FILTER)
    }

    /// `(username, password)` for a simple bind; `None` binds anonymously.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !is_blank(Some(user)) && !is_blank(Some(pass)) => {
                Some((user, pass))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Paths
// ---------------------------------------------------------------------------

/// `<home>/.rostersync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".rostersync").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 4. Load
// ---------------------------------------------------------------------------

/// Parse the config at `path` and apply the `ROSTERSYNC_API_KEY` override.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
/// The result is not validated; call [`Config::validate`].
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
}

/// Load `<home>/.rostersync/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

const TEMPLATE: &str = "\
# rostersync configuration
#
# Contacts API bearer key. $ROSTERSYNC_API_KEY overrides this value.
api_key: \"\"
api_base_url: https://api-app2.simpletexting.com/v2/api
page_size: 100

# Every synced contact is placed in these lists. A contact whose directory
# office matches an existing list name is also placed in that list.
list_ids: []

# Report what would change without writing. Set to false to apply.
dry_run: true
compare_email: false
preserve_remote_groups: false
create_missing_lists: false

request_timeout_secs: 30
request_interval_ms: 0

directory:
  kind: ldap
  domain: corp
  # domain_controller: dc01.corp.com
  # username: svc-rostersync
  # password: \"\"
  # ou: OU=Users,DC=corp,DC=com
";

/// Write the commented template to `path`.
///
/// Write flow: `.tmp` sibling → `chmod 0600` → `rename`. Refuses to replace
/// an existing file unless `force` is set.
pub fn write_template(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, TEMPLATE)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Write the template to `<home>/.rostersync/config.yaml` and return its path.
pub fn init_at(home: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(home);
    write_template(&path, force)?;
    Ok(path)
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<PathBuf, ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
