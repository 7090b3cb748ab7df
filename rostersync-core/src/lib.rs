//! rostersync core library: domain types, normalization, configuration, errors.
//!
//! - [`types`]: `Phone`, `GroupId`, `Record`, `Group`, `RawSourceRecord`
//! - [`normalize`]: blank handling and phone / email normalization
//! - [`roster`]: phone-keyed [`Roster`] and the [`GroupCatalog`]
//! - [`config`]: YAML config load / validate / init
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod normalize;
pub mod roster;
pub mod types;

pub use config::{Config, DirectoryConfig, LdapConfig};
pub use error::ConfigError;
pub use roster::{GroupCatalog, Provenance, Roster};
pub use types::{Group, GroupId, Phone, RawSourceRecord, Record};
