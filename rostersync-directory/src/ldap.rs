//! LDAP / Active Directory source.
//!
//! One subtree search per fetch, paged so that AD's default 1000-entry size
//! limit does not cut the result short. Only the five attributes the sync
//! needs are requested.

use std::collections::HashMap;
use std::time::Duration;

use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{LdapConn, LdapConnSettings, Scope, SearchEntry};

use rostersync_core::{LdapConfig, RawSourceRecord};

use crate::{DirectoryError, DirectorySource};

pub const ATTR_MOBILE: &str = "mobile";
pub const ATTR_GIVEN_NAME: &str = "givenName";
pub const ATTR_SURNAME: &str = "sn";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_OFFICE: &str = "physicalDeliveryOfficeName";

const SEARCH_ATTRS: [&str; 5] = [
    ATTR_MOBILE,
    ATTR_GIVEN_NAME,
    ATTR_SURNAME,
    ATTR_MAIL,
    ATTR_OFFICE,
];

const SEARCH_PAGE_SIZE: i32 = 500;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Searches a directory server for enabled users.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    config: LdapConfig,
}

impl LdapDirectory {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    fn search(&self) -> Result<Vec<RawSourceRecord>, DirectoryError> {
        let url = self.config.url();
        let settings = LdapConnSettings::new().set_conn_timeout(CONNECT_TIMEOUT);
        let mut ldap = LdapConn::with_settings(settings, &url)?;

        if let Some((user, password)) = self.config.credentials() {
            ldap.simple_bind(user, password)?.success()?;
        }

        let base = self.config.base_dn();
        tracing::debug!("searching {url} base={base} filter={}", self.config.filter());

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(SEARCH_PAGE_SIZE)),
        ];
        let mut search = ldap.streaming_search_with(
            adapters,
            &base,
            Scope::Subtree,
            self.config.filter(),
            SEARCH_ATTRS.to_vec(),
        )?;

        let mut records = Vec::new();
        while let Some(entry) = search.next()? {
            let entry = SearchEntry::construct(entry);
            records.push(entry_to_raw(&entry.attrs));
        }
        search.result().success()?;

        // The search already succeeded; a failed unbind changes nothing for the caller.
        if let Err(e) = ldap.unbind() {
            tracing::debug!("ldap unbind failed: {e}");
        }
        Ok(records)
    }
}

impl DirectorySource for LdapDirectory {
    fn describe(&self) -> String {
        format!("{}/{}", self.config.url(), self.config.base_dn())
    }

    fn fetch_records(&self) -> Result<Vec<RawSourceRecord>, DirectoryError> {
        let records = self.search()?;
        tracing::info!(
            "directory search returned {} entries from {}",
            records.len(),
            self.describe()
        );
        Ok(records)
    }
}

/// Map a search entry's attributes to a raw record.
///
/// Attribute names are matched case-insensitively (servers echo them back in
/// their own casing); multi-valued attributes contribute their first value.
pub fn entry_to_raw(attrs: &HashMap<String, Vec<String>>) -> RawSourceRecord {
    let first = |name: &str| -> Option<String> {
        attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first().cloned())
    };
    RawSourceRecord {
        mobile: first(ATTR_MOBILE),
        given_name: first(ATTR_GIVEN_NAME),
        surname: first(ATTR_SURNAME),
        mail: first(ATTR_MAIL),
        office: first(ATTR_OFFICE),
    }
}
