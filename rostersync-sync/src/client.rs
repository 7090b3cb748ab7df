//! Contacts API client.
//!
//! [`RemoteClient`] is the seam every engine component talks through; tests
//! substitute in-memory doubles. [`HttpRemoteClient`] is the blocking `ureq`
//! implementation against the v2 contacts API:
//!
//! ```text
//! GET    {base}/contacts?page=N&size=S
//! POST   {base}/contacts
//! PUT    {base}/contacts/{phone}?upsert=true&listsReplacement=true
//! DELETE {base}/contacts/{phone}
//! GET    {base}/contact-lists?page=N&size=S
//! POST   {base}/contact-lists
//! ```

use std::cell::Cell;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rostersync_core::{Config, ConfigError, Group, GroupId, Phone, Record};

use crate::error::RemoteError;

/// Longest slice of an error response body kept in [`RemoteError::Status`].
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The paging envelope shared by every list endpoint.
///
/// Only `content` matters to the fetch loop; a missing or null `content` is
/// an empty page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Option<Vec<T>>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub total_elements: Option<u64>,
}

impl<T> PagedResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        self.content.unwrap_or_default()
    }
}

/// A contact as the API reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteContact {
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub lists: Vec<RemoteList>,
}

/// A contact list as the API reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteList {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl From<RemoteList> for Group {
    fn from(list: RemoteList) -> Self {
        Group {
            id: list.id.filter(|id| !id.trim().is_empty()).map(GroupId),
            name: list.name,
        }
    }
}

/// Body of a create or upsert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub contact_phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub list_ids: Vec<String>,
}

impl ContactPayload {
    /// The write body for a target record; `list_ids` is its full group set.
    pub fn from_record(record: &Record) -> Self {
        Self {
            contact_phone: record.phone.as_str().to_string(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            list_ids: record.group_ids.iter().map(|id| id.0.clone()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateListBody<'a> {
    name: &'a str,
}

// ---------------------------------------------------------------------------
// Client seam
// ---------------------------------------------------------------------------

/// Operations the engine needs from the contacts API.
///
/// Every call blocks until it completes or fails. Implementations never
/// retry.
pub trait RemoteClient {
    fn list_contacts_page(&self, page: usize, size: usize)
        -> Result<Vec<RemoteContact>, RemoteError>;

    fn list_groups_page(&self, page: usize, size: usize) -> Result<Vec<RemoteList>, RemoteError>;

    fn create_contact(&self, contact: &ContactPayload) -> Result<(), RemoteError>;

    /// Create-or-replace the contact at `phone`; its lists are replaced, not merged.
    fn upsert_contact(&self, phone: &Phone, contact: &ContactPayload) -> Result<(), RemoteError>;

    fn delete_contact(&self, phone: &Phone) -> Result<(), RemoteError>;

    fn create_group(&self, name: &str) -> Result<(), RemoteError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Blocking HTTP client with bearer auth and optional request spacing.
pub struct HttpRemoteClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
    min_interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl HttpRemoteClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration, min_interval: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {api_key}"),
            min_interval,
            last_request: Cell::new(None),
        }
    }

    /// Build from a config; fails only when the API key is missing.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.api_base_url,
            config.api_key()?,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_millis(config.request_interval_ms),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.throttle();
        self.agent
            .request(method, &format!("{}{}", self.base_url, path))
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
    }

    /// Sleep until `min_interval` has passed since the previous request.
    fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: usize,
        size: usize,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .request("GET", path)
            .query("page", &page.to_string())
            .query("size", &size.to_string())
            .call()
            .map_err(remote_error)?;
        let body: PagedResponse<T> = response.into_json().map_err(|e| RemoteError::Decode {
            message: e.to_string(),
        })?;
        Ok(body.into_items())
    }
}

impl RemoteClient for HttpRemoteClient {
    fn list_contacts_page(
        &self,
        page: usize,
        size: usize,
    ) -> Result<Vec<RemoteContact>, RemoteError> {
        self.get_page("/contacts", page, size)
    }

    fn list_groups_page(&self, page: usize, size: usize) -> Result<Vec<RemoteList>, RemoteError> {
        self.get_page("/contact-lists", page, size)
    }

    fn create_contact(&self, contact: &ContactPayload) -> Result<(), RemoteError> {
        self.request("POST", "/contacts")
            .send_json(contact)
            .map_err(remote_error)?;
        Ok(())
    }

    fn upsert_contact(&self, phone: &Phone, contact: &ContactPayload) -> Result<(), RemoteError> {
        self.request("PUT", &format!("/contacts/{phone}"))
            .query("upsert", "true")
            .query("listsReplacement", "true")
            .send_json(contact)
            .map_err(remote_error)?;
        Ok(())
    }

    fn delete_contact(&self, phone: &Phone) -> Result<(), RemoteError> {
        self.request("DELETE", &format!("/contacts/{phone}"))
            .call()
            .map_err(remote_error)?;
        Ok(())
    }

    fn create_group(&self, name: &str) -> Result<(), RemoteError> {
        self.request("POST", "/contact-lists")
            .send_json(CreateListBody { name })
            .map_err(remote_error)?;
        Ok(())
    }
}

fn remote_error(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => {
            let status_text = response.status_text().to_string();
            let body = response.into_string().unwrap_or_default();
            let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            let reason = if body.is_empty() {
                status_text
            } else {
                format!("{status_text}: {body}")
            };
            RemoteError::Status { code, reason }
        }
        ureq::Error::Transport(transport) => RemoteError::Transport {
            message: transport.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_response_without_content_is_empty() {
        let page: PagedResponse<RemoteContact> =
            serde_json::from_str(r#"{"totalPages": 0, "totalElements": 0}"#).unwrap();
        assert!(page.into_items().is_empty());

        let page: PagedResponse<RemoteContact> =
            serde_json::from_str(r#"{"content": null}"#).unwrap();
        assert!(page.into_items().is_empty());
    }

    fn decode_page<T: DeserializeOwned>(body: &str) -> Vec<T> {
        serde_json::from_str::<PagedResponse<T>>(body)
            .unwrap()
            .into_items()
    }

    #[test]
    fn paged_response_decodes_for_any_deserializable_item() {
        let lists: Vec<RemoteList> = decode_page(r#"{"content": [{"id": "g1", "name": "HQ"}]}"#);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "HQ");

        let empty: Vec<RemoteList> = decode_page(r#"{"totalPages": 0}"#);
        assert!(empty.is_empty());
    }

    #[test]
    fn remote_contact_decodes_camel_case_with_lists() {
        let page: PagedResponse<RemoteContact> = serde_json::from_str(
            r#"{"content": [{"contactPhone": "5551234567", "firstName": "Jane",
                "lastName": "Doe", "lists": [{"id": "g-hq", "name": "HQ"}],
                "customFields": {"ignored": true}}],
                "totalPages": 1, "totalElements": 1}"#,
        )
        .unwrap();
        let contacts = page.into_items();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].contact_phone.as_deref(), Some("5551234567"));
        assert_eq!(contacts[0].lists[0].name, "HQ");
    }

    #[test]
    fn blank_list_id_becomes_absent() {
        let group: Group = RemoteList {
            id: Some(" ".to_string()),
            name: "HQ".to_string(),
        }
        .into();
        assert_eq!(group.id, None);
        assert_eq!(group.effective_id(), GroupId::from("HQ"));
    }

    #[test]
    fn payload_carries_full_group_set() {
        let mut record = Record::new(Phone::parse("555-123-4567").unwrap());
        record.first_name = Some("Jane".to_string());
        record.group_ids.insert(GroupId::from("G1"));
        record.group_ids.insert(GroupId::from("g-hq"));

        let json = serde_json::to_value(ContactPayload::from_record(&record)).unwrap();
        assert_eq!(json["contactPhone"], "5551234567");
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["lastName"], serde_json::Value::Null);
        assert!(json.get("email").is_none());
        assert_eq!(json["listIds"], serde_json::json!(["G1", "g-hq"]));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpRemoteClient::new(
            "https://api.example.com/v2/api/",
            "k",
            Duration::from_secs(1),
            Duration::ZERO,
        );
        assert_eq!(client.base_url(), "https://api.example.com/v2/api");
    }
}
