#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use rostersync_core::{Phone, RawSourceRecord};
use rostersync_directory::{DirectoryError, DirectorySource};
use rostersync_sync::{ContactPayload, RemoteClient, RemoteContact, RemoteError, RemoteList};

/// A directory that always returns the same entries.
pub struct StaticDirectory(pub Vec<RawSourceRecord>);

impl DirectorySource for StaticDirectory {
    fn describe(&self) -> String {
        "static://test".to_string()
    }

    fn fetch_records(&self) -> Result<Vec<RawSourceRecord>, DirectoryError> {
        Ok(self.0.clone())
    }
}

pub fn user(mobile: &str, first: &str, last: &str, office: Option<&str>) -> RawSourceRecord {
    RawSourceRecord {
        mobile: Some(mobile.to_string()),
        given_name: Some(first.to_string()),
        surname: Some(last.to_string()),
        mail: None,
        office: office.map(str::to_string),
    }
}

pub fn list(id: &str, name: &str) -> RemoteList {
    RemoteList {
        id: Some(id.to_string()),
        name: name.to_string(),
    }
}

/// An in-memory contacts API with replace-on-upsert list semantics.
///
/// List ids in write payloads are mapped back to names through the known
/// lists; an unknown id is stored with the id as its name.
#[derive(Default)]
pub struct MemoryRemote {
    pub contacts: RefCell<BTreeMap<String, RemoteContact>>,
    pub lists: RefCell<Vec<RemoteList>>,
    pub requests: RefCell<Vec<String>>,
}

impl MemoryRemote {
    pub fn with_lists(lists: Vec<RemoteList>) -> Self {
        Self {
            lists: RefCell::new(lists),
            ..Self::default()
        }
    }

    pub fn insert(&self, phone: &str, first: &str, last: &str, list_ids: &[&str]) {
        let contact = RemoteContact {
            contact_phone: Some(phone.to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: None,
            lists: list_ids.iter().map(|id| self.lookup(id)).collect(),
        };
        self.contacts.borrow_mut().insert(phone.to_string(), contact);
    }

    pub fn writes(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| !r.starts_with("GET"))
            .cloned()
            .collect()
    }

    pub fn list_names_of(&self, phone: &str) -> Vec<String> {
        let contacts = self.contacts.borrow();
        let mut names: Vec<String> = contacts
            .get(phone)
            .map(|c| c.lists.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn lookup(&self, id: &str) -> RemoteList {
        self.lists
            .borrow()
            .iter()
            .find(|l| l.id.as_deref() == Some(id) || l.name == id)
            .cloned()
            .unwrap_or_else(|| list(id, id))
    }

    fn store(&self, contact: &ContactPayload) {
        let stored = RemoteContact {
            contact_phone: Some(contact.contact_phone.clone()),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            lists: contact.list_ids.iter().map(|id| self.lookup(id)).collect(),
        };
        self.contacts
            .borrow_mut()
            .insert(contact.contact_phone.clone(), stored);
    }
}

fn page_of<T: Clone>(items: &[T], page: usize, size: usize) -> Vec<T> {
    items.iter().skip(page * size).take(size).cloned().collect()
}

impl RemoteClient for MemoryRemote {
    fn list_contacts_page(
        &self,
        page: usize,
        size: usize,
    ) -> Result<Vec<RemoteContact>, RemoteError> {
        self.requests
            .borrow_mut()
            .push(format!("GET contacts page={page} size={size}"));
        let all: Vec<RemoteContact> = self.contacts.borrow().values().cloned().collect();
        Ok(page_of(&all, page, size))
    }

    fn list_groups_page(&self, page: usize, size: usize) -> Result<Vec<RemoteList>, RemoteError> {
        self.requests
            .borrow_mut()
            .push(format!("GET lists page={page} size={size}"));
        Ok(page_of(&self.lists.borrow(), page, size))
    }

    fn create_contact(&self, contact: &ContactPayload) -> Result<(), RemoteError> {
        self.requests
            .borrow_mut()
            .push(format!("POST {}", contact.contact_phone));
        if self.contacts.borrow().contains_key(&contact.contact_phone) {
            return Err(RemoteError::Status {
                code: 409,
                reason: "Conflict".to_string(),
            });
        }
        self.store(contact);
        Ok(())
    }

    fn upsert_contact(&self, phone: &Phone, contact: &ContactPayload) -> Result<(), RemoteError> {
        self.requests.borrow_mut().push(format!("PUT {phone}"));
        self.store(contact);
        Ok(())
    }

    fn delete_contact(&self, phone: &Phone) -> Result<(), RemoteError> {
        self.requests.borrow_mut().push(format!("DELETE {phone}"));
        match self.contacts.borrow_mut().remove(phone.as_str()) {
            Some(_) => Ok(()),
            None => Err(RemoteError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }

    fn create_group(&self, name: &str) -> Result<(), RemoteError> {
        self.requests.borrow_mut().push(format!("POST list {name}"));
        let mut lists = self.lists.borrow_mut();
        let id = format!("list-{}", lists.len() + 1);
        lists.push(list(&id, name));
        Ok(())
    }
}
