//! `HttpRemoteClient` against a mock contacts API.
//!
//! The client is blocking, so each call runs on tokio's blocking pool while
//! the mock server keeps serving on the runtime.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rostersync_core::{GroupId, Phone, Record};
use rostersync_sync::{ContactPayload, HttpRemoteClient, RemoteClient, RemoteError};

const API_KEY: &str = "test-key";

async fn call<T, F>(server: &MockServer, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(HttpRemoteClient) -> T + Send + 'static,
{
    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        f(HttpRemoteClient::new(
            &base,
            API_KEY,
            Duration::from_secs(5),
            Duration::ZERO,
        ))
    })
    .await
    .expect("blocking task")
}

fn jane() -> Record {
    let mut record = Record::new(Phone::parse("(555) 123-4567").unwrap());
    record.first_name = Some("Jane".to_string());
    record.last_name = Some("Doe".to_string());
    record.group_ids.insert(GroupId::from("G1"));
    record.group_ids.insert(GroupId::from("g-hq"));
    record
}

#[tokio::test(flavor = "multi_thread")]
async fn contacts_page_sends_paging_query_and_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("page", "2"))
        .and(query_param("size", "50"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"contactPhone": "5551234567", "firstName": "Jane", "lastName": "Doe",
                 "lists": [{"id": "g-hq", "name": "HQ"}]}
            ],
            "totalPages": 3,
            "totalElements": 101
        })))
        .expect(1)
        .mount(&server)
        .await;

    let contacts = call(&server, |client| client.list_contacts_page(2, 50))
        .await
        .expect("page");

    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].first_name.as_deref(), Some("Jane"));
    assert_eq!(contacts[0].lists[0].id.as_deref(), Some("g-hq"));
}

#[tokio::test(flavor = "multi_thread")]
async fn lists_page_reads_contact_lists_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact-lists"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": "g-hq", "name": "HQ"}, {"name": "Depot"}]
        })))
        .mount(&server)
        .await;

    let lists = call(&server, |client| client.list_groups_page(0, 100))
        .await
        .expect("page");

    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].id, None);
    assert_eq!(lists[1].name, "Depot");
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_replaces_lists_by_phone() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/contacts/5551234567"))
        .and(query_param("upsert", "true"))
        .and(query_param("listsReplacement", "true"))
        .and(body_json(json!({
            "contactPhone": "5551234567",
            "firstName": "Jane",
            "lastName": "Doe",
            "listIds": ["G1", "g-hq"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let record = jane();
    let result = call(&server, move |client| {
        client.upsert_contact(&record.phone, &ContactPayload::from_record(&record))
    })
    .await;

    assert_eq!(result, Ok(()));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_posts_contact_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let record = jane();
    let result = call(&server, move |client| {
        client.create_contact(&ContactPayload::from_record(&record))
    })
    .await;

    assert_eq!(result, Ok(()));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/contacts/5551234567"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let phone = Phone::parse("5551234567").unwrap();
    let result = call(&server, move |client| client.delete_contact(&phone)).await;

    assert_eq!(result, Ok(()));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_group_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact-lists"))
        .and(body_json(json!({"name": "Austin"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let result = call(&server, |client| client.create_group("Austin")).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_maps_to_status_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("contact not found"))
        .mount(&server)
        .await;

    let phone = Phone::parse("5550000000").unwrap();
    let err = call(&server, move |client| client.delete_contact(&phone))
        .await
        .unwrap_err();

    match err {
        RemoteError::Status { code, reason } => {
            assert_eq!(code, 404);
            assert!(reason.contains("contact not found"), "{reason}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_page_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = call(&server, |client| client.list_contacts_page(0, 100))
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Decode { .. }), "{err:?}");
}

#[test]
fn unreachable_host_maps_to_transport_error() {
    let client = HttpRemoteClient::new(
        "http://127.0.0.1:9",
        API_KEY,
        Duration::from_secs(2),
        Duration::ZERO,
    );
    let err = client.list_groups_page(0, 1).unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }), "{err:?}");
}
